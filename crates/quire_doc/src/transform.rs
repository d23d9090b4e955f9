use quire_common::CodeKey;

use crate::ast::{AstDoc, Block};
use crate::code::{Code, CodeBody, Fragment, DOC_KIND};
use crate::inline::{escape, render_inline};

/// Converts a parsed document into code. Pure: no I/O.
///
/// The resulting dependency list starts with the document itself, followed by
/// each included document once, in order of first appearance.
pub fn transform(doc: &AstDoc) -> Code {
    let mut fragments = Vec::new();
    for block in &doc.blocks {
        render_block(block, &mut fragments);
    }

    let mut dependencies = vec![CodeKey::new(DOC_KIND, &doc.name)];
    for name in doc.includes() {
        let key = CodeKey::new(DOC_KIND, name);
        if !dependencies.contains(&key) {
            dependencies.push(key);
        }
    }

    Code {
        kind: DOC_KIND.to_string(),
        name: doc.name.clone(),
        body: CodeBody {
            title: doc.title().map(escape),
            fragments,
        },
        dependencies,
    }
}

fn render_block(block: &Block, out: &mut Vec<Fragment>) {
    match block {
        Block::Section { level, title } => out.push(Fragment::Html(format!(
            "<h{level}>{}</h{level}>",
            render_inline(title)
        ))),
        Block::Paragraph { text } => {
            out.push(Fragment::Html(format!("<p>{}</p>", render_inline(text))))
        }
        Block::BulletList { items } => {
            out.push(Fragment::Html("<ul>".to_string()));
            for item in items {
                out.push(Fragment::Html(format!("<li>{}</li>", render_inline(item))));
            }
            out.push(Fragment::Html("</ul>".to_string()));
        }
        Block::LiteralBlock { lines } => {
            let body: Vec<String> = lines.iter().map(|l| escape(l)).collect();
            out.push(Fragment::Html(format!("<pre>{}</pre>", body.join("\n"))));
        }
        Block::Include { name } => out.push(Fragment::Include(name.clone())),
    }
}
