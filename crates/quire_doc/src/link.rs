use std::collections::HashMap;
use std::rc::Rc;

use quire_cache::CacheStore;
use quire_common::CodeKey;

use crate::code::{Code, CodeBody, Fragment, DOC_KIND};
use crate::error::LinkError;
use crate::inline::escape;

/// Assembles the output page of `target` from cached code.
///
/// The first entry of the target's recorded dependency list is its own code;
/// include placeholders are expanded recursively from the cache. Returns the
/// page as lines without trailing newlines.
pub fn link(store: &CacheStore, target: &str) -> Result<Vec<String>, LinkError> {
    let root = store
        .get_dependencies(target)
        .first()
        .cloned()
        .ok_or_else(|| LinkError::UnknownTarget {
            target: target.to_string(),
        })?;

    let mut linker = Linker {
        store,
        target,
        loaded: HashMap::new(),
        stack: Vec::new(),
    };
    let root_body = linker.load(&root)?;
    let title = root_body.title.clone().unwrap_or_else(|| escape(target));

    let mut lines = vec![
        "<!DOCTYPE html>".to_string(),
        "<html>".to_string(),
        "<head>".to_string(),
        "<meta charset=\"utf-8\">".to_string(),
        format!("<title>{title}</title>"),
        "</head>".to_string(),
        "<body>".to_string(),
    ];
    linker.expand(&root, &mut lines)?;
    lines.push("</body>".to_string());
    lines.push("</html>".to_string());
    Ok(lines)
}

struct Linker<'a> {
    store: &'a CacheStore,
    target: &'a str,
    loaded: HashMap<CodeKey, Rc<CodeBody>>,
    stack: Vec<String>,
}

impl Linker<'_> {
    fn load(&mut self, key: &CodeKey) -> Result<Rc<CodeBody>, LinkError> {
        if let Some(body) = self.loaded.get(key) {
            return Ok(Rc::clone(body));
        }
        let body = Code::read_cache(self.store, key).ok_or_else(|| LinkError::MissingCode {
            target: self.target.to_string(),
            key: key.clone(),
        })?;
        let body = Rc::new(body);
        self.loaded.insert(key.clone(), Rc::clone(&body));
        Ok(body)
    }

    fn expand(&mut self, key: &CodeKey, lines: &mut Vec<String>) -> Result<(), LinkError> {
        if self.stack.contains(&key.name) {
            let mut chain = self.stack.clone();
            chain.push(key.name.clone());
            return Err(LinkError::IncludeCycle {
                target: self.target.to_string(),
                chain: chain.join(" -> "),
            });
        }

        let body = self.load(key)?;
        self.stack.push(key.name.clone());
        for fragment in &body.fragments {
            match fragment {
                Fragment::Html(line) => lines.push(line.clone()),
                Fragment::Include(name) => self.expand(&CodeKey::new(DOC_KIND, name), lines)?,
            }
        }
        self.stack.pop();
        Ok(())
    }
}
