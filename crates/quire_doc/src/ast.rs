/// A parsed source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstDoc {
    /// Logical name: the source file name without its extension.
    pub name: String,
    /// Top-level blocks in source order.
    pub blocks: Vec<Block>,
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A section title. Level 1 is underlined with `=`, 2 with `-`, 3 with `~`.
    Section {
        /// Nesting level, 1 to 3.
        level: u8,
        /// Raw title text, inline markup not yet rendered.
        title: String,
    },
    /// Consecutive text lines joined by single spaces.
    Paragraph {
        /// Raw paragraph text.
        text: String,
    },
    /// A run of `- ` or `* ` items.
    BulletList {
        /// Raw item texts.
        items: Vec<String>,
    },
    /// Preformatted lines introduced by a paragraph ending in `::`.
    LiteralBlock {
        /// Lines with their common indentation removed.
        lines: Vec<String>,
    },
    /// An `.. include:: <name>` directive.
    Include {
        /// Logical name of the included document.
        name: String,
    },
}

impl AstDoc {
    /// Names of all included documents, in order of appearance, without duplicates.
    pub fn includes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for block in &self.blocks {
            if let Block::Include { name } = block {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// The text of the first section title, if any.
    pub fn title(&self) -> Option<&str> {
        self.blocks.iter().find_map(|b| match b {
            Block::Section { title, .. } => Some(title.as_str()),
            _ => None,
        })
    }
}
