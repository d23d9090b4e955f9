use std::path::Path;

use quire_common::name_prefix;

use crate::ast::{AstDoc, Block};
use crate::error::ParseError;

/// Reads and parses the document at `path`.
///
/// The document's logical name is the file name without its extension.
pub fn parse_file(path: &Path) -> Result<AstDoc, ParseError> {
    let source = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let name = path
        .file_name()
        .map(|n| name_prefix(&n.to_string_lossy()))
        .unwrap_or_default();
    parse_str(&name, &source)
}

/// Parses document text under the logical name `name`.
pub fn parse_str(name: &str, source: &str) -> Result<AstDoc, ParseError> {
    let lines: Vec<&str> = source.lines().collect();
    let mut parser = Parser {
        doc: name,
        lines: &lines,
        pos: 0,
        blocks: Vec::new(),
    };
    parser.parse()?;
    Ok(AstDoc {
        name: name.to_string(),
        blocks: parser.blocks,
    })
}

struct Parser<'a> {
    doc: &'a str,
    lines: &'a [&'a str],
    pos: usize,
    blocks: Vec<Block>,
}

impl<'a> Parser<'a> {
    fn parse(&mut self) -> Result<(), ParseError> {
        while let Some(line) = self.peek(0) {
            if is_blank(line) {
                self.pos += 1;
            } else if let Some(rest) = line.strip_prefix(".. ") {
                self.explicit_markup(rest)?;
            } else if self.at_title() {
                self.section()?;
            } else if bullet_text(line).is_some() {
                self.bullet_list();
            } else {
                self.paragraph();
            }
        }
        Ok(())
    }

    fn peek(&self, offset: usize) -> Option<&'a str> {
        self.lines.get(self.pos + offset).copied()
    }

    fn line_number(&self) -> usize {
        self.pos + 1
    }

    fn at_title(&self) -> bool {
        match (self.peek(0), self.peek(1)) {
            (Some(line), Some(next)) => {
                !line.starts_with(char::is_whitespace)
                    && underline_level(line).is_none()
                    && underline_level(next).is_some()
            }
            _ => false,
        }
    }

    /// `.. name:: argument` is a directive; anything else after `.. ` is a comment.
    fn explicit_markup(&mut self, rest: &str) -> Result<(), ParseError> {
        let line = self.line_number();
        self.pos += 1;

        if let Some((directive, argument)) = split_directive(rest) {
            if directive != "include" {
                return Err(ParseError::UnknownDirective {
                    doc: self.doc.to_string(),
                    line,
                    directive: directive.to_string(),
                });
            }
            if argument.is_empty() {
                return Err(ParseError::MissingIncludeTarget {
                    doc: self.doc.to_string(),
                    line,
                });
            }
            self.blocks.push(Block::Include {
                name: name_prefix(argument),
            });
            return Ok(());
        }

        // comment body
        while let Some(next) = self.peek(0) {
            if is_blank(next) || !next.starts_with(char::is_whitespace) {
                break;
            }
            self.pos += 1;
        }
        Ok(())
    }

    fn section(&mut self) -> Result<(), ParseError> {
        let (title, underline) = match (self.peek(0), self.peek(1)) {
            (Some(t), Some(u)) => (t.trim_end(), u.trim_end()),
            _ => return Ok(()),
        };
        if underline.chars().count() < title.chars().count() {
            return Err(ParseError::UnderlineTooShort {
                doc: self.doc.to_string(),
                line: self.line_number(),
            });
        }
        let level = underline_level(underline).unwrap_or(1);
        self.blocks.push(Block::Section {
            level,
            title: title.to_string(),
        });
        self.pos += 2;
        Ok(())
    }

    fn bullet_list(&mut self) {
        let mut items: Vec<String> = Vec::new();
        while let Some(line) = self.peek(0) {
            if let Some(text) = bullet_text(line) {
                items.push(text.trim().to_string());
            } else if !is_blank(line) && line.starts_with(char::is_whitespace) && !items.is_empty()
            {
                if let Some(last) = items.last_mut() {
                    last.push(' ');
                    last.push_str(line.trim());
                }
            } else {
                break;
            }
            self.pos += 1;
        }
        self.blocks.push(Block::BulletList { items });
    }

    fn paragraph(&mut self) {
        let mut parts: Vec<&str> = Vec::new();
        while let Some(line) = self.peek(0) {
            if is_blank(line) || (!parts.is_empty() && self.at_title()) {
                break;
            }
            parts.push(line.trim());
            self.pos += 1;
        }
        let text = parts.join(" ");

        match text.strip_suffix("::") {
            Some(lead) => {
                let lead = lead.trim_end();
                if !lead.is_empty() {
                    // "Example::" renders as "Example:", a bare "::" disappears.
                    let shown = if text.ends_with(" ::") {
                        lead.to_string()
                    } else {
                        format!("{lead}:")
                    };
                    self.blocks.push(Block::Paragraph { text: shown });
                }
                self.literal_block();
            }
            None => self.blocks.push(Block::Paragraph { text }),
        }
    }

    fn literal_block(&mut self) {
        let start = self.pos;
        while self.peek(0).is_some_and(is_blank) {
            self.pos += 1;
        }

        let mut raw: Vec<&str> = Vec::new();
        while let Some(line) = self.peek(0) {
            if !is_blank(line) && !line.starts_with(char::is_whitespace) {
                break;
            }
            raw.push(line);
            self.pos += 1;
        }
        while raw.last().is_some_and(|l| is_blank(l)) {
            raw.pop();
        }
        if raw.is_empty() {
            self.pos = start;
            return;
        }

        let indent = raw
            .iter()
            .filter(|l| !is_blank(l))
            .map(|l| l.len() - l.trim_start().len())
            .min()
            .unwrap_or(0);
        let lines = raw
            .iter()
            .map(|l| l.get(indent..).unwrap_or("").trim_end().to_string())
            .collect();
        self.blocks.push(Block::LiteralBlock { lines });
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn bullet_text(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

fn underline_level(line: &str) -> Option<u8> {
    let line = line.trim_end();
    let first = line.chars().next()?;
    let level = match first {
        '=' => 1,
        '-' => 2,
        '~' => 3,
        _ => return None,
    };
    line.chars().all(|c| c == first).then_some(level)
}

fn split_directive(rest: &str) -> Option<(&str, &str)> {
    let (name, argument) = rest.split_once("::")?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| (name, argument.trim()))
}
