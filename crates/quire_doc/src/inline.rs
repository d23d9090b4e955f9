//! Inline markup rendering: ``literal``, **strong**, *emphasis*.

/// Renders inline markup in `text` to HTML, escaping everything else.
///
/// Markers without a closing partner are emitted literally.
pub(crate) fn render_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while !rest.is_empty() {
        if let Some((tag, inner, after)) = match_span(rest) {
            out.push('<');
            out.push_str(tag);
            out.push('>');
            if tag == "code" {
                escape_into(&mut out, inner);
            } else {
                out.push_str(&render_inline(inner));
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
            rest = after;
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            push_escaped(&mut out, c);
        }
        rest = chars.as_str();
    }
    out
}

/// Returns `(tag, inner, remainder)` if `text` starts with a closed span.
fn match_span(text: &str) -> Option<(&'static str, &str, &str)> {
    for (marker, tag) in [("``", "code"), ("**", "strong"), ("*", "em")] {
        if let Some(body) = text.strip_prefix(marker) {
            let end = body.find(marker)?;
            if end == 0 {
                return None;
            }
            return Some((tag, &body[..end], &body[end + marker.len()..]));
        }
    }
    None
}

/// Escapes HTML special characters.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        push_escaped(out, c);
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        _ => out.push(c),
    }
}
