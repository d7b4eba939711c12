//! Canonical markup codec.
//!
//! The canonical value is a small HTML subset: escaped text, `<br>` and
//! `<img src="...">`. Parsing is lenient about what editing surfaces tend to
//! produce (`<br/>`, `<div>` line wrappers, stray tags, unescaped `&`) and
//! always yields a normalized node list: no empty text runs, no two text runs
//! in a row. Serializing that list and parsing it again gives the same list.

use pulldown_cmark_escape::{StrWrite, escape_href, escape_html};
use smol_str::SmolStr;

use crate::types::NodeContent;

/// Parse canonical markup into node contents.
pub fn parse(markup: &str) -> Vec<NodeContent> {
    let mut out = Builder::default();
    let mut rest = markup;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            out.push_text(&decode_entities(rest));
            break;
        };
        if lt > 0 {
            out.push_text(&decode_entities(&rest[..lt]));
        }
        let after = &rest[lt + 1..];
        let Some(gt) = after.find('>') else {
            // Unterminated tag: keep it as text.
            out.push_text(&decode_entities(&rest[lt..]));
            break;
        };
        out.push_tag(&after[..gt]);
        rest = &after[gt + 1..];
    }

    out.contents
}

/// Serialize node contents into canonical markup.
pub fn serialize<'a>(contents: impl IntoIterator<Item = &'a NodeContent>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_markup(&mut out, contents);
    out
}

/// Write node contents as canonical markup.
///
/// Text runs are HTML-escaped; attachment URLs are escaped as hrefs.
pub fn write_markup<'a, W: StrWrite>(
    mut w: W,
    contents: impl IntoIterator<Item = &'a NodeContent>,
) -> Result<(), W::Error> {
    for content in contents {
        match content {
            NodeContent::Text(text) => escape_html(&mut w, text)?,
            NodeContent::LineBreak => w.write_str("<br>")?,
            NodeContent::Attachment { url } => {
                w.write_str("<img src=\"")?;
                escape_href(&mut w, url)?;
                w.write_str("\">")?;
            }
        }
    }
    Ok(())
}

/// Split plain text into contents, turning `\n` into line breaks.
pub fn text_to_contents(text: &str) -> Vec<NodeContent> {
    let mut out = Builder::default();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.contents.push(NodeContent::LineBreak);
        }
        out.push_text(line);
    }
    out.contents
}

#[derive(Default)]
struct Builder {
    contents: Vec<NodeContent>,
}

impl Builder {
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(NodeContent::Text(last)) = self.contents.last_mut() {
            last.push_str(text);
        } else {
            self.contents.push(NodeContent::Text(text.to_string()));
        }
    }

    fn push_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        let closing = tag.starts_with('/');
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match (name.as_str(), closing) {
            ("br", false) => self.contents.push(NodeContent::LineBreak),
            ("img", false) => match attribute(tag, "src") {
                Some(src) if !src.is_empty() => {
                    self.contents.push(NodeContent::Attachment {
                        url: SmolStr::new(src),
                    })
                }
                _ => tracing::debug!(target: "scribe::sync", "dropping <img> without src"),
            },
            // Block wrappers start a new line unless one was just started.
            ("div" | "p", false) => {
                if !matches!(self.contents.last(), None | Some(NodeContent::LineBreak)) {
                    self.contents.push(NodeContent::LineBreak);
                }
            }
            _ => {}
        }
    }
}

/// Extract a quoted attribute value from the inside of a tag.
fn attribute(tag: &str, name: &str) -> Option<String> {
    let lower = tag.to_ascii_lowercase();
    let mut search_from = 0;
    while let Some(found) = lower[search_from..].find(name) {
        let start = search_from + found;
        search_from = start + name.len();

        // Must be a whole attribute name.
        let preceded_ok = lower[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_whitespace());
        if !preceded_ok {
            continue;
        }
        let rest = tag[start + name.len()..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let inner = &rest[1..];
                let end = inner.find(quote)?;
                &inner[..end]
            }
            Some(_) => rest
                .split(|c: char| c.is_ascii_whitespace())
                .next()
                .unwrap_or_default(),
            None => return None,
        };
        return Some(decode_entities(value));
    }
    None
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp + 1..];
        let decoded = candidate
            .find(';')
            .filter(|&semi| semi <= 8)
            .and_then(|semi| decode_entity(&candidate[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = candidate;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
