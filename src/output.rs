//! Assembly of reply lines and byte-bounded truncation.
//!
//! Extracted text is never shortened by the extractor itself; this is the
//! only place a reply is cut to fit a chat line.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Marker appended to a cut body.
pub const TRUNCATION: &str = " [\u{2026}]";

/// Characters escaped in page URLs; `/`, `:` and parentheses stay readable.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A reply whose body may be cut, followed by a part that is always kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    body: String,
    trailing: String,
    truncation: String,
}

impl Reply {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            trailing: String::new(),
            truncation: TRUNCATION.to_string(),
        }
    }

    pub fn with_trailing(mut self, trailing: impl Into<String>) -> Self {
        self.trailing = trailing.into();
        self
    }

    pub fn with_truncation(mut self, truncation: impl Into<String>) -> Self {
        self.truncation = truncation.into();
        self
    }

    /// Render within `max_len` bytes. A body that does not fit is cut at the
    /// last whitespace before the limit and followed by the truncation marker.
    pub fn render(&self, max_len: usize) -> String {
        if self.body.len() + self.trailing.len() <= max_len {
            return format!("{}{}", self.body, self.trailing);
        }

        let budget = max_len.saturating_sub(self.truncation.len() + self.trailing.len());
        let head = cut_at_boundary(&self.body, budget);
        format!("{}{}{}", head.trim_end(), self.truncation, self.trailing)
    }
}

fn cut_at_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let head = &text[..end];
    match head.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => &head[..pos],
        _ => head,
    }
}

/// Display name of a page title: underscores become spaces.
pub fn page_name(title: &str) -> String {
    title.replace('_', " ")
}

/// Canonical URL of a page on `server`.
pub fn page_url(server: &str, title: &str) -> String {
    let path = title.replace(' ', "_");
    format!(
        "https://{server}/wiki/{}",
        utf8_percent_encode(&path, PATH_SEGMENT)
    )
}

/// `Page | "snippet"` with an optional `| url` that survives truncation.
pub fn snippet_reply(title: &str, snippet: &str, url: Option<&str>) -> Reply {
    let mut trailing = String::from("\"");
    if let Some(url) = url {
        trailing.push_str(" | ");
        trailing.push_str(url);
    }
    Reply::new(format!("{} | \"{}", page_name(title), snippet)).with_trailing(trailing)
}

/// `Page - Section | "text"`.
pub fn section_reply(title: &str, anchor: &str, text: &str) -> Reply {
    Reply::new(format!(
        "{} - {} | \"{}\"",
        page_name(title),
        page_name(anchor),
        text
    ))
    .with_truncation(format!("{TRUNCATION}\""))
}
