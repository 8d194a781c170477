//! Markup tokenizer.
//!
//! Flattens an HTML fragment into a stream of open/close/text events in
//! document order. Uses quick-xml in a lenient configuration: end tag names
//! are not checked against their openers and stray end tags are allowed, so
//! unbalanced markup comes through as-is for the extractor to tolerate.

use crate::normalize::{decode_entities, decode_entity};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use tracing::warn;

/// Ordered attribute list of an opening tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value for `name`, in source order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// One unit of tokenized markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    Open(String, Attributes),
    Close(String),
    Text(String),
}

impl MarkupEvent {
    /// Shorthand for an opening tag without attributes.
    pub fn open(tag: &str) -> Self {
        Self::Open(tag.to_string(), Attributes::new())
    }

    /// Shorthand for an opening tag with a single `class` attribute.
    pub fn open_with_class(tag: &str, class: &str) -> Self {
        Self::Open(tag.to_string(), [("class", class)].into_iter().collect())
    }

    pub fn close(tag: &str) -> Self {
        Self::Close(tag.to_string())
    }

    pub fn text(content: &str) -> Self {
        Self::Text(content.to_string())
    }
}

/// Tokenize an HTML fragment.
///
/// Tag and attribute names are lower-cased. Self-closing tags yield an open
/// immediately followed by a close. Character references are decoded and
/// adjacent text runs merged, so a heading like `Fish &amp; chips` arrives
/// as a single text event. Stray `&` and `<` in text are kept as text. A
/// tokenizer error ends the stream early.
pub fn tokenize(markup: &str) -> Vec<MarkupEvent> {
    let markup = escape_stray_markup(markup);
    let mut reader = Reader::from_str(&markup);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut events = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                flush_text(&mut events, &mut text);
                events.push(MarkupEvent::Open(tag_name(e.name().as_ref()), attributes(&e)));
            }
            Ok(Event::Empty(e)) => {
                flush_text(&mut events, &mut text);
                let name = tag_name(e.name().as_ref());
                events.push(MarkupEvent::Open(name.clone(), attributes(&e)));
                events.push(MarkupEvent::Close(name));
            }
            Ok(Event::End(e)) => {
                flush_text(&mut events, &mut text);
                events.push(MarkupEvent::Close(tag_name(e.name().as_ref())));
            }
            Ok(Event::Text(e)) => text.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::CData(e)) => text.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::GeneralRef(e)) => {
                let name = String::from_utf8_lossy(&e);
                match decode_entity(&name) {
                    Some(decoded) => text.push_str(&decoded),
                    None => {
                        text.push('&');
                        text.push_str(&name);
                        text.push(';');
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(
                    error = %e,
                    position = reader.error_position(),
                    "malformed markup, stopping tokenizer"
                );
                break;
            }
        }
    }
    flush_text(&mut events, &mut text);

    events
}

fn flush_text(events: &mut Vec<MarkupEvent>, text: &mut String) {
    if !text.is_empty() {
        events.push(MarkupEvent::Text(std::mem::take(text)));
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn attributes(start: &BytesStart) -> Attributes {
    start
        .html_attributes()
        .flatten()
        .map(|attr| {
            let key = tag_name(attr.key.as_ref());
            let value = decode_entities(&String::from_utf8_lossy(&attr.value));
            (key, value)
        })
        .collect()
}

/// Escape `&` characters that do not start a character reference, and `<`
/// characters that do not start a tag.
///
/// Real-world HTML is full of `AT&T` and `a < b`; a strict reader would
/// reject the first as a broken reference and read the second as a tag.
fn escape_stray_markup(markup: &str) -> Cow<'_, str> {
    if !markup.contains(['&', '<']) {
        return Cow::Borrowed(markup);
    }

    let mut out = String::with_capacity(markup.len() + 16);
    let mut rest = markup;
    while let Some(pos) = rest.find(['&', '<']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        if rest[pos..].starts_with('&') {
            if starts_with_reference(tail) {
                out.push('&');
            } else {
                out.push_str("&amp;");
            }
        } else if starts_with_tag(tail) {
            out.push('<');
        } else {
            out.push_str("&lt;");
        }
        rest = tail;
    }
    out.push_str(rest);

    Cow::Owned(out)
}

fn starts_with_tag(tail: &str) -> bool {
    tail.starts_with(|c: char| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

fn starts_with_reference(tail: &str) -> bool {
    let Some(end) = tail.find(';') else {
        return false;
    };
    let body = &tail[..end];
    match body.strip_prefix('#') {
        Some(number) => match number.strip_prefix(['x', 'X']) {
            Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()),
        },
        None => {
            let mut chars = body.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric())
        }
    }
}
