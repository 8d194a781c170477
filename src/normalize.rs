//! Text normalization shared by the extractor and the segmenter.
//!
//! Turns a fragment of rendered markup into a single clean line: reference
//! superscripts and collapsible lists are dropped, remaining tags stripped,
//! entities decoded and whitespace collapsed.

use lazy_static::lazy_static;
use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};
use std::borrow::Cow;

lazy_static! {
    /// Superscripts carrying attributes are footnote references, not ordinals.
    static ref REFERENCE_SUP: Regex = Regex::new(r"<sup[^>]+>.+?</sup>").expect("invalid sup regex");
    static ref UNORDERED_LIST: Regex = Regex::new(r"(?is)<ul>.*?</ul>").expect("invalid list regex");
    static ref TAG: Regex = Regex::new(r"<[^>]+>").expect("invalid tag regex");
    static ref ENTITY: Regex =
        Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);")
            .expect("invalid entity regex");
}

/// Fixed readability substitutions applied after cleanup.
const ABBREVIATIONS: &[(&str, &str)] = &[("(intransitive", "(intr."), ("(transitive", "(trans.")];

/// Normalize a line of markup into display text.
///
/// Tags are stripped before entities are decoded, so escaped markup such as
/// `&lt;b&gt;` survives as literal `<b>`. Normalizing that output again
/// strips it; the function is idempotent only on text without encoded
/// angle brackets.
pub fn normalize(raw: &str) -> String {
    let text = REFERENCE_SUP.replace_all(raw, "");
    let text = UNORDERED_LIST.replace_all(&text, "");
    let text = TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    abbreviate(&collapse_whitespace(&text))
}

/// Remove every `<ul>...</ul>` block, across line breaks.
pub fn strip_unordered_lists(markup: &str) -> Cow<'_, str> {
    UNORDERED_LIST.replace_all(markup, "")
}

/// Collapse runs of whitespace (newlines included) into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode HTML character references. Unknown references are left as written.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Resolve a single reference body, e.g. `amp`, `#39` or `#x2014`.
pub fn decode_entity(name: &str) -> Option<String> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    resolve_html5_entity(name).map(String::from)
}

fn abbreviate(text: &str) -> String {
    ABBREVIATIONS
        .iter()
        .fold(text.to_string(), |acc, (long, short)| acc.replace(long, short))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_inline_tags() {
        assert_eq!(normalize("<p>From <i>foo</i>.</p>"), "From foo.");
    }

    #[test]
    fn test_removes_reference_superscripts_before_tags() {
        let line = r##"<li>A bird<sup id="cite_ref-1" class="reference"><a href="#cite_note-1">[1]</a></sup> of prey.</li>"##;
        assert_eq!(normalize(line), "A bird of prey.");
    }

    #[test]
    fn test_keeps_plain_superscripts() {
        assert_eq!(normalize("the 1<sup>st</sup> of May"), "the 1st of May");
    }

    #[test]
    fn test_removes_unordered_lists() {
        assert_eq!(
            normalize("<li>to run<ul><li>quotation</li></ul></li>"),
            "to run"
        );
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(
            normalize("fish &amp; chips&nbsp;&#8212; &#x27;tasty&#39; &bogus;"),
            "fish & chips \u{2014} 'tasty' &bogus;"
        );
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  a\n\tb \r\n  c  "), "a b c");
    }

    #[test]
    fn test_abbreviates_grammatical_voice() {
        assert_eq!(
            normalize("<li>(intransitive) To sleep. (transitive) To bed.</li>"),
            "(intr.) To sleep. (trans.) To bed."
        );
    }

    #[test]
    fn test_is_idempotent() {
        let inputs = [
            "<p>From <i>foo</i>.</p>",
            "<li>(transitive) To <b>hit</b>&nbsp;hard<sup id=\"x\">[2]</sup>.</li>",
            "plain   text",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_encoded_tags_are_not_stable() {
        let once = normalize("x &lt;b&gt; y");
        assert_eq!(once, "x <b> y");
        assert_eq!(normalize(&once), "x y");
    }

    #[test]
    fn test_decode_entity_rejects_invalid_code_points() {
        assert_eq!(decode_entity("#xD800"), None);
        assert_eq!(decode_entity("#99999999999"), None);
        assert_eq!(decode_entity("lt").as_deref(), Some("<"));
    }

    #[test]
    fn test_strip_unordered_lists_spans_lines() {
        let page = "<ol>\n<li>one<ul>\n<li>quote</li>\n</ul></li>\n</ol>";
        assert_eq!(strip_unordered_lists(page), "<ol>\n<li>one</li>\n</ol>");
    }
}
