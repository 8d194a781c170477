//! Tag and attribute predicates used by the extractor.
//!
//! Class matching is deliberately loose: a substring anywhere in the class
//! attribute is enough, so `mw-editsection` counts as an edit span and any
//! class containing `mbox` counts as a message box.

use crate::markup::Attributes;

/// Tags whose text is never wanted: citation superscripts and inline styles.
pub const NO_CONSUME_TAGS: &[&str] = &["sup", "style"];

/// Class names of message box templates rendered as tables.
pub const MESSAGE_BOX_CLASSES: &[&str] = &[
    "ambox", // article pages
    "cmbox", // category pages
    "imbox", // file pages
    "tmbox", // talk pages
    "fmbox", // headers and footers
    "ombox", // other pages
    "mbox",  // namespace-independent boxes
    "dmbox", // disambiguation
];

pub fn is_no_consume(tag: &str) -> bool {
    NO_CONSUME_TAGS.contains(&tag)
}

/// `h1` through `h9`.
pub fn is_heading(tag: &str) -> bool {
    let bytes = tag.as_bytes();
    bytes.len() == 2 && bytes[0] == b'h' && bytes[1].is_ascii_digit()
}

/// Section edit links, e.g. `<span class="mw-editsection">`.
pub fn is_edit_span(attrs: &Attributes) -> bool {
    attrs.values("class").any(|class| class.contains("edit"))
}

/// Thumbnails, hatnotes and the table of contents.
pub fn is_excluded_div(attrs: &Attributes) -> bool {
    attrs
        .values("class")
        .any(|class| class.contains("thumb") || class.contains("hatnote") || class == "toc")
}

pub fn is_message_box(attrs: &Attributes) -> bool {
    attrs.values("class").any(|class| {
        let class = class.to_lowercase();
        MESSAGE_BOX_CLASSES.iter().any(|name| class.contains(name))
    })
}

/// The `<ol class="references">` list that ends an article's prose.
pub fn is_reference_list(attrs: &Attributes) -> bool {
    attrs
        .values("class")
        .any(|class| class.contains("references"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(value: &str) -> Attributes {
        [("class", value)].into_iter().collect()
    }

    #[test]
    fn test_no_consume_tags() {
        assert!(is_no_consume("sup"));
        assert!(is_no_consume("style"));
        assert!(!is_no_consume("sub"));
    }

    #[test]
    fn test_heading_tags() {
        assert!(is_heading("h1"));
        assert!(is_heading("h6"));
        assert!(!is_heading("hr"));
        assert!(!is_heading("h"));
        assert!(!is_heading("h10"));
        assert!(!is_heading("header"));
    }

    #[test]
    fn test_edit_span() {
        assert!(is_edit_span(&class("mw-editsection")));
        assert!(is_edit_span(&class("mw-editsection-bracket")));
        assert!(!is_edit_span(&class("mw-headline")));
        assert!(!is_edit_span(&[("id", "edit")].into_iter().collect()));
        assert!(!is_edit_span(&Attributes::new()));
    }

    #[test]
    fn test_excluded_div() {
        assert!(is_excluded_div(&class("thumb tright")));
        assert!(is_excluded_div(&class("thumbcaption")));
        assert!(is_excluded_div(&class("hatnote navigation-not-searchable")));
        assert!(is_excluded_div(&class("toc")));
        // Only an exact `toc` class excludes the table of contents.
        assert!(!is_excluded_div(&class("toclimit-3")));
        assert!(!is_excluded_div(&class("mw-parser-output")));
    }

    #[test]
    fn test_message_box_is_case_insensitive() {
        assert!(is_message_box(&class("box-Unreferenced plainlinks metadata AMBOX ambox-content")));
        assert!(is_message_box(&class("DMBOX")));
        assert!(!is_message_box(&class("wikitable")));
    }

    #[test]
    fn test_message_box_matching_is_broad() {
        // Any class containing "mbox" matches, including unrelated ones.
        assert!(is_message_box(&class("gumbox-gallery")));
    }

    #[test]
    fn test_reference_list() {
        assert!(is_reference_list(&class("references")));
        assert!(is_reference_list(&class("mw-references references-column-width")));
        assert!(!is_reference_list(&class("gallery")));
    }
}
