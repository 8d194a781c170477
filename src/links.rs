//! Recognition of Wikipedia article links posted in chat.

use lazy_static::lazy_static;
use percent_encoding::percent_decode_str;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref WIKIPEDIA_URL: Regex =
        Regex::new(r"https?://([a-z]+(?:\.m)?\.wikipedia\.org)/wiki/([^ ]+)")
            .expect("invalid wikipedia url regex");
}

const CITATION_PREFIX: &str = "cite_note-";
const MEDIA_PREFIX: &str = "/media";

/// What part of a page a link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// The page itself.
    Article,
    /// A footnote of the page; answered like the page itself.
    Citation,
    /// A section, by anchor.
    Section(String),
    /// A media file shown in the page's viewer.
    Media(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    /// e.g. `en.wikipedia.org` or `de.m.wikipedia.org`
    pub server: String,
    /// Decoded article title, underscores kept.
    pub article: String,
    pub target: LinkTarget,
}

/// Find the first Wikipedia link in `text`.
///
/// `File:` pages are not matched; `Special:` pages are skipped because the
/// API cannot query them.
pub fn find_link(text: &str) -> Option<WikiLink> {
    let caps = WIKIPEDIA_URL.captures(text)?;
    let server = caps[1].to_string();
    let rest = &caps[2];

    let (path, fragment) = match rest.split_once('#') {
        Some((path, fragment)) => (path, fragment),
        None => (rest, ""),
    };
    let path = path.split_once('?').map_or(path, |(path, _)| path);

    if path.starts_with("File:") {
        return None;
    }

    let article = decode(path);
    if article.starts_with("Special:") {
        debug!(%article, "ignoring page in Special: namespace");
        return None;
    }

    let fragment = decode(fragment);
    let target = if fragment.is_empty() {
        LinkTarget::Article
    } else if fragment.starts_with(CITATION_PREFIX) {
        LinkTarget::Citation
    } else if let Some(media) = fragment.strip_prefix(MEDIA_PREFIX) {
        LinkTarget::Media(media.trim_start_matches('/').to_string())
    } else {
        LinkTarget::Section(fragment)
    };

    Some(WikiLink {
        server,
        article,
        target,
    })
}

fn decode(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_link() {
        let link = find_link("look: https://en.wikipedia.org/wiki/San_Francisco cool").unwrap();
        assert_eq!(link.server, "en.wikipedia.org");
        assert_eq!(link.article, "San_Francisco");
        assert_eq!(link.target, LinkTarget::Article);
    }

    #[test]
    fn test_mobile_link_and_decoding() {
        let link = find_link("https://pl.m.wikipedia.org/wiki/Krak%C3%B3w").unwrap();
        assert_eq!(link.server, "pl.m.wikipedia.org");
        assert_eq!(link.article, "Kraków");
    }

    #[test]
    fn test_section_link() {
        let link = find_link("https://en.wikipedia.org/wiki/Rust_(programming_language)#Memory_safety").unwrap();
        assert_eq!(link.article, "Rust_(programming_language)");
        assert_eq!(link.target, LinkTarget::Section("Memory_safety".into()));
    }

    #[test]
    fn test_citation_link() {
        let link = find_link("https://en.wikipedia.org/wiki/Rust#cite_note-4").unwrap();
        assert_eq!(link.target, LinkTarget::Citation);
    }

    #[test]
    fn test_media_link() {
        let link = find_link("https://en.wikipedia.org/wiki/Cat#/media/File:Cat03.jpg").unwrap();
        assert_eq!(link.target, LinkTarget::Media("File:Cat03.jpg".into()));
    }

    #[test]
    fn test_query_string_is_ignored() {
        let link = find_link("https://en.wikipedia.org/wiki/Cat?oldid=1").unwrap();
        assert_eq!(link.article, "Cat");
    }

    #[test]
    fn test_rejected_links() {
        assert_eq!(find_link("https://en.wikipedia.org/wiki/File:Cat03.jpg"), None);
        assert_eq!(find_link("https://en.wikipedia.org/wiki/Special:Random"), None);
        assert_eq!(find_link("https://example.org/wiki/Cat"), None);
        assert_eq!(find_link("no link here"), None);
    }
}
