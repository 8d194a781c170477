//! MediaWiki API client: search, intro snippets, section text and image
//! descriptions.
//!
//! Section text and image descriptions come back as rendered HTML and are
//! run through the content extractor before being returned.

use crate::config::HttpConfig;
use crate::extractor::extract_html;
use crate::http::{create_client, FetchError};
use crate::normalize::collapse_whitespace;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Characters requested for an intro extract.
const SNIPPET_CHARS: &str = "500";

#[derive(Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct PagesResponse<P> {
    query: Option<PagesQuery<P>>,
}

#[derive(Deserialize)]
struct PagesQuery<P> {
    #[serde(default)]
    pageids: Vec<String>,
    pages: BTreeMap<String, P>,
}

#[derive(Deserialize)]
struct ExtractPage {
    extract: Option<String>,
}

#[derive(Deserialize)]
struct ImagePage {
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Deserialize)]
struct ImageInfo {
    extmetadata: ExtMetadata,
}

#[derive(Deserialize)]
struct ExtMetadata {
    #[serde(rename = "ImageDescription")]
    image_description: Option<MetadataValue>,
}

#[derive(Deserialize)]
struct MetadataValue {
    value: String,
}

#[derive(Deserialize)]
struct ParseResponse<T> {
    parse: Option<T>,
}

#[derive(Deserialize)]
struct SectionsParse {
    sections: Vec<SectionInfo>,
}

/// One entry of a page's section list.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionInfo {
    pub anchor: String,
    pub index: String,
    /// Page the section really lives on; differs for transcluded sections.
    pub fromtitle: Option<String>,
}

#[derive(Deserialize)]
struct TextParse {
    text: ParsedText,
}

#[derive(Deserialize)]
struct ParsedText {
    #[serde(rename = "*")]
    html: String,
}

/// Client for one MediaWiki server, e.g. `en.wikipedia.org`.
pub struct MediaWiki {
    client: Client,
    server: String,
}

impl MediaWiki {
    pub fn new(server: impl Into<String>, config: &HttpConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: create_client(config)?,
            server: server.into(),
        })
    }

    /// Client for the Wikipedia of the given language.
    pub fn wikipedia(lang: &str, config: &HttpConfig) -> Result<Self, FetchError> {
        Self::new(format!("{lang}.wikipedia.org"), config)
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    async fn get_json<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, FetchError> {
        let endpoint = format!("https://{}/w/api.php", self.server);
        let url = Url::parse_with_params(&endpoint, params)
            .map_err(|_| FetchError::InvalidServer(self.server.clone()))?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Full-text search returning up to `limit` page titles.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<String>, FetchError> {
        let limit = limit.to_string();
        let response: SearchResponse = self
            .get_json(&[
                ("format", "json"),
                ("action", "query"),
                ("list", "search"),
                ("srlimit", limit.as_str()),
                ("srprop", "timestamp"),
                ("srwhat", "text"),
                ("srsearch", query),
            ])
            .await?;

        let titles = response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default();
        debug!(server = %self.server, query, ?titles, "search finished");
        Ok(titles)
    }

    /// Plain-text intro of a page, whitespace collapsed.
    pub async fn snippet(&self, title: &str) -> Result<String, FetchError> {
        let response: PagesResponse<ExtractPage> = self
            .get_json(&[
                ("format", "json"),
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exchars", SNIPPET_CHARS),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;

        let pages = response.query.ok_or(FetchError::MissingField("query"))?.pages;
        // Pages are keyed by page id; only one was asked for.
        let page = pages
            .into_values()
            .next()
            .ok_or(FetchError::MissingField("pages"))?;
        let extract = page.extract.ok_or(FetchError::MissingField("extract"))?;

        // <math> markup leaves long whitespace runs in plain-text extracts.
        Ok(collapse_whitespace(&extract))
    }

    /// Section list of a page.
    pub async fn sections(&self, title: &str) -> Result<Vec<SectionInfo>, FetchError> {
        let response: ParseResponse<SectionsParse> = self
            .get_json(&[
                ("format", "json"),
                ("redirects", "1"),
                ("action", "parse"),
                ("prop", "sections"),
                ("page", title),
            ])
            .await?;
        Ok(response
            .parse
            .ok_or(FetchError::MissingField("parse"))?
            .sections)
    }

    /// Extracted text of the section with the given anchor, or `None` when
    /// the page has no such section.
    pub async fn section(&self, title: &str, anchor: &str) -> Result<Option<String>, FetchError> {
        let sections = self.sections(title).await?;
        let Some((index, source)) = find_section(&sections, anchor) else {
            debug!(title, anchor, "no matching section");
            return Ok(None);
        };

        let response: ParseResponse<TextParse> = self
            .get_json(&[
                ("format", "json"),
                ("redirects", "1"),
                ("action", "parse"),
                ("page", source),
                ("prop", "text"),
                ("section", index),
            ])
            .await?;
        let html = response
            .parse
            .ok_or(FetchError::MissingField("parse"))?
            .text
            .html;

        let text = extract_html(&html, &anchor.replace('_', " "));
        Ok(Some(text))
    }

    /// Description of a file page, with its markup stripped.
    pub async fn image_description(&self, image: &str) -> Result<Option<String>, FetchError> {
        let response: PagesResponse<ImagePage> = self
            .get_json(&[
                ("action", "query"),
                ("prop", "imageinfo"),
                ("format", "json"),
                ("indexpageids", "1"),
                ("iiprop", "extmetadata"),
                ("iiextmetadatafilter", "ImageDescription"),
                ("iilimit", "1"),
                ("titles", image),
            ])
            .await?;

        let description = response.query.and_then(|mut query| {
            let id = query.pageids.first()?.clone();
            let page = query.pages.remove(&id)?;
            let info = page.imageinfo.into_iter().next()?;
            info.extmetadata.image_description.map(|d| d.value)
        });

        match description {
            Some(raw) => Ok(Some(extract_html(&raw, image))),
            None => {
                warn!(server = %self.server, image, "no image description in response");
                Ok(None)
            }
        }
    }
}

/// Section index and source page for `anchor`. Both must be present.
fn find_section<'a>(sections: &'a [SectionInfo], anchor: &str) -> Option<(&'a str, &'a str)> {
    let section = sections.iter().find(|s| s.anchor == anchor)?;
    Some((section.index.as_str(), section.fromtitle.as_deref()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_section_requires_source_page() {
        let sections: Vec<SectionInfo> = serde_json::from_str(
            r#"[
                {"anchor": "History", "index": "1", "fromtitle": "Rust"},
                {"anchor": "Usage", "index": "2"},
                {"anchor": "Docs", "index": "T-1", "fromtitle": "Template:Rust/doc"}
            ]"#,
        )
        .unwrap();

        assert_eq!(find_section(&sections, "History"), Some(("1", "Rust")));
        assert_eq!(find_section(&sections, "Usage"), None);
        assert_eq!(
            find_section(&sections, "Docs"),
            Some(("T-1", "Template:Rust/doc"))
        );
        assert_eq!(find_section(&sections, "history"), None);
    }

    #[test]
    fn test_parses_extract_response() {
        let response: PagesResponse<ExtractPage> = serde_json::from_str(
            r#"{"batchcomplete": "", "query": {"pages": {"736": {"pageid": 736, "title": "Albert Einstein", "extract": "Albert Einstein was a physicist."}}}}"#,
        )
        .unwrap();
        let page = response.query.unwrap().pages.into_values().next().unwrap();
        assert_eq!(page.extract.as_deref(), Some("Albert Einstein was a physicist."));
    }

    #[test]
    fn test_parses_search_without_results() {
        let response: SearchResponse = serde_json::from_str(r#"{"error": {"code": "x"}}"#).unwrap();
        assert!(response.query.is_none());
    }

    #[test]
    fn test_parses_section_text() {
        let response: ParseResponse<TextParse> = serde_json::from_str(
            r#"{"parse": {"title": "Rust", "text": {"*": "<div class=\"mw-parser-output\"><p>Hi</p></div>"}}}"#,
        )
        .unwrap();
        let html = response.parse.unwrap().text.html;
        assert_eq!(extract_html(&html, "History"), "Hi");
    }

    #[test]
    fn test_parses_image_metadata() {
        let response: PagesResponse<ImagePage> = serde_json::from_str(
            r#"{"query": {"pageids": ["-1"], "pages": {"-1": {"imageinfo": [{"extmetadata": {"ImageDescription": {"value": "A <b>cat</b>", "source": "commons-desc-page"}}}]}}}}"#,
        )
        .unwrap();
        let query = response.query.unwrap();
        assert_eq!(query.pageids, vec!["-1"]);
        let info = &query.pages["-1"].imageinfo[0];
        let value = &info.extmetadata.image_description.as_ref().unwrap().value;
        assert_eq!(extract_html(value, "Cat.jpg"), "A cat");
    }
}
