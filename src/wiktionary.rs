//! Wiktionary lookups: fetch the printable page of a word and render its
//! definitions or etymology as a single line.

use crate::config::HttpConfig;
use crate::http::{create_client, FetchError};
use crate::segmenter::{segment_page, Definitions, Entry};
use reqwest::{Client, Url};
use tracing::debug;

const INDEX_URL: &str = "https://en.wiktionary.org/w/index.php";

/// Rendered definitions shorter than this get more entries per section.
const SHORT_RESULT: usize = 300;

/// Separator placed before each part of speech.
const SECTION_SEPARATOR: &str = " \u{2014} ";

pub struct Wiktionary {
    client: Client,
}

impl Wiktionary {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: create_client(config)?,
        })
    }

    /// Fetch and segment the entry for `word`.
    pub async fn fetch_entry(&self, word: &str) -> Result<Entry, FetchError> {
        let url = Url::parse_with_params(INDEX_URL, &[("title", word), ("printable", "yes")])
            .map_err(|_| FetchError::InvalidServer(INDEX_URL.to_string()))?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        let html = response.text().await?;

        let entry = segment_page(&html);
        debug!(
            word,
            has_etymology = entry.etymology.is_some(),
            sections = entry.definitions.len(),
            "segmented wiktionary page"
        );
        Ok(entry)
    }

    /// Fetch definitions, retrying with the lower-cased word when the first
    /// lookup finds none.
    pub async fn lookup_definitions(&self, word: &str) -> Result<Definitions, FetchError> {
        let entry = self.fetch_entry(word).await?;
        if !entry.definitions.is_empty() {
            return Ok(entry.definitions);
        }

        let lower = word.to_lowercase();
        if lower == word {
            return Ok(entry.definitions);
        }
        Ok(self.fetch_entry(&lower).await?.definitions)
    }

    pub async fn lookup_etymology(&self, word: &str) -> Result<Option<String>, FetchError> {
        Ok(self.fetch_entry(word).await?.etymology)
    }
}

/// `word — noun: 1. a, 2. b — verb: 1. c`, at most `number` per section.
pub fn format_definitions(word: &str, definitions: &Definitions, number: usize) -> String {
    let mut result = word.to_string();
    for (pos, defs) in definitions {
        let numbered = defs
            .iter()
            .take(number)
            .enumerate()
            .map(|(i, def)| format!("{}. {}", i + 1, def.trim_matches([' ', '.'])))
            .collect::<Vec<_>>()
            .join(", ");
        result.push_str(SECTION_SEPARATOR);
        result.push_str(&format!("{pos}: {numbered}"));
    }
    result.trim_matches([' ', '.', ',']).to_string()
}

/// Render definitions, showing more per section while the line stays short.
pub fn render_definitions(word: &str, definitions: &Definitions) -> String {
    let mut result = format_definitions(word, definitions, 2);
    for number in [3, 5] {
        if result.len() >= SHORT_RESULT {
            break;
        }
        result = format_definitions(word, definitions, number);
    }
    result
}

pub fn format_etymology(word: &str, etymology: &str) -> String {
    format!("{word}: {etymology}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::PartOfSpeech;

    fn defs(items: Vec<(PartOfSpeech, Vec<&str>)>) -> Definitions {
        items
            .into_iter()
            .map(|(pos, list)| (pos, list.into_iter().map(String::from).collect()))
            .collect()
    }

    #[test]
    fn test_format_definitions() {
        let definitions = defs(vec![(
            PartOfSpeech::Noun,
            vec![
                "The district within which a bailie or bailiff has jurisdiction.",
                "A person's concern or sphere of operations.",
                "Unused third.",
            ],
        )]);
        assert_eq!(
            format_definitions("bailiwick", &definitions, 2),
            "bailiwick \u{2014} noun: 1. The district within which a bailie or bailiff has jurisdiction, 2. A person's concern or sphere of operations"
        );
    }

    #[test]
    fn test_sections_follow_canonical_order() {
        let definitions = defs(vec![
            (PartOfSpeech::Verb, vec!["To run."]),
            (PartOfSpeech::Noun, vec!["A run."]),
            (PartOfSpeech::ProperNoun, vec!["Run."]),
        ]);
        assert_eq!(
            format_definitions("run", &definitions, 2),
            "run \u{2014} noun: 1. A run \u{2014} proper noun: 1. Run \u{2014} verb: 1. To run"
        );
    }

    #[test]
    fn test_render_grows_short_results() {
        let definitions = defs(vec![(PartOfSpeech::Noun, vec!["a", "b", "c", "d", "e", "f"])]);
        assert_eq!(
            render_definitions("x", &definitions),
            "x \u{2014} noun: 1. a, 2. b, 3. c, 4. d, 5. e"
        );
    }

    #[test]
    fn test_render_keeps_two_when_long() {
        let long = "word ".repeat(70);
        let definitions = defs(vec![(PartOfSpeech::Noun, vec![long.as_str(), "short", "third"])]);
        let rendered = render_definitions("x", &definitions);
        assert!(rendered.contains("2. short"));
        assert!(!rendered.contains("3. third"));
    }

    #[test]
    fn test_format_etymology() {
        assert_eq!(
            format_etymology("bailiwick", "From bailie and wick."),
            "bailiwick: From bailie and wick."
        );
    }

    #[test]
    fn test_empty_definitions_render_word_only() {
        assert_eq!(format_definitions("word.", &Definitions::new(), 2), "word");
    }
}
