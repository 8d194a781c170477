//! # wikisnip
//!
//! Short, clean plain-text snippets from Wikipedia and Wiktionary, sized for
//! a chat line.
//!
//! ## Features
//!
//! - **Content extraction**: a single-pass filter over tokenized HTML that
//!   drops footnotes, edit links, thumbnails, hatnotes, message boxes and
//!   reference lists
//! - **Dictionary segmentation**: sorts a rendered Wiktionary page into an
//!   etymology and per-part-of-speech definitions using section anchors
//! - **Chat plumbing**: MediaWiki API client, link recognition, language
//!   preferences and byte-bounded reply lines

pub mod classify;
pub mod config;
pub mod extractor;
pub mod http;
pub mod links;
pub mod markup;
pub mod mediawiki;
pub mod normalize;
pub mod output;
pub mod segmenter;
pub mod storage;
pub mod wiktionary;

pub use config::Config;
pub use extractor::{extract, extract_html, ExtractorState};
pub use http::FetchError;
pub use markup::{tokenize, Attributes, MarkupEvent};
pub use mediawiki::MediaWiki;
pub use normalize::normalize;
pub use segmenter::{segment, segment_page, Definitions, Entry, PartOfSpeech, SectionMode};
pub use storage::LangStore;
pub use wiktionary::Wiktionary;
