//! Line-stream section segmenter for rendered Wiktionary pages.
//!
//! A full DOM is not needed: each section heading carries an `id="..."`
//! anchor on its own line, so a single "current section" mode driven by
//! substring matches is enough to sort paragraphs and list items into an
//! etymology and per-part-of-speech definition lists.

use crate::normalize::{normalize, strip_unordered_lists};
use lazy_static::lazy_static;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

const ETYMOLOGY_ANCHOR: &str = "id=\"Etymology";
const ANY_ANCHOR: &str = "id=\"";
const LIST_ITEM: &str = "<li>";
const PARAGRAPH: &str = "<p>";
const TERMINATOR: &str = "<hr";

macro_rules! parts_of_speech {
    ($($variant:ident => $label:literal,)*) => {
        /// Section headings recognised as parts of speech, in display order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum PartOfSpeech {
            $($variant,)*
        }

        impl PartOfSpeech {
            pub const ALL: &'static [PartOfSpeech] = &[$(PartOfSpeech::$variant,)*];

            /// Heading text as it appears on the page, e.g. `Proper noun`.
            pub fn label(self) -> &'static str {
                match self {
                    $(PartOfSpeech::$variant => $label,)*
                }
            }
        }
    };
}

parts_of_speech! {
    Adjective => "Adjective",
    Adverb => "Adverb",
    Ambiposition => "Ambiposition",
    Article => "Article",
    Circumposition => "Circumposition",
    Classifier => "Classifier",
    Conjunction => "Conjunction",
    Contraction => "Contraction",
    Counter => "Counter",
    Determiner => "Determiner",
    Ideophone => "Ideophone",
    Interjection => "Interjection",
    Noun => "Noun",
    Numeral => "Numeral",
    Participle => "Participle",
    Particle => "Particle",
    Postposition => "Postposition",
    Preposition => "Preposition",
    Pronoun => "Pronoun",
    ProperNoun => "Proper noun",
    Verb => "Verb",
    Circumfix => "Circumfix",
    CombiningForm => "Combining form",
    Infix => "Infix",
    Interfix => "Interfix",
    Prefix => "Prefix",
    Root => "Root",
    Suffix => "Suffix",
    DiacriticalMark => "Diacritical mark",
    Letter => "Letter",
    Ligature => "Ligature",
    Number => "Number",
    PunctuationMark => "Punctuation mark",
    Syllable => "Syllable",
    Symbol => "Symbol",
    Phrase => "Phrase",
    Proverb => "Proverb",
    PrepositionalPhrase => "Prepositional phrase",
    HanCharacter => "Han character",
    Hanzi => "Hanzi",
    Kanji => "Kanji",
    Hanja => "Hanja",
    Romanization => "Romanization",
}

lazy_static! {
    static ref ANCHORS: Vec<(PartOfSpeech, String)> = PartOfSpeech::ALL
        .iter()
        .map(|&pos| (pos, format!("id=\"{}\"", pos.label().replace(' ', "_"))))
        .collect();
}

impl PartOfSpeech {
    /// Lower-cased label used as the section key, e.g. `proper noun`.
    pub fn name(self) -> String {
        self.label().to_lowercase()
    }

    /// The part of speech whose anchor appears in `line`, if any.
    pub fn find_anchor(line: &str) -> Option<Self> {
        ANCHORS
            .iter()
            .find(|(_, anchor)| line.contains(anchor.as_str()))
            .map(|&(pos, _)| pos)
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl Serialize for PartOfSpeech {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Section the segmenter is currently reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionMode {
    #[default]
    None,
    Etymology,
    PartOfSpeech(PartOfSpeech),
}

/// Definitions grouped by part of speech, each list in document order.
pub type Definitions = BTreeMap<PartOfSpeech, Vec<String>>;

/// Result of segmenting one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub etymology: Option<String>,
    pub definitions: Definitions,
}

impl Entry {
    pub fn is_empty(&self) -> bool {
        self.etymology.is_none() && self.definitions.is_empty()
    }
}

/// Incremental segmenter; feed lines until it reports the terminator.
#[derive(Debug, Default)]
pub struct Segmenter {
    mode: SectionMode,
    entry: Entry,
    finished: bool,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SectionMode {
        self.mode
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Process one line. Returns `false` once the terminator has been seen;
    /// later lines are ignored.
    pub fn feed(&mut self, line: &str) -> bool {
        if self.finished {
            return false;
        }

        if line.contains(ETYMOLOGY_ANCHOR) {
            self.mode = SectionMode::Etymology;
        } else if let Some(pos) = PartOfSpeech::find_anchor(line) {
            self.mode = SectionMode::PartOfSpeech(pos);
        } else if line.contains(ANY_ANCHOR) && !line.contains(LIST_ITEM) {
            // Footnote markers put ids inside list items; those stay content.
            self.mode = SectionMode::None;
        } else {
            match self.mode {
                SectionMode::Etymology if line.contains(PARAGRAPH) => {
                    self.push_etymology(&normalize(line));
                }
                SectionMode::PartOfSpeech(pos) if line.contains(LIST_ITEM) => {
                    self.entry
                        .definitions
                        .entry(pos)
                        .or_default()
                        .push(normalize(line));
                }
                _ => {}
            }
        }

        if line.contains(TERMINATOR) {
            self.finished = true;
        }
        !self.finished
    }

    fn push_etymology(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match &mut self.entry.etymology {
            Some(etymology) => {
                etymology.push(' ');
                etymology.push_str(text);
            }
            None => self.entry.etymology = Some(text.to_string()),
        }
    }

    pub fn finish(self) -> Entry {
        self.entry
    }
}

/// Segment already-split lines of markup.
pub fn segment<I, S>(lines: I) -> Entry
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut segmenter = Segmenter::new();
    for line in lines {
        if !segmenter.feed(line.as_ref()) {
            break;
        }
    }
    segmenter.finish()
}

/// Segment a whole rendered page. Nested `<ul>` blocks (quotations and
/// collapsible citations) can span many lines, so they are removed before
/// the page is split.
pub fn segment_page(html: &str) -> Entry {
    segment(strip_unordered_lists(html).lines())
}
