//! Tag-stream content extractor.
//!
//! Walks a [`MarkupEvent`] stream once and keeps only the text that belongs
//! to the article body. Footnote markers, edit links, thumbnails, hatnotes,
//! the table of contents, message boxes and everything from the reference
//! list onwards are dropped. Each exclusion category has its own counter or
//! flag so that nested regions of the same tag do not end suppression early.

use crate::classify;
use crate::markup::{tokenize, Attributes, MarkupEvent};
use crate::normalize::collapse_whitespace;

/// Mutable state of a single extraction pass.
#[derive(Debug, Default)]
pub struct ExtractorState {
    suppress_depth: usize,
    in_header: bool,
    past_citations: bool,
    in_messagebox: bool,
    span_exclude_depth: usize,
    div_exclude_depth: usize,
    accumulated: String,
}

impl ExtractorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event. `title` is the page or section name echoed in headings.
    pub fn feed(&mut self, event: &MarkupEvent, title: &str) {
        match event {
            MarkupEvent::Open(tag, attrs) => self.open(tag, attrs),
            MarkupEvent::Close(tag) => self.close(tag),
            MarkupEvent::Text(content) => self.text(content, title),
        }
    }

    pub fn open(&mut self, tag: &str, attrs: &Attributes) {
        if classify::is_no_consume(tag) {
            self.suppress_depth += 1;
        } else if classify::is_heading(tag) {
            self.in_header = true;
        } else if tag == "span" {
            if self.span_exclude_depth > 0 || classify::is_edit_span(attrs) {
                self.span_exclude_depth += 1;
            }
        } else if tag == "div" {
            if self.div_exclude_depth > 0 || classify::is_excluded_div(attrs) {
                self.div_exclude_depth += 1;
            }
        } else if tag == "table" {
            if classify::is_message_box(attrs) {
                self.in_messagebox = true;
            }
        } else if tag == "ol" && classify::is_reference_list(attrs) {
            self.past_citations = true;
        }
    }

    pub fn close(&mut self, tag: &str) {
        if classify::is_no_consume(tag) && self.suppress_depth > 0 {
            self.suppress_depth -= 1;
        }
        if classify::is_heading(tag) {
            self.in_header = false;
        }
        if tag == "span" && self.span_exclude_depth > 0 {
            self.span_exclude_depth -= 1;
        }
        if tag == "div" && self.div_exclude_depth > 0 {
            self.div_exclude_depth -= 1;
        }
        if tag == "table" {
            self.in_messagebox = false;
        }
    }

    pub fn text(&mut self, content: &str, title: &str) {
        if self.is_suppressed() {
            return;
        }
        // The title echoed as a heading is boilerplate; elsewhere it is content.
        if self.in_header && content == title {
            return;
        }
        self.accumulated.push_str(content);
    }

    /// True while text would be dropped regardless of its content.
    pub fn is_suppressed(&self) -> bool {
        self.suppress_depth > 0
            || self.past_citations
            || self.in_messagebox
            || self.span_exclude_depth > 0
            || self.div_exclude_depth > 0
    }

    pub fn past_citations(&self) -> bool {
        self.past_citations
    }

    /// True when no region is open. The sticky citation flag is not a region.
    pub fn is_balanced(&self) -> bool {
        self.suppress_depth == 0
            && !self.in_header
            && !self.in_messagebox
            && self.span_exclude_depth == 0
            && self.div_exclude_depth == 0
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    pub fn finish(self) -> String {
        self.accumulated
    }
}

/// Run one extraction pass over `events` and return the raw accumulated text.
pub fn extract<'a, I>(events: I, title: &str) -> String
where
    I: IntoIterator<Item = &'a MarkupEvent>,
{
    let mut state = ExtractorState::new();
    for event in events {
        state.feed(event, title);
    }
    state.finish()
}

/// Tokenize `markup`, extract its content and collapse whitespace.
pub fn extract_html(markup: &str, title: &str) -> String {
    let events = tokenize(markup);
    collapse_whitespace(&extract(&events, title))
}
