//! Structural extraction: source text → ordered allocation/deallocation events
//!
//! Two strategies exist. Languages with a tree-sitter grammar wired in
//! (currently JavaScript) get a tree-walking extractor first; any parse
//! failure logs and falls through to the line/statement pattern extractor,
//! which is also the primary strategy for the C family and the universal
//! fallback for everything else. Extraction is total: a fault at any depth
//! degrades to an empty event sequence, never an error to the caller.

mod patterns;
mod tree;

use std::fmt;

use crate::language::Language;

/// A structurally recognized heap construct, in source order.
///
/// Events are produced once and consumed by the lifecycle tracker; they are
/// not retained by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Allocation {
        var: String,
        line: usize,
        /// `malloc` | `calloc` | `realloc` | `new` | `new[]`, or
        /// `object` | `array` for tree-extracted languages.
        function: String,
        /// Raw argument text (or an element/property-count hint for
        /// tree-extracted languages), fed to the size estimator.
        raw_args: String,
        enclosing_function: Option<String>,
        in_loop: bool,
        line_text: String,
    },
    Deallocation {
        var: String,
        line: usize,
        line_text: String,
        is_array_form: bool,
    },
}

impl Event {
    pub fn line(&self) -> usize {
        match self {
            Event::Allocation { line, .. } | Event::Deallocation { line, .. } => *line,
        }
    }
}

/// Extraction-stage failure. Recovered inside [`extract_events`] by falling
/// back to the pattern strategy; never visible to callers.
#[derive(Debug)]
pub struct ExtractError {
    pub message: String,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "extraction failed: {}", self.message)
    }
}

impl std::error::Error for ExtractError {}

/// Produce the ordered event sequence for normalized source text.
pub fn extract_events(source: &str, language: Language) -> Vec<Event> {
    if language == Language::JavaScript {
        match tree::extract(source) {
            Ok(events) => return events,
            Err(err) => {
                log::warn!("{}; falling back to pattern extraction", err);
            }
        }
    }
    patterns::extract(source)
}
