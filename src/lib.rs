//! # Introduction
//!
//! heaplens scans source text for heap allocation and deallocation
//! constructs and reports leaks, double-free suspicions, and an approximate
//! memory timeline, without executing the code. It is a simulation built on
//! structural pattern recognition, not a compiler front end: no type
//! resolution, no symbolic execution, and byte sizes are heuristics.
//!
//! ## Analysis pipeline
//!
//! ```text
//! (source, language) → normalize → extract → track (+ estimate) → AnalysisReport
//! ```
//!
//! 1. [`normalize`] — strips comments while preserving line numbers.
//! 2. [`extract`] — turns normalized text into ordered allocation and
//!    deallocation events; tree-sitter walking for JavaScript, a
//!    line/statement pattern scanner for the C family and as the universal
//!    fallback.
//! 3. [`track`] — per-variable LIFO lifecycle tracking: frees, reassignment
//!    leaks, residual leaks, and the memory-proxy timeline, with sizes from
//!    [`estimate`].
//! 4. [`quality`] — an independent line-level scan for unsafe calls and
//!    missing NULL checks; contributes warnings without touching tracker
//!    state.
//! 5. [`report`] — the aggregate [`report::AnalysisReport`] consumed by
//!    rendering and export collaborators.
//!
//! The single public entry point is [`analyze`]; it is total and returns a
//! report for every input, including invalid ones.

pub mod analyzer;
pub mod estimate;
pub mod extract;
pub mod language;
pub mod normalize;
pub mod quality;
pub mod report;
pub mod track;

pub use analyzer::analyze;
pub use language::Language;
pub use report::AnalysisReport;
