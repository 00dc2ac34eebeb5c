//! Report records produced by one analysis run
//!
//! Field names (camelCase on the wire) are the public contract consumed by
//! rendering and export collaborators; every sequence is append-only and
//! insertion-ordered.

use serde::Serialize;

/// One recognized allocation site.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSite {
    pub var: String,
    pub line: usize,
    /// Allocation function or operator: `malloc`, `calloc`, `realloc`,
    /// `new`, `new[]`, or `object`/`array` for tree-extracted languages.
    pub function: String,
    pub size: u64,
    pub line_text: String,
    pub in_loop: bool,
    /// Enclosing function name, or empty when allocated at top level.
    pub function_name: String,
    pub alloc_id: u64,
    pub language: String,
}

/// One recognized deallocation matched against a live allocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeRecord {
    pub var: String,
    pub line: usize,
    pub line_text: String,
    pub freed_alloc_id: u64,
}

/// An allocation provably never balanced by a matching free.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leak {
    pub var: String,
    pub line: usize,
    pub function: String,
    pub size: u64,
    pub in_loop: bool,
    pub fix: String,
}

/// Non-fatal findings: suspicious frees, unsafe calls, recovered faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    /// Free of a variable with no tracked allocation: either never
    /// allocated or already freed.
    PotentialDoubleFree,
    /// Free of a tracked variable whose active list is already empty.
    /// Unreachable by construction (empty lists are removed immediately);
    /// kept for compatibility with the report contract.
    DoubleFree,
    UnsafeFunction,
    MissingNullCheck,
    /// A fault recovered at the analysis boundary.
    AnalysisError,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub line: usize,
    pub message: String,
    pub line_text: String,
}

/// Cumulative memory-proxy snapshot after one processed event.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TimelinePoint {
    pub line: usize,
    pub memory: u64,
}

/// The aggregate, immutable result of one analysis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub allocations: Vec<AllocationSite>,
    pub frees: Vec<FreeRecord>,
    pub leaks: Vec<Leak>,
    pub warnings: Vec<Warning>,
    pub timeline: Vec<TimelinePoint>,
}

impl AnalysisReport {
    /// Report shape returned for invalid input or a recovered fault:
    /// one AnalysisError warning, everything else empty.
    pub fn error_report(message: impl Into<String>) -> Self {
        AnalysisReport {
            warnings: vec![Warning {
                kind: WarningKind::AnalysisError,
                line: 0,
                message: message.into(),
                line_text: String::new(),
            }],
            ..Default::default()
        }
    }
}
