//! Top-level analysis boundary
//!
//! [`analyze`] is total: invalid input is rejected before any state is
//! touched, and any fault escaping the inner recovery points is converted
//! into a normal-shaped report carrying a single AnalysisError warning. No
//! condition here may terminate the hosting process or leave the caller
//! without a report.

use std::panic::{self, AssertUnwindSafe};

use crate::extract::{self, Event};
use crate::language::Language;
use crate::normalize;
use crate::quality;
use crate::report::AnalysisReport;
use crate::track::LifecycleTracker;

/// Analyze one source unit. Never panics, never returns an error: blank
/// input and recovered faults both come back as an AnalysisError report.
pub fn analyze(source: &str, language: Language) -> AnalysisReport {
    if source.trim().is_empty() {
        return AnalysisReport::error_report("no source code provided");
    }

    // The inner stages are written not to panic; this boundary is the single
    // recovery point for anything that escapes them anyway.
    match panic::catch_unwind(AssertUnwindSafe(|| run_pipeline(source, language))) {
        Ok(report) => report,
        Err(payload) => {
            let detail = panic_message(&payload);
            log::error!("analysis fault recovered at boundary: {}", detail);
            AnalysisReport::error_report(format!("analysis failed: {}", detail))
        }
    }
}

fn run_pipeline(source: &str, language: Language) -> AnalysisReport {
    let normalized = normalize::strip_comments(source);
    let events = extract::extract_events(&normalized, language);

    let quality_warnings = collect_quality_warnings(&normalized, &events, language);

    let mut tracker = LifecycleTracker::new(language);
    for event in events {
        tracker.process(event);
    }
    let mut report = tracker.finish();
    report.warnings.extend(quality_warnings);
    report
}

fn collect_quality_warnings(
    normalized: &str,
    events: &[Event],
    language: Language,
) -> Vec<crate::report::Warning> {
    let mut warnings = quality::unsafe_functions(normalized);
    // NULL is a C-family concept; other languages would drown in noise.
    if language.is_c_family() {
        warnings.extend(quality::missing_null_checks(normalized, events));
    }
    warnings
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
