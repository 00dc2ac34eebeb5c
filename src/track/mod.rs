//! Lifecycle tracking: the event stream → leaks, frees, warnings, timeline
//!
//! The tracker owns an insertion-ordered association from variable name to a
//! stack of active allocation records. Per variable the discipline is strict
//! LIFO: a free always pops the most recently pushed still-active record.
//! An entry exists iff its stack is non-empty; leak enumeration at
//! finalization is variable-first-seen, then oldest-allocated-first, which
//! keeps report ordering deterministic.
//!
//! A tracker is single-use: [`LifecycleTracker::finish`] consumes it, so a
//! fresh tracker must be constructed per analysis.

use rustc_hash::FxHashMap;

use crate::estimate;
use crate::extract::Event;
use crate::language::Language;
use crate::report::{
    AllocationSite, AnalysisReport, FreeRecord, Leak, TimelinePoint, Warning, WarningKind,
};

/// The program entry point; residual allocations made directly in it get the
/// generic remediation rather than the ownership-transfer one.
const ENTRY_FUNCTION: &str = "main";

/// Live state for one still-unfreed allocation. Owned exclusively by its
/// variable's stack; destroyed by being popped (free) or converted to a leak.
#[derive(Debug, Clone)]
pub struct AllocationRecord {
    pub var: String,
    pub line: usize,
    pub function: String,
    pub size: u64,
    pub in_loop: bool,
    pub enclosing_function: Option<String>,
    pub alloc_id: u64,
}

/// Memory-proxy recorder: one point per processed event. Allocations add
/// their estimated size, frees subtract the freed record's size, and leaked
/// records never subtract — unreclaimed memory stays counted.
#[derive(Debug, Default)]
pub struct TimelineRecorder {
    memory: u64,
    points: Vec<TimelinePoint>,
}

impl TimelineRecorder {
    fn on_allocated(&mut self, line: usize, size: u64) {
        self.memory += size;
        self.record(line);
    }

    fn on_freed(&mut self, line: usize, size: u64) {
        // Every free corresponds to a tracked record of this exact size, so
        // the proxy cannot go negative; saturate rather than panic anyway.
        self.memory = self.memory.saturating_sub(size);
        self.record(line);
    }

    fn on_unchanged(&mut self, line: usize) {
        self.record(line);
    }

    fn record(&mut self, line: usize) {
        self.points.push(TimelinePoint {
            line,
            memory: self.memory,
        });
    }
}

struct ActiveEntry {
    var: String,
    records: Vec<AllocationRecord>,
}

/// Consumes the event sequence in order and accumulates the report.
pub struct LifecycleTracker {
    language: Language,
    active: Vec<ActiveEntry>,
    index: FxHashMap<String, usize>,
    next_alloc_id: u64,
    timeline: TimelineRecorder,
    report: AnalysisReport,
}

impl LifecycleTracker {
    pub fn new(language: Language) -> Self {
        LifecycleTracker {
            language,
            active: Vec::new(),
            index: FxHashMap::default(),
            next_alloc_id: 0,
            timeline: TimelineRecorder::default(),
            report: AnalysisReport::default(),
        }
    }

    /// Process one event. Malformed events (empty variable name) are skipped
    /// with a logged note; they never abort the run.
    pub fn process(&mut self, event: Event) {
        match event {
            Event::Allocation {
                var,
                line,
                function,
                raw_args,
                enclosing_function,
                in_loop,
                line_text,
            } => {
                if var.is_empty() {
                    log::debug!("skipping allocation event at line {} with no variable", line);
                    return;
                }
                self.on_allocation(
                    var,
                    line,
                    function,
                    &raw_args,
                    enclosing_function,
                    in_loop,
                    line_text,
                );
            }
            Event::Deallocation {
                var,
                line,
                line_text,
                ..
            } => {
                if var.is_empty() {
                    log::debug!(
                        "skipping deallocation event at line {} with no variable",
                        line
                    );
                    return;
                }
                self.on_deallocation(&var, line, line_text);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn on_allocation(
        &mut self,
        var: String,
        line: usize,
        function: String,
        raw_args: &str,
        enclosing_function: Option<String>,
        in_loop: bool,
        line_text: String,
    ) {
        // A second allocation into the same variable proves the previous
        // pointer value was overwritten without a free.
        if let Some(&slot) = self.index.get(&var) {
            if let Some(previous) = self.active[slot].records.pop() {
                let fix = format!(
                    "'{}' was reassigned at line {} before the allocation from line {} was freed; free it before reassigning",
                    var, line, previous.line
                );
                self.leak(previous, fix);
            }
        }

        let size = estimate::estimate(&function, raw_args, self.language);
        let function_name = enclosing_function.clone().unwrap_or_default();
        self.next_alloc_id += 1;
        let record = AllocationRecord {
            var: var.clone(),
            line,
            function: function.clone(),
            size,
            in_loop,
            enclosing_function,
            alloc_id: self.next_alloc_id,
        };

        let slot = match self.index.get(&var) {
            Some(&slot) => slot,
            None => {
                self.active.push(ActiveEntry {
                    var: var.clone(),
                    records: Vec::new(),
                });
                let slot = self.active.len() - 1;
                self.index.insert(var.clone(), slot);
                slot
            }
        };
        self.active[slot].records.push(record);

        self.report.allocations.push(AllocationSite {
            var,
            line,
            function,
            size,
            line_text,
            in_loop,
            function_name,
            alloc_id: self.next_alloc_id,
            language: self.language.name().to_string(),
        });
        self.timeline.on_allocated(line, size);
    }

    fn on_deallocation(&mut self, var: &str, line: usize, line_text: String) {
        let Some(&slot) = self.index.get(var) else {
            self.report.warnings.push(Warning {
                kind: WarningKind::PotentialDoubleFree,
                line,
                message: format!("'{}' may not be allocated or already freed", var),
                line_text,
            });
            self.timeline.on_unchanged(line);
            return;
        };

        // Defensive: entries with empty stacks are removed immediately, so
        // this branch is unreachable by construction.
        let Some(record) = self.active[slot].records.pop() else {
            self.report.warnings.push(Warning {
                kind: WarningKind::DoubleFree,
                line,
                message: format!("'{}' was already freed", var),
                line_text,
            });
            self.timeline.on_unchanged(line);
            return;
        };

        self.report.frees.push(FreeRecord {
            var: var.to_string(),
            line,
            line_text,
            freed_alloc_id: record.alloc_id,
        });
        self.timeline.on_freed(line, record.size);

        if self.active[slot].records.is_empty() {
            self.active.remove(slot);
            self.reindex();
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (slot, entry) in self.active.iter().enumerate() {
            self.index.insert(entry.var.clone(), slot);
        }
    }

    fn leak(&mut self, record: AllocationRecord, fix: String) {
        self.report.leaks.push(Leak {
            var: record.var,
            line: record.line,
            function: record.function,
            size: record.size,
            in_loop: record.in_loop,
            fix,
        });
    }

    /// Convert every residual record to a leak and hand back the report.
    pub fn finish(mut self) -> AnalysisReport {
        let entries = std::mem::take(&mut self.active);
        for entry in entries {
            for record in entry.records {
                let fix = residual_fix(&record);
                self.leak(record, fix);
            }
        }
        self.report.timeline = std::mem::take(&mut self.timeline.points);
        self.report
    }
}

fn residual_fix(record: &AllocationRecord) -> String {
    if record.in_loop {
        format!(
            "'{}' is allocated in a loop at line {}; free it inside the loop, or collect the pointers and free them after the loop",
            record.var, record.line
        )
    } else if let Some(function) = record
        .enclosing_function
        .as_deref()
        .filter(|f| *f != ENTRY_FUNCTION)
    {
        format!(
            "'{}' is allocated in '{}' at line {}; transfer ownership to the caller or free it before '{}' returns",
            record.var, function, record.line, function
        )
    } else {
        format!("free '{}' before return or at cleanup", record.var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alloc(var: &str, line: usize, args: &str) -> Event {
        Event::Allocation {
            var: var.to_string(),
            line,
            function: "malloc".to_string(),
            raw_args: args.to_string(),
            enclosing_function: Some("main".to_string()),
            in_loop: false,
            line_text: format!("{} = malloc({});", var, args),
        }
    }

    fn dealloc(var: &str, line: usize) -> Event {
        Event::Deallocation {
            var: var.to_string(),
            line,
            line_text: format!("free({});", var),
            is_array_form: false,
        }
    }

    #[test]
    fn test_round_trip_no_leak() {
        let mut tracker = LifecycleTracker::new(Language::C);
        tracker.process(alloc("v", 5, "100"));
        tracker.process(dealloc("v", 6));
        let report = tracker.finish();

        assert!(report.leaks.is_empty());
        assert_eq!(report.frees.len(), 1);
        assert_eq!(
            report.frees[0].freed_alloc_id,
            report.allocations[0].alloc_id
        );
    }

    #[test]
    fn test_lifo_residual_count() {
        // N = 3 allocations, M = 2 frees on one variable, interleaved so no
        // reassignment leak fires: total leaks must equal N - M.
        let mut tracker = LifecycleTracker::new(Language::C);
        tracker.process(alloc("v", 1, "8"));
        tracker.process(dealloc("v", 2));
        tracker.process(alloc("v", 3, "8"));
        tracker.process(dealloc("v", 4));
        tracker.process(alloc("v", 5, "8"));
        let report = tracker.finish();

        assert_eq!(report.frees.len(), 2);
        assert_eq!(report.leaks.len(), 1);
        assert_eq!(report.leaks[0].line, 5);
    }

    #[test]
    fn test_reassignment_leaks_twice() {
        let mut tracker = LifecycleTracker::new(Language::C);
        tracker.process(alloc("v", 3, "10"));
        tracker.process(alloc("v", 7, "10"));
        let report = tracker.finish();

        assert_eq!(report.leaks.len(), 2);
        assert_eq!(report.leaks[0].line, 3);
        assert!(report.leaks[0].fix.contains("line 7"));
        assert_eq!(report.leaks[1].line, 7);
    }

    #[test]
    fn test_free_of_unknown_variable_warns() {
        let mut tracker = LifecycleTracker::new(Language::C);
        tracker.process(dealloc("w", 2));
        let report = tracker.finish();

        assert!(report.leaks.is_empty());
        assert!(report.frees.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::PotentialDoubleFree);
        // Warnings still produce a timeline point.
        assert_eq!(report.timeline.len(), 1);
        assert_eq!(report.timeline[0].memory, 0);
    }

    #[test]
    fn test_leak_order_is_first_seen_then_oldest() {
        let mut tracker = LifecycleTracker::new(Language::C);
        tracker.process(alloc("a", 1, "1"));
        tracker.process(alloc("b", 2, "2"));
        tracker.process(alloc("b", 3, "3"));
        let report = tracker.finish();

        // b's line-2 record leaked immediately on reassignment, then
        // finalization walks a (first seen) before b.
        let lines: Vec<usize> = report.leaks.iter().map(|l| l.line).collect();
        assert_eq!(lines, vec![2, 1, 3]);
    }

    #[test]
    fn test_timeline_leaks_do_not_subtract() {
        let mut tracker = LifecycleTracker::new(Language::C);
        tracker.process(alloc("v", 1, "10"));
        tracker.process(alloc("v", 2, "20"));
        tracker.process(dealloc("v", 3));
        let report = tracker.finish();

        let memory: Vec<u64> = report.timeline.iter().map(|p| p.memory).collect();
        // Line 2 leaks the first 10 bytes but the proxy keeps counting them.
        assert_eq!(memory, vec![10, 30, 10]);
    }

    #[test]
    fn test_entry_removed_when_empty() {
        let mut tracker = LifecycleTracker::new(Language::C);
        tracker.process(alloc("v", 1, "4"));
        tracker.process(dealloc("v", 2));
        tracker.process(dealloc("v", 3));
        let report = tracker.finish();

        // Second free sees no entry at all: PotentialDoubleFree, not
        // DoubleFree.
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::PotentialDoubleFree);
    }

    #[test]
    fn test_malformed_event_skipped() {
        let mut tracker = LifecycleTracker::new(Language::C);
        tracker.process(alloc("", 1, "4"));
        tracker.process(alloc("ok", 2, "4"));
        let report = tracker.finish();

        assert_eq!(report.allocations.len(), 1);
        assert_eq!(report.timeline.len(), 1);
    }

    #[test]
    fn test_loop_fix_text() {
        let mut tracker = LifecycleTracker::new(Language::C);
        tracker.process(Event::Allocation {
            var: "p".to_string(),
            line: 4,
            function: "malloc".to_string(),
            raw_args: "8".to_string(),
            enclosing_function: Some("worker".to_string()),
            in_loop: true,
            line_text: "p = malloc(8);".to_string(),
        });
        let report = tracker.finish();
        assert!(report.leaks[0].fix.contains("inside the loop"));
    }

    #[test]
    fn test_ownership_fix_text_names_function() {
        let mut tracker = LifecycleTracker::new(Language::C);
        tracker.process(Event::Allocation {
            var: "p".to_string(),
            line: 9,
            function: "malloc".to_string(),
            raw_args: "8".to_string(),
            enclosing_function: Some("make_buffer".to_string()),
            in_loop: false,
            line_text: "p = malloc(8);".to_string(),
        });
        let report = tracker.finish();
        assert!(report.leaks[0].fix.contains("make_buffer"));
    }
}
