//! Stateless line-level quality scan
//!
//! Runs over the normalized text independently of the lifecycle tracker and
//! contributes warnings directly into the report. Two detectors: unbounded
//! string-copy calls used without their bounded counterpart on the same
//! line, and allocations whose variable is never null-tested anywhere in
//! the unit.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::extract::Event;
use crate::report::{Warning, WarningKind};

/// Unbounded call, bounded counterpart whose presence on the same line
/// suppresses the warning, and suggested replacement. `gets` has no bounded
/// form and always warns.
const UNSAFE_CALLS: &[(&str, Option<&str>, &str)] = &[
    ("strcpy", Some("strncpy"), "strncpy"),
    ("strcat", Some("strncat"), "strncat"),
    ("sprintf", Some("snprintf"), "snprintf"),
    ("gets", None, "fgets"),
];

static UNSAFE_PATTERNS: Lazy<Vec<(Regex, Option<&'static str>, &'static str, &'static str)>> =
    Lazy::new(|| {
        UNSAFE_CALLS
            .iter()
            .map(|&(name, bounded, replacement)| {
                let pattern =
                    Regex::new(&format!(r"\b{}\s*\(", name)).expect("unsafe call pattern");
                (pattern, bounded, name, replacement)
            })
            .collect()
    });

/// One UnsafeFunction warning per offending call per line.
pub fn unsafe_functions(normalized: &str) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for (idx, line) in normalized.lines().enumerate() {
        for (pattern, bounded, name, replacement) in UNSAFE_PATTERNS.iter() {
            if !pattern.is_match(line) {
                continue;
            }
            if let Some(bounded) = bounded {
                if line.contains(bounded) {
                    continue;
                }
            }
            warnings.push(Warning {
                kind: WarningKind::UnsafeFunction,
                line: idx + 1,
                message: format!(
                    "Unsafe function '{}' has no bounds checking; use '{}' instead",
                    name, replacement
                ),
                line_text: line.trim().to_string(),
            });
        }
    }
    warnings
}

/// MissingNullCheck: an allocation whose variable is never null-tested
/// anywhere in the normalized text. One warning per variable, reported at
/// its first unchecked allocation. Reads only the event list and the text,
/// never tracker state.
pub fn missing_null_checks(normalized: &str, events: &[Event]) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    for event in events {
        let Event::Allocation {
            var,
            line,
            line_text,
            ..
        } = event
        else {
            continue;
        };
        if var.is_empty() || !seen.insert(var.as_str()) {
            continue;
        }
        if has_null_check(normalized, var) {
            continue;
        }
        warnings.push(Warning {
            kind: WarningKind::MissingNullCheck,
            line: *line,
            message: format!(
                "Allocation assigned to '{}' is never checked against NULL",
                var
            ),
            line_text: line_text.clone(),
        });
    }
    warnings
}

fn has_null_check(normalized: &str, var: &str) -> bool {
    // Variable names are identifiers, so interpolation is regex-safe.
    let pattern = format!(
        r"\b{v}\s*[!=]=\s*(NULL|nullptr|null|None|0)\b|(NULL|nullptr|null|None)\s*[!=]=\s*{v}\b|!\s*{v}\b|if\s*\(\s*{v}\s*\)",
        v = var
    );
    Regex::new(&pattern)
        .map(|re| re.is_match(normalized))
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strcpy_warns() {
        let warnings = unsafe_functions("strcpy(dst, src);");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnsafeFunction);
        assert_eq!(warnings[0].line, 1);
    }

    #[test]
    fn test_bounded_counterpart_suppresses() {
        assert!(unsafe_functions("strncpy(dst, src, n);").is_empty());
        // Mixed line keeps the warning suppressed too: the bounded name is
        // present on the same line.
        assert!(unsafe_functions("strncpy(a, b, n); strcpy(c, d);").is_empty());
    }

    #[test]
    fn test_gets_always_warns() {
        let warnings = unsafe_functions("gets(buf);\nfgets(buf, n, stdin);");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 1);
    }

    #[test]
    fn test_null_check_detection() {
        let event = Event::Allocation {
            var: "p".to_string(),
            line: 1,
            function: "malloc".to_string(),
            raw_args: "8".to_string(),
            enclosing_function: None,
            in_loop: false,
            line_text: "p = malloc(8);".to_string(),
        };
        let checked = "p = malloc(8);\nif (p == NULL) return;";
        assert!(missing_null_checks(checked, std::slice::from_ref(&event)).is_empty());

        let unchecked = "p = malloc(8);\nuse(p);";
        let warnings = missing_null_checks(unchecked, std::slice::from_ref(&event));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::MissingNullCheck);
    }
}
