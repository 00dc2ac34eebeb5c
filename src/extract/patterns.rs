//! Line/statement pattern extraction
//!
//! The universal strategy: scans logical statements with regex patterns
//! while tracking brace depth, the enclosing function, and loop nesting.
//! A logical statement is one or more physical lines buffered until a
//! terminator (`;`, `{`, `}`) is seen; a trailing `\` always continues the
//! statement. The reported line number is the statement's first physical
//! line.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Event;

static TYPED_ALLOC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[A-Za-z_]\w*(?:\s+[A-Za-z_]\w*)*\s*\*+\s*(?P<var>[A-Za-z_]\w*)\s*=\s*(?P<func>malloc|calloc|realloc)\s*\((?P<args>.*)\)",
    )
    .expect("typed allocation pattern")
});

static CAST_ALLOC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<var>[A-Za-z_]\w*)\s*=\s*\(\s*[A-Za-z_]\w*(?:\s+[A-Za-z_]\w*)*\s*\*+\s*\)\s*(?P<func>malloc|calloc|realloc)\s*\((?P<args>.*)\)",
    )
    .expect("cast allocation pattern")
});

static BARE_ALLOC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<var>[A-Za-z_]\w*)\s*=\s*(?P<func>malloc|calloc|realloc)\s*\((?P<args>.*)\)",
    )
    .expect("bare allocation pattern")
});

static NEW_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<var>[A-Za-z_]\w*)\s*=\s*(?:\(\s*[A-Za-z_][\w\s:<>,]*\*+\s*\)\s*)?new\s+[A-Za-z_][\w:<>,]*\s*\[(?P<args>[^\]]*)\]",
    )
    .expect("new[] pattern")
});

static NEW_SCALAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<var>[A-Za-z_]\w*)\s*=\s*(?:\(\s*[A-Za-z_][\w\s:<>,]*\*+\s*\)\s*)?new\s+[A-Za-z_][\w:<>,]*(?:\s*\((?P<args>[^)]*)\))?",
    )
    .expect("new pattern")
});

static FREE_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfree\s*\(\s*(?P<var>[A-Za-z_]\w*)\s*\)").expect("free pattern"));

static DELETE_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bdelete\s*\[\s*\]\s*\(?\s*(?P<var>[A-Za-z_]\w*)\s*\)?")
        .expect("delete[] pattern")
});

static DELETE_SCALAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bdelete\b\s*\(?\s*(?P<var>[A-Za-z_]\w*)\s*\)?").expect("delete pattern")
});

static LOOP_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(for|while|do)\b").expect("loop header pattern"));

static CALL_SITE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?P<name>[A-Za-z_]\w*)\s*\(").expect("call site pattern"));

/// Control-flow keywords that look like calls but never name a function.
const RESERVED: &[&str] = &["if", "while", "for", "switch", "return", "sizeof"];

/// Extract events from normalized source. Total: never fails.
pub fn extract(source: &str) -> Vec<Event> {
    let mut scanner = Scanner::default();
    let mut events = Vec::new();
    let mut buf = String::new();
    let mut start_line = 0;

    for (idx, raw_line) in source.lines().enumerate() {
        let trimmed = raw_line.trim();
        if buf.is_empty() {
            if trimmed.is_empty() {
                continue;
            }
            start_line = idx + 1;
        } else if !trimmed.is_empty() {
            buf.push(' ');
        }
        if let Some(stripped) = trimmed.strip_suffix('\\') {
            buf.push_str(stripped.trim_end());
            continue;
        }
        buf.push_str(trimmed);
        if terminates_statement(trimmed) {
            scanner.process_statement(&buf, start_line, &mut events);
            buf.clear();
        }
    }
    if !buf.is_empty() {
        scanner.process_statement(&buf, start_line, &mut events);
    }

    events
}

fn terminates_statement(line: &str) -> bool {
    line.ends_with(';') || line.ends_with('{') || line.ends_with('}')
}

/// What an opening brace at the end of a statement introduces.
enum PendingScope {
    Loop,
    Function(String),
}

/// Brace-depth scanner tracking the enclosing function and loop nesting.
#[derive(Default)]
struct Scanner {
    depth: i32,
    /// Current function name and the depth just before its opening brace.
    function: Option<(String, i32)>,
    /// Depth just before each open loop's brace.
    loops: Vec<i32>,
}

impl Scanner {
    fn process_statement(&mut self, stmt: &str, line: usize, events: &mut Vec<Event>) {
        // Allocation before deallocation for a single statement.
        if let Some((var, function, raw_args)) = match_allocation(stmt) {
            events.push(Event::Allocation {
                var,
                line,
                function,
                raw_args,
                enclosing_function: self.function.as_ref().map(|(name, _)| name.clone()),
                in_loop: !self.loops.is_empty(),
                line_text: stmt.to_string(),
            });
        }
        if let Some((var, is_array_form)) = match_deallocation(stmt) {
            events.push(Event::Deallocation {
                var,
                line,
                line_text: stmt.to_string(),
                is_array_form,
            });
        }
        self.track_scopes(stmt);
    }

    fn track_scopes(&mut self, stmt: &str) {
        let mut pending = self.classify_header(stmt);
        for ch in stmt.chars() {
            match ch {
                '{' => {
                    match pending.take() {
                        Some(PendingScope::Loop) => self.loops.push(self.depth),
                        Some(PendingScope::Function(name)) => {
                            if self.function.is_none() {
                                self.function = Some((name, self.depth));
                            }
                        }
                        None => {}
                    }
                    self.depth += 1;
                }
                '}' => {
                    self.depth -= 1;
                    while matches!(self.loops.last(), Some(&opened) if opened >= self.depth) {
                        self.loops.pop();
                    }
                    if matches!(&self.function, Some((_, opened)) if *opened >= self.depth) {
                        self.function = None;
                    }
                }
                _ => {}
            }
        }
    }

    /// Decide whether a brace-opening statement is a loop header, a function
    /// definition, or neither (if/switch/bare block).
    fn classify_header(&self, stmt: &str) -> Option<PendingScope> {
        if !stmt.contains('{') {
            return None;
        }
        if LOOP_HEADER.is_match(stmt) {
            return Some(PendingScope::Loop);
        }
        for caps in CALL_SITE.captures_iter(stmt) {
            let name = &caps["name"];
            if !RESERVED.contains(&name) {
                return Some(PendingScope::Function(name.to_string()));
            }
        }
        None
    }
}

/// First allocation pattern that matches, in declaration priority:
/// typed pointer declaration, cast form, bare assignment, `new[]`, `new`.
fn match_allocation(stmt: &str) -> Option<(String, String, String)> {
    for pattern in [&TYPED_ALLOC, &CAST_ALLOC, &BARE_ALLOC] {
        if let Some(caps) = pattern.captures(stmt) {
            return Some((
                caps["var"].to_string(),
                caps["func"].to_string(),
                caps["args"].trim().to_string(),
            ));
        }
    }
    if let Some(caps) = NEW_ARRAY.captures(stmt) {
        return Some((
            caps["var"].to_string(),
            "new[]".to_string(),
            caps["args"].trim().to_string(),
        ));
    }
    if let Some(caps) = NEW_SCALAR.captures(stmt) {
        let args = caps
            .name("args")
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        return Some((caps["var"].to_string(), "new".to_string(), args));
    }
    None
}

/// Deallocation patterns in priority: `free(v)`, `delete[] v`, `delete v`.
fn match_deallocation(stmt: &str) -> Option<(String, bool)> {
    if let Some(caps) = FREE_CALL.captures(stmt) {
        return Some((caps["var"].to_string(), false));
    }
    if let Some(caps) = DELETE_ARRAY.captures(stmt) {
        return Some((caps["var"].to_string(), true));
    }
    if let Some(caps) = DELETE_SCALAR.captures(stmt) {
        return Some((caps["var"].to_string(), false));
    }
    None
}
