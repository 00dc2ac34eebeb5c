// End-to-end tests for the tree-walking JavaScript strategy

use pretty_assertions::assert_eq;

use heaplens::{analyze, Language};

#[test]
fn test_array_release_round_trip() {
    let source = "let cache = [1, 2, 3, 4];\ncache = null;";
    let report = analyze(source, Language::JavaScript);

    assert_eq!(report.allocations.len(), 1);
    assert_eq!(report.allocations[0].function, "array");
    // Four elements times the managed-language word size.
    assert_eq!(report.allocations[0].size, 32);
    assert_eq!(report.frees.len(), 1);
    assert!(report.leaks.is_empty());
}

#[test]
fn test_object_never_released_leaks() {
    let source = r#"
function retain() {
    let state = { a: 1, b: 2 };
    return state;
}
"#;
    let report = analyze(source, Language::JavaScript);

    assert_eq!(report.leaks.len(), 1);
    assert_eq!(report.leaks[0].var, "state");
    assert!(report.leaks[0].fix.contains("retain"));
}

#[test]
fn test_new_in_loop() {
    let source = r#"
function spin() {
    while (true) {
        let buf = new ArrayBuffer(1024);
    }
}
"#;
    let report = analyze(source, Language::JavaScript);

    assert_eq!(report.allocations.len(), 1);
    assert!(report.allocations[0].in_loop);
    assert_eq!(report.allocations[0].size, 1024 * 8);
    assert!(report.leaks[0].fix.contains("loop"));
}

#[test]
fn test_reassignment_without_release() {
    let source = "var buf = [1, 2];\nvar buf = [3, 4, 5];";
    let report = analyze(source, Language::JavaScript);

    // The line-1 array leaks immediately on reassignment; the line-2 array
    // leaks at finalization.
    assert_eq!(report.leaks.len(), 2);
    assert_eq!(report.leaks[0].line, 1);
    assert_eq!(report.leaks[1].line, 2);
}

#[test]
fn test_language_tag_reported() {
    let report = analyze("let a = [1];", Language::JavaScript);
    assert_eq!(report.allocations[0].language, "javascript");
    assert_eq!(report.timeline.len(), 1);
}
