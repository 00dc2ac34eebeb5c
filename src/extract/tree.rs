//! Tree-walking extraction for JavaScript
//!
//! Walks a tree-sitter parse tree looking for variable declarators whose
//! initializer constructs an object, array, or `new` expression (emitted as
//! allocations, with an element/property-count hint in `raw_args`) and for
//! assignments of `null`/`undefined` (emitted as deallocations). Any failure
//! here is recoverable: the caller falls back to pattern extraction.

use tree_sitter::{Node, Parser};

use super::{Event, ExtractError};

pub fn extract(source: &str) -> Result<Vec<Event>, ExtractError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_javascript::language())
        .map_err(|err| ExtractError {
            message: format!("javascript grammar rejected: {}", err),
        })?;
    let tree = parser.parse(source, None).ok_or_else(|| ExtractError {
        message: "javascript parser produced no tree".to_string(),
    })?;

    let lines: Vec<&str> = source.lines().collect();
    let mut events = Vec::new();

    // Pre-order walk keeps events in source order.
    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "variable_declarator" => visit_declarator(&node, source, &lines, &mut events),
            "assignment_expression" => visit_assignment(&node, source, &lines, &mut events),
            _ => {}
        }
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }

    Ok(events)
}

fn visit_declarator(node: &Node, source: &str, lines: &[&str], events: &mut Vec<Event>) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let Some(value) = node.child_by_field_name("value") else {
        return;
    };
    let (function, raw_args) = match value.kind() {
        "object" => ("object", value.named_child_count().to_string()),
        "array" => ("array", value.named_child_count().to_string()),
        "new_expression" => {
            let args = value
                .child_by_field_name("arguments")
                .map(|a| {
                    node_text(&a, source)
                        .trim_start_matches('(')
                        .trim_end_matches(')')
                        .trim()
                        .to_string()
                })
                .unwrap_or_default();
            ("new", args)
        }
        _ => return,
    };
    let line = node.start_position().row + 1;
    events.push(Event::Allocation {
        var: node_text(&name, source).to_string(),
        line,
        function: function.to_string(),
        raw_args,
        enclosing_function: enclosing_function(node, source),
        in_loop: in_loop(node),
        line_text: line_text(lines, line),
    });
}

fn visit_assignment(node: &Node, source: &str, lines: &[&str], events: &mut Vec<Event>) {
    let Some(left) = node.child_by_field_name("left") else {
        return;
    };
    let Some(right) = node.child_by_field_name("right") else {
        return;
    };
    let right_text = node_text(&right, source);
    let is_release = matches!(right.kind(), "null" | "undefined")
        || right_text == "null"
        || right_text == "undefined";
    if !is_release {
        return;
    }
    let line = node.start_position().row + 1;
    events.push(Event::Deallocation {
        var: node_text(&left, source).to_string(),
        line,
        line_text: line_text(lines, line),
        is_array_form: false,
    });
}

fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or("")
}

fn line_text(lines: &[&str], line: usize) -> String {
    lines
        .get(line.saturating_sub(1))
        .map(|l| l.trim().to_string())
        .unwrap_or_default()
}

fn enclosing_function(node: &Node, source: &str) -> Option<String> {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        match ancestor.kind() {
            "function_declaration" | "generator_function_declaration" | "method_definition" => {
                return ancestor
                    .child_by_field_name("name")
                    .map(|name| node_text(&name, source).to_string());
            }
            "arrow_function" | "function_expression" | "function" => {
                // Anonymous unless bound through a declarator.
                if let Some(parent) = ancestor.parent() {
                    if parent.kind() == "variable_declarator" {
                        if let Some(name) = parent.child_by_field_name("name") {
                            return Some(node_text(&name, source).to_string());
                        }
                    }
                }
                return Some("anonymous".to_string());
            }
            _ => {}
        }
        current = ancestor.parent();
    }
    None
}

fn in_loop(node: &Node) -> bool {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if matches!(
            ancestor.kind(),
            "for_statement" | "for_in_statement" | "while_statement" | "do_statement"
        ) {
            return true;
        }
        current = ancestor.parent();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_and_object_hints() {
        let events = extract("let a = [1, 2, 3];\nlet o = { x: 1, y: 2 };").unwrap();
        assert_eq!(events.len(), 2);
        match &events[0] {
            Event::Allocation {
                function, raw_args, ..
            } => {
                assert_eq!(function, "array");
                assert_eq!(raw_args, "3");
            }
            other => panic!("Expected allocation, got {:?}", other),
        }
        match &events[1] {
            Event::Allocation {
                function, raw_args, ..
            } => {
                assert_eq!(function, "object");
                assert_eq!(raw_args, "2");
            }
            other => panic!("Expected allocation, got {:?}", other),
        }
    }

    #[test]
    fn test_null_assignment_is_deallocation() {
        let events = extract("let a = [1];\na = null;\na = undefined;").unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[1], Event::Deallocation { var, .. } if var == "a"));
        assert!(matches!(&events[2], Event::Deallocation { var, .. } if var == "a"));
    }

    #[test]
    fn test_function_and_loop_context() {
        let src = r#"
function build() {
    for (let i = 0; i < 3; i++) {
        let chunk = new Array(100);
    }
}
"#;
        let events = extract(src).unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::Allocation {
                var,
                enclosing_function,
                in_loop,
                raw_args,
                ..
            } => {
                assert_eq!(var, "chunk");
                assert_eq!(enclosing_function.as_deref(), Some("build"));
                assert!(in_loop);
                assert_eq!(raw_args, "100");
            }
            other => panic!("Expected allocation, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_literals_ignored() {
        let events = extract("let n = 42;\nlet s = 'hi';").unwrap();
        assert!(events.is_empty());
    }
}
