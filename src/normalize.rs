//! Source normalization: comment stripping before pattern matching
//!
//! Comments are blanked rather than deleted so that every byte keeps its
//! original line: downstream stages report line numbers against the
//! normalized text and they must match the text the user pasted.

/// Remove `//` line comments and `/* ... */` block comments.
///
/// Comment characters are replaced with spaces; newlines inside block
/// comments are preserved. String literal awareness is deliberately shallow
/// (double- and single-quoted spans are skipped) since this feeds a
/// heuristic matcher, not a compiler. Never fails.
pub fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    #[derive(PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        DoubleQuote,
        SingleQuote,
    }
    let mut state = State::Code;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Code => match (b, next) {
                (b'/', Some(b'/')) => {
                    state = State::LineComment;
                    out.extend_from_slice(b"  ");
                    i += 2;
                }
                (b'/', Some(b'*')) => {
                    state = State::BlockComment;
                    out.extend_from_slice(b"  ");
                    i += 2;
                }
                (b'"', _) => {
                    state = State::DoubleQuote;
                    out.push(b);
                    i += 1;
                }
                (b'\'', _) => {
                    state = State::SingleQuote;
                    out.push(b);
                    i += 1;
                }
                _ => {
                    out.push(b);
                    i += 1;
                }
            },
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                    out.push(b);
                } else {
                    out.push(b' ');
                }
                i += 1;
            }
            State::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    state = State::Code;
                    out.extend_from_slice(b"  ");
                    i += 2;
                } else {
                    out.push(if b == b'\n' { b'\n' } else { b' ' });
                    i += 1;
                }
            }
            State::DoubleQuote => {
                if b == b'\\' && next.is_some() {
                    out.push(b);
                    out.push(next.unwrap_or(b' '));
                    i += 2;
                } else {
                    if b == b'"' || b == b'\n' {
                        state = State::Code;
                    }
                    out.push(b);
                    i += 1;
                }
            }
            State::SingleQuote => {
                if b == b'\\' && next.is_some() {
                    out.push(b);
                    out.push(next.unwrap_or(b' '));
                    i += 2;
                } else {
                    if b == b'\'' || b == b'\n' {
                        state = State::Code;
                    }
                    out.push(b);
                    i += 1;
                }
            }
        }
    }

    // Blanking is byte-for-byte over ASCII comment spans, so the output is
    // valid UTF-8 whenever the input was. Fall back to the original text
    // rather than fail the pipeline.
    String::from_utf8(out).unwrap_or_else(|_| source.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_comment_blanked() {
        let out = strip_comments("int x; // trailing\nint y;");
        assert_eq!(out.lines().count(), 2);
        assert!(!out.contains("trailing"));
        assert!(out.contains("int y;"));
    }

    #[test]
    fn test_block_comment_preserves_lines() {
        let src = "a /* one\ntwo\nthree */ b";
        let out = strip_comments(src);
        assert_eq!(out.lines().count(), 3);
        assert!(out.starts_with("a "));
        assert!(out.ends_with(" b"));
        assert!(!out.contains("two"));
    }

    #[test]
    fn test_comment_markers_in_strings_kept() {
        let src = "char *s = \"// not a comment\";";
        assert_eq!(strip_comments(src), src);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let out = strip_comments("x /* never closed\ny");
        assert_eq!(out.lines().count(), 2);
        assert!(!out.contains("closed"));
    }
}
