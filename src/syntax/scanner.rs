//! Comment pre-scan run before the grammar sees the source.
//!
//! Comments are blanked out (byte offsets are preserved so diagnostics still
//! point at the right place). In lint mode a `//` comment that starts a line
//! is kept verbatim and later parses as a preprocessor-comment statement.
//! Preprocessor directive lines are never touched.

use std::borrow::Cow;

/// Options consumed by the scanner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Keep line comments that start a line as statements.
    pub lint: bool,
}

impl ScanOptions {
    pub fn lint() -> Self {
        ScanOptions { lint: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Str,
    Char,
    LineComment { keep: bool },
    BlockComment,
    Directive,
}

/// Returns the source with comments blanked according to `options`.
pub fn scan(source: &str, options: ScanOptions) -> Cow<'_, str> {
    if !source.contains("//") && !source.contains("/*") {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut line_start = true;
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            State::Code => match ch {
                '/' if chars.peek() == Some(&'/') => {
                    let keep = options.lint && line_start;
                    chars.next();
                    if keep {
                        out.push_str("//");
                    } else {
                        out.push_str("  ");
                    }
                    state = State::LineComment { keep };
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                // `#(` at line start is a complex literal, not a directive
                '#' if line_start && chars.peek().map_or(false, |c| c.is_ascii_alphabetic()) => {
                    out.push(ch);
                    state = State::Directive;
                }
                '"' => {
                    out.push(ch);
                    state = State::Str;
                }
                '\'' => {
                    out.push(ch);
                    state = State::Char;
                }
                _ => out.push(ch),
            },
            State::Str | State::Char => {
                out.push(ch);
                let close = if state == State::Str { '"' } else { '\'' };
                if ch == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if ch == close || ch == '\n' {
                    state = State::Code;
                }
            }
            State::LineComment { keep } => {
                if ch == '\n' {
                    out.push(ch);
                    state = State::Code;
                } else if keep {
                    out.push(ch);
                } else {
                    blank(&mut out, ch);
                }
            }
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else if ch == '\n' {
                    out.push(ch);
                } else {
                    blank(&mut out, ch);
                }
            }
            State::Directive => {
                out.push(ch);
                if ch == '\n' {
                    state = State::Code;
                }
            }
        }

        line_start = match ch {
            '\n' => true,
            ' ' | '\t' | '\r' => line_start,
            _ => false,
        };
    }

    Cow::Owned(out)
}

/// Replaces one character with spaces of the same byte length.
fn blank(out: &mut String, ch: char) {
    for _ in 0..ch.len_utf8() {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_comments_borrows() {
        let source = "1 => int a;";
        assert!(matches!(scan(source, ScanOptions::default()), Cow::Borrowed(_)));
    }

    #[test]
    fn test_line_comment_blanked_preserving_offsets() {
        let source = "a; // note\nb;";
        let scanned = scan(source, ScanOptions::default());
        assert_eq!(scanned.len(), source.len());
        assert_eq!(scanned, "a;        \nb;");
    }

    #[test]
    fn test_lint_keeps_leading_comment() {
        let source = "  // keep me\na; // drop me";
        let scanned = scan(source, ScanOptions::lint());
        assert_eq!(scanned, "  // keep me\na;           ");
    }

    #[test]
    fn test_comment_markers_inside_strings_survive() {
        let source = "\"http://x\" => s; /* gone */";
        let scanned = scan(source, ScanOptions::default());
        assert!(scanned.starts_with("\"http://x\" => s;"));
        assert!(!scanned.contains("gone"));
    }

    #[test]
    fn test_directive_lines_untouched() {
        let source = "#include \"a//b\"\n// c\n";
        let scanned = scan(source, ScanOptions::default());
        assert!(scanned.starts_with("#include \"a//b\"\n"));
        assert!(!scanned.contains("// c"));
    }

    #[test]
    fn test_complex_literal_is_not_a_directive() {
        let source = "#(1, 2) => complex c; // gone";
        let scanned = scan(source, ScanOptions::default());
        assert!(scanned.starts_with("#(1, 2) => complex c;"));
        assert!(!scanned.contains("gone"));
    }

    #[test]
    fn test_block_comment_keeps_newlines() {
        let source = "/* a\nb */x;";
        let scanned = scan(source, ScanOptions::default());
        assert_eq!(scanned.lines().count(), 2);
        assert!(scanned.ends_with("x;"));
    }
}
