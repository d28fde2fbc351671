//! Diagnostics Formatting
//!
//! Renders a [`CapturedError`] as indented text:
//!
//! ```text
//! Message: could not open session
//! Kind: app::SessionError
//! Data:
//!   attempt: 3
//! Component: storage
//! Help link: https://example.com/session
//! Stack trace:
//!   at app::open
//!     in ./src/app.rs:10:5
//! Cause:
//!   Message: connection refused
//!   Kind: dyn Error
//! ```
//!
//! Each cause is nested two spaces deeper than the error containing it.

use fluxtest_core::CapturedError;
use std::io::{self, Write};

/// Indentation added per nesting level
pub const INDENT_STEP: usize = 2;

/// Location separator inside a stack frame
const FRAME_LOCATION_SEPARATOR: &str = " in ";

/// Format `error` and its cause chain, starting at `indent` spaces
pub fn format_diagnostics(error: &CapturedError, indent: usize) -> String {
    let mut lines = Vec::new();
    push_error(&mut lines, error, indent);

    let mut output = String::new();
    for line in lines {
        output.push_str(&line);
        output.push('\n');
    }
    output
}

/// Write the diagnostics for `error` to `out`
pub fn write_diagnostics(
    out: &mut dyn Write,
    error: &CapturedError,
    indent: usize,
) -> io::Result<()> {
    out.write_all(format_diagnostics(error, indent).as_bytes())
}

fn push_error(lines: &mut Vec<String>, error: &CapturedError, indent: usize) {
    let pad = " ".repeat(indent);
    let inner = " ".repeat(indent + INDENT_STEP);

    let mut message = error.message().lines();
    lines.push(format!("{pad}Message: {}", message.next().unwrap_or_default()));
    for continuation in message {
        lines.push(format!("{inner}{continuation}"));
    }

    lines.push(format!("{pad}Kind: {}", error.kind()));

    if !error.data().is_empty() {
        lines.push(format!("{pad}Data:"));
        for (key, value) in error.data() {
            lines.push(format!("{inner}{key}: {value}"));
        }
    }

    if let Some(component) = error.component() {
        lines.push(format!("{pad}Component: {component}"));
    }

    if let Some(link) = error.help_link() {
        lines.push(format!("{pad}Help link: {link}"));
    }

    if let Some(trace) = error.stack_trace() {
        let frames = normalize_stack_trace(trace);
        if !frames.is_empty() {
            lines.push(format!("{pad}Stack trace:"));
            for frame in frames {
                lines.push(format!("{inner}{frame}"));
            }
        }
    }

    if let Some(cause) = error.cause() {
        lines.push(format!("{pad}Cause:"));
        push_error(lines, cause, indent + INDENT_STEP);
    }
}

/// Normalize a raw stack trace into display lines
///
/// Line endings are unified to `\n` and one trailing empty line is dropped.
/// A frame containing `" in "` becomes an `at ...` line followed by an
/// indented `in ...` line; any other frame is kept as a single line.
pub fn normalize_stack_trace(raw: &str) -> Vec<String> {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let body = unified.strip_suffix('\n').unwrap_or(&unified);
    if body.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for frame in body.split('\n') {
        let frame = frame.trim();
        match frame.split_once(FRAME_LOCATION_SEPARATOR) {
            Some((call, location)) => {
                let call = call.strip_prefix("at ").unwrap_or(call);
                lines.push(format!("at {call}"));
                lines.push(format!("{}in {location}", " ".repeat(INDENT_STEP)));
            }
            None => lines.push(frame.to_string()),
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_error() {
        let err = CapturedError::new("app::Oops", "it broke");
        assert_eq!(
            format_diagnostics(&err, 0),
            "Message: it broke\nKind: app::Oops\n"
        );
    }

    #[test]
    fn test_full_error_layout() {
        let err = CapturedError::new("io", "disk full")
            .with_data("path", "/var/x")
            .with_data("attempt", 2)
            .with_component("storage")
            .with_help_link("https://example.com/disk")
            .with_stack_trace("at app::write in src/app.rs:4\r\napp::main\r\n");

        let expected = "\
Message: disk full
Kind: io
Data:
  attempt: 2
  path: /var/x
Component: storage
Help link: https://example.com/disk
Stack trace:
  at app::write
    in src/app.rs:4
  app::main
";
        assert_eq!(format_diagnostics(&err, 0), expected);
    }

    #[test]
    fn test_cause_chain_indentation() {
        let inner = CapturedError::new("inner", "level 2");
        let middle = CapturedError::new("middle", "level 1").with_cause(inner);
        let err = CapturedError::new("outer", "level 0").with_cause(middle);

        let text = format_diagnostics(&err, 0);
        let expected = "\
Message: level 0
Kind: outer
Cause:
  Message: level 1
  Kind: middle
  Cause:
    Message: level 2
    Kind: inner
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_depth_n_yields_n_plus_one_levels() {
        let depth = 4;
        let mut err = CapturedError::new("k", "m");
        for _ in 0..depth {
            err = CapturedError::new("k", "m").with_cause(err);
        }

        let text = format_diagnostics(&err, 0);
        let indents: std::collections::BTreeSet<usize> = text
            .lines()
            .filter(|l| l.trim_start().starts_with("Message:"))
            .map(|l| l.len() - l.trim_start().len())
            .collect();
        let expected: std::collections::BTreeSet<usize> =
            (0..=depth).map(|level| level * INDENT_STEP).collect();
        assert_eq!(indents, expected);
    }

    #[test]
    fn test_base_indent_applies_to_every_line() {
        let err = CapturedError::new("k", "m").with_cause(CapturedError::new("c", "n"));
        for line in format_diagnostics(&err, 4).lines() {
            assert!(line.starts_with("    "), "line not indented: {line:?}");
        }
    }

    #[test]
    fn test_multiline_message() {
        let err = CapturedError::new("k", "first\nsecond");
        assert_eq!(
            format_diagnostics(&err, 0),
            "Message: first\n  second\nKind: k\n"
        );
    }

    #[test]
    fn test_normalize_line_endings_and_trailing_line() {
        assert_eq!(normalize_stack_trace("a\rb\r\nc\n"), vec!["a", "b", "c"]);
        assert_eq!(normalize_stack_trace("a\n\n"), vec!["a", ""]);
        assert!(normalize_stack_trace("").is_empty());
        assert!(normalize_stack_trace("\n").is_empty());
    }

    #[test]
    fn test_normalize_splits_location() {
        assert_eq!(
            normalize_stack_trace("   at Foo.Bar() in C:\\src\\x.cs:line 12"),
            vec!["at Foo.Bar()", "  in C:\\src\\x.cs:line 12"]
        );
        assert_eq!(
            normalize_stack_trace("panic in src/lib.rs:3:9"),
            vec!["at panic", "  in src/lib.rs:3:9"]
        );
    }

    #[test]
    fn test_write_diagnostics_to_sink() {
        let mut sink = Vec::new();
        write_diagnostics(&mut sink, &CapturedError::new("k", "m"), 2).unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), "  Message: m\n  Kind: k\n");
    }
}
