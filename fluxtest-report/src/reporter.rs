//! Human-readable Reporter
//!
//! Writes headings, step outcomes, diagnostics and summaries to a
//! line-oriented sink in program order.

use crate::diagnostics::{INDENT_STEP, write_diagnostics};
use crate::summary::{ClassSummary, RunSummary};
use fluxtest_core::ExecutionResult;
use std::io::{self, Write};
use std::time::Duration;

/// Presentation options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStyle {
    /// Rule character under and over headings
    pub heading_rule: char,
    /// Rule character under and over subheadings
    pub subheading_rule: char,
    /// Print elapsed time next to each step
    pub show_durations: bool,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            heading_rule: '=',
            subheading_rule: '-',
            show_durations: true,
        }
    }
}

/// Formats run output onto a text sink
pub struct Reporter<W: Write> {
    out: W,
    style: ReportStyle,
}

impl<W: Write> Reporter<W> {
    /// Reporter with the default style
    pub fn new(out: W) -> Self {
        Self::with_style(out, ReportStyle::default())
    }

    /// Reporter with an explicit style
    pub fn with_style(out: W, style: ReportStyle) -> Self {
        Self { out, style }
    }

    /// Presentation options in use
    pub fn style(&self) -> &ReportStyle {
        &self.style
    }

    /// Blank line, rule, `lines`, rule; the rule spans the longest line
    pub fn heading(&mut self, lines: &[&str]) -> io::Result<()> {
        let rule = self.style.heading_rule;
        self.ruled(rule, lines)
    }

    /// Like [`Reporter::heading`] with the subheading rule character
    pub fn subheading(&mut self, lines: &[&str]) -> io::Result<()> {
        let rule = self.style.subheading_rule;
        self.ruled(rule, lines)
    }

    fn ruled(&mut self, rule: char, lines: &[&str]) -> io::Result<()> {
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let rule: String = std::iter::repeat_n(rule, width).collect();

        writeln!(self.out)?;
        writeln!(self.out, "{rule}")?;
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out, "{rule}")
    }

    /// A plain line of text
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    /// Outcome of one hook or test step, followed by its diagnostics
    pub fn step(&mut self, label: &str, result: &ExecutionResult) -> io::Result<()> {
        if self.style.show_durations {
            writeln!(
                self.out,
                "{label}: {} ({})",
                result.status,
                format_duration(result.elapsed)
            )?;
        } else {
            writeln!(self.out, "{label}: {}", result.status)?;
        }

        if let Some(error) = &result.error {
            write_diagnostics(&mut self.out, error, INDENT_STEP)?;
        }
        Ok(())
    }

    /// Per-container summary table
    pub fn class_summary(&mut self, summary: &ClassSummary) -> io::Result<()> {
        let outcome = if summary.succeeded() { "Succeeded" } else { "Failed" };
        let title = format!("Summary: {}", summary.container);
        self.subheading(&[title.as_str()])?;
        writeln!(self.out, "  Class init:    {}", summary.class_init)?;
        writeln!(self.out, "  Class cleanup: {}", summary.class_cleanup)?;
        writeln!(self.out, "  Total:   {}", summary.total)?;
        writeln!(self.out, "  Ran:     {}", summary.ran)?;
        writeln!(self.out, "  Ignored: {}", summary.ignored)?;
        writeln!(self.out, "  Passed:  {}", summary.passed)?;
        writeln!(self.out, "  Failed:  {}", summary.failed)?;
        writeln!(self.out, "  Result:  {outcome}")
    }

    /// Totals across the run
    pub fn run_summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        let outcome = if summary.succeeded() { "Succeeded" } else { "Failed" };
        self.heading(&["Run summary"])?;
        writeln!(
            self.out,
            "  Containers: {}  Failed containers: {}",
            summary.containers, summary.failed_containers
        )?;
        writeln!(
            self.out,
            "  Total: {}  Ran: {}  Ignored: {}  Passed: {}  Failed: {}",
            summary.total, summary.ran, summary.ignored, summary.passed, summary.failed
        )?;
        if self.style.show_durations {
            writeln!(self.out, "  Duration: {}", format_duration(summary.elapsed))?;
        }
        writeln!(self.out, "  Result: {outcome}")
    }

    /// Flush the sink
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Recover the sink
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Human-friendly duration: ns, µs, ms or s depending on magnitude
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos < 1_000 {
        format!("{nanos} ns")
    } else if nanos < 1_000_000 {
        format!("{:.2} µs", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.2} ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2} s", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::HookStatus;
    use fluxtest_core::CapturedError;

    fn output(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_heading_rule_spans_longest_line() {
        let mut reporter = Reporter::new(Vec::new());
        reporter.heading(&["short", "much longer"]).unwrap();
        assert_eq!(
            output(reporter),
            "\n===========\nshort\nmuch longer\n===========\n"
        );
    }

    #[test]
    fn test_subheading_uses_its_own_rule() {
        let mut reporter = Reporter::new(Vec::new());
        reporter.subheading(&["abc"]).unwrap();
        assert_eq!(output(reporter), "\n---\nabc\n---\n");
    }

    #[test]
    fn test_custom_rules_and_unicode_width() {
        let style = ReportStyle {
            heading_rule: '#',
            ..ReportStyle::default()
        };
        let mut reporter = Reporter::with_style(Vec::new(), style);
        reporter.heading(&["µµµ"]).unwrap();
        assert_eq!(output(reporter), "\n###\nµµµ\n###\n");
    }

    #[test]
    fn test_step_with_error() {
        let style = ReportStyle {
            show_durations: false,
            ..ReportStyle::default()
        };
        let mut reporter = Reporter::with_style(Vec::new(), style);
        let result = ExecutionResult::failed(Duration::ZERO, CapturedError::new("k", "bad"));
        reporter.step("Test body", &result).unwrap();
        assert_eq!(
            output(reporter),
            "Test body: Failed\n  Message: bad\n  Kind: k\n"
        );
    }

    #[test]
    fn test_step_with_duration() {
        let mut reporter = Reporter::new(Vec::new());
        let result = ExecutionResult::passed(Duration::from_micros(1500));
        reporter.step("Test init", &result).unwrap();
        assert_eq!(output(reporter), "Test init: Passed (1.50 ms)\n");
    }

    #[test]
    fn test_class_summary() {
        let mut summary = ClassSummary::new("suite::Math");
        summary.class_init = HookStatus::Succeeded;
        summary.record(fluxtest_core::Status::Passed);

        let mut reporter = Reporter::new(Vec::new());
        reporter.class_summary(&summary).unwrap();
        let text = output(reporter);

        assert!(text.contains("Summary: suite::Math\n"));
        assert!(text.contains("  Class init:    Succeeded\n"));
        assert!(text.contains("  Class cleanup: Not present\n"));
        assert!(text.contains("  Total:   1\n"));
        assert!(text.contains("  Failed:  0\n"));
        assert!(text.contains("  Result:  Succeeded\n"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_nanos(12)), "12 ns");
        assert_eq!(format_duration(Duration::from_nanos(2_500)), "2.50 µs");
        assert_eq!(format_duration(Duration::from_millis(3)), "3.00 ms");
        assert_eq!(format_duration(Duration::from_millis(1_250)), "1.25 s");
    }
}
