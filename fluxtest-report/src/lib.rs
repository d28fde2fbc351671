#![warn(missing_docs)]
//! FluxTest Report - Diagnostics and Human-readable Output
//!
//! - Diagnostics: indented rendering of captured errors and their cause chains
//! - Reporter: headings, step outcomes and summary tables on any `io::Write` sink
//! - Summaries: per-container and per-run aggregates

mod diagnostics;
mod reporter;
mod summary;

pub use diagnostics::{INDENT_STEP, format_diagnostics, normalize_stack_trace, write_diagnostics};
pub use reporter::{ReportStyle, Reporter, format_duration};
pub use summary::{ClassSummary, HookStatus, RunSummary};
