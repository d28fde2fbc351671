//! Failure Isolation & Diagnostics
//!
//! A failing hook or test case is captured where it is invoked and reported
//! with its full diagnostics; sibling test cases and containers keep running.
//!
//! Run with: cargo run --example feature_failures -p fluxtest-demos
//!
//! Expected output:
//!   - `failures::Parsing`: one pass, one `Result` error with a cause chain,
//!     one panic with its stack trace, one error carrying metadata
//!   - `failures::Session`: test_init fails, body and test_cleanup are skipped
//!   - `failures::Cluster`: class_init fails, every case is Ignored and the
//!     container fails; class_cleanup still runs
//!   - Suite exits with status 1

use fluxtest::prelude::*;

#[derive(Debug, thiserror::Error)]
enum ConfigError {
    #[error("could not read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn read_config(path: &str) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Test case failures
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Parsing;

#[flux::container(name = "failures::Parsing")]
impl Parsing {
    #[case]
    fn parses_integers(&mut self) -> Result<(), std::num::ParseIntError> {
        assert_eq!("42".parse::<i32>()?, 42);
        Ok(())
    }

    /// The io::Error becomes a nested cause block
    #[case]
    fn reads_missing_config(&mut self) -> Result<(), ConfigError> {
        read_config("/definitely/not/here.toml")?;
        Ok(())
    }

    /// Panics are captured with the location they were raised at
    #[case]
    fn panics_on_empty_input(&mut self) {
        let tokens: Vec<&str> = "".split_whitespace().collect();
        assert!(!tokens.is_empty(), "tokenizer produced no tokens");
    }

    /// Explicit kind, metadata, component and help link
    #[case]
    fn rejects_bad_header(&mut self) -> TestResult {
        let header = "FLUX/0.9";
        Err(CapturedError::new("parse::UnsupportedVersion", "header version too old")
            .with_data("header", header)
            .with_data("minimum", "FLUX/1.0")
            .with_component("parser")
            .with_help_link("https://github.com/ml-rust/fluxtest#versions")
            .with_cause(CapturedError::new("parse::Version", "0.9 < 1.0")))
    }
}

// ---------------------------------------------------------------------------
// Per-test hook failure
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Session {
    token: Option<String>,
}

#[flux::container(name = "failures::Session")]
impl Session {
    #[test_init]
    fn login(&mut self) -> TestResult {
        Err(CapturedError::new("auth::Denied", "credentials expired").with_data("user", "ci-bot"))
    }

    #[test_cleanup]
    fn logout(&mut self) {
        unreachable!("test_cleanup is skipped when test_init fails");
    }

    #[case]
    fn fetches_profile(&mut self) {
        assert!(self.token.is_some());
    }
}

// ---------------------------------------------------------------------------
// Class hook failure
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Cluster;

#[flux::container(name = "failures::Cluster")]
impl Cluster {
    #[class_init]
    fn start_nodes() -> TestResult {
        Err(CapturedError::new("cluster::Quorum", "only 1 of 3 nodes started"))
    }

    #[class_cleanup]
    fn stop_nodes() {
        println!("    [class_cleanup] nodes stopped");
    }

    #[case]
    fn elects_leader(&mut self) {}

    #[case]
    fn replicates_writes(&mut self) {}
}

fn main() {
    match fluxtest::run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    }
}
