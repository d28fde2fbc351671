//! Configuration loading from fluxtest.toml
//!
//! FluxTest configuration can be specified in a `fluxtest.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use crate::executor::ExecutionConfig;
use anyhow::Context;
use fluxtest_report::ReportStyle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`FluxTestConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "fluxtest.toml";

/// FluxTest configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FluxTestConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration for test execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunnerConfig {
    /// Regex over `container::case` ids; only matching cases run
    #[serde(default)]
    pub filter: Option<String>,
    /// Record backtraces for panics in test code
    #[serde(default = "default_true")]
    pub capture_backtraces: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            filter: None,
            capture_backtraces: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Rule character for container headings
    #[serde(default = "default_heading_rule")]
    pub heading_rule: char,
    /// Rule character for test case subheadings
    #[serde(default = "default_subheading_rule")]
    pub subheading_rule: char,
    /// Print elapsed time for every step
    #[serde(default = "default_true")]
    pub show_durations: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            heading_rule: default_heading_rule(),
            subheading_rule: default_subheading_rule(),
            show_durations: true,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_heading_rule() -> char {
    '='
}
fn default_subheading_rule() -> char {
    '-'
}

impl FluxTestConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(dir)
    }

    /// Walk up from `start` looking for [`CONFIG_FILE_NAME`]
    ///
    /// The nearest file wins. A file that fails to parse is logged and
    /// treated as absent.
    pub fn discover_from(start: impl Into<PathBuf>) -> Option<Self> {
        let mut dir = start.into();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!(path = %config_path.display(), "loaded configuration");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), "ignoring configuration: {e:#}");
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Execution settings derived from `[runner]`
    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            capture_backtraces: self.runner.capture_backtraces,
        }
    }

    /// Reporter style derived from `[output]`
    pub fn report_style(&self) -> ReportStyle {
        ReportStyle {
            heading_rule: self.output.heading_rule,
            subheading_rule: self.output.subheading_rule,
            show_durations: self.output.show_durations,
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# FluxTest Configuration
# https://github.com/ml-rust/fluxtest

[runner]
# Only run test cases whose "container::case" id matches (uncomment to enable)
# filter = "^math::"
# Record backtraces for panics raised by test code
capture_backtraces = true

[output]
# Rule character for container headings
heading_rule = "="
# Rule character for test case subheadings
subheading_rule = "-"
# Print elapsed time for every hook and test step
show_durations = true
"#
        .to_string()
    }
}
