//! CI Suite: filtering, configuration and exit codes
//!
//! A service test suite as it would run in a CI pipeline. Containers are
//! grouped by name prefix so a pipeline stage can select them with the
//! positional filter; `fluxtest.toml` (searched upward from the working
//! directory) supplies defaults the command line can override.
//!
//! Run with:
//!   cargo run --example ci_suite -p fluxtest-demos                      # everything
//!   cargo run --example ci_suite -p fluxtest-demos -- '^unit::'         # fast stage only
//!   cargo run --example ci_suite -p fluxtest-demos -- --no-durations list
//!
//! Example `fluxtest.toml`:
//! ```toml
//! [runner]
//! filter = "^unit::"
//! capture_backtraces = false
//!
//! [output]
//! show_durations = false
//! ```
//!
//! Exit status: 0 when every container succeeds, 1 when any fails, 2 when
//! the run cannot start (bad filter, discovery fault).

use fluxtest::prelude::*;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// unit:: fast, no external state
// ---------------------------------------------------------------------------

fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Default)]
struct Slugs;

#[flux::container(name = "unit::Slugs")]
impl Slugs {
    #[case]
    fn lowercases(&mut self) {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[case]
    fn collapses_separators(&mut self) {
        assert_eq!(slugify("  a -- b__c "), "a-b-c");
    }

    #[case]
    fn empty_title(&mut self) {
        assert_eq!(slugify("!!!"), "");
    }
}

// ---------------------------------------------------------------------------
// integration:: fallible constructor, one seeded store per case
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
enum StoreError {
    #[error("key {0:?} not found")]
    Missing(String),
}

struct Store {
    rows: BTreeMap<String, String>,
}

impl Store {
    fn seeded() -> Result<Self, StoreError> {
        let rows = [("alpha", "1"), ("beta", "2")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(Self { rows })
    }

    fn get(&self, key: &str) -> Result<&str, StoreError> {
        self.rows
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| StoreError::Missing(key.to_string()))
    }
}

#[flux::container(name = "integration::Store", new = "Self::seeded")]
impl Store {
    #[test_cleanup]
    fn forget(&mut self) {
        self.rows.clear();
    }

    #[case]
    fn reads_seed(&mut self) -> Result<(), StoreError> {
        assert_eq!(self.get("alpha")?, "1");
        Ok(())
    }

    #[case]
    fn overwrites(&mut self) -> Result<(), StoreError> {
        self.rows.insert("beta".to_string(), "20".to_string());
        assert_eq!(self.get("beta")?, "20");
        Ok(())
    }

    #[case]
    fn reports_missing_key(&mut self) -> Result<(), StoreError> {
        // fails on purpose to show a CI failure
        self.get("gamma")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// e2e:: disabled until the staging environment exists
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Checkout;

#[flux::container(name = "e2e::Checkout", ignore)]
impl Checkout {
    #[case]
    fn pays_with_card(&mut self) {}
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
