//! Containers registered with `#[flux::container]`
//!
//! Every container in this test binary is collected from the registry, so
//! the expectations below cover the whole set.

use fluxtest::prelude::*;
use fluxtest::{ExecutionConfig, HookStatus, ReportStyle, Reporter, run_unit};
use std::sync::Mutex;

static EVENTS: Mutex<Vec<String>> = Mutex::new(Vec::new());

fn event(entry: &str) {
    EVENTS.lock().unwrap().push(entry.to_string());
}

#[derive(Debug, thiserror::Error)]
#[error("ledger is unbalanced by {0}")]
struct Unbalanced(i64);

#[derive(Default)]
struct Ledger {
    entries: Vec<i64>,
}

#[flux::container(name = "macros::Ledger")]
impl Ledger {
    #[class_init]
    fn open_books() {
        event("open_books");
    }

    #[class_cleanup]
    fn close_books() {
        event("close_books");
    }

    #[test_init]
    fn seed(&mut self) {
        self.entries.push(100);
    }

    #[test_init]
    fn seed_twice(&mut self) {
        self.entries.push(100);
    }

    #[case]
    fn balanced(&mut self) -> Result<(), Unbalanced> {
        self.entries.push(-100);
        match self.entries.iter().sum::<i64>() {
            0 => Ok(()),
            n => Err(Unbalanced(n)),
        }
    }

    #[case(name = "unbalanced")]
    fn leaves_remainder(&mut self) -> Result<(), Unbalanced> {
        self.entries.push(-40);
        match self.entries.iter().sum::<i64>() {
            0 => Ok(()),
            n => Err(Unbalanced(n)),
        }
    }

    #[case]
    #[ignore]
    fn audit(&mut self) {
        event("audit");
    }

    fn helper_is_not_registered(&self) -> usize {
        self.entries.len()
    }
}

struct Connection {
    url: String,
}

impl Connection {
    fn connect() -> Result<Self, std::io::Error> {
        Ok(Self {
            url: "memory://".to_string(),
        })
    }
}

#[flux::container(name = "macros::Connection", new = "Self::connect")]
impl Connection {
    #[case]
    fn has_url(&mut self) {
        assert_eq!(self.url, "memory://");
    }

    #[case]
    async fn async_ping(&mut self) -> Result<(), std::io::Error> {
        tokio::task::yield_now().await;
        event("async_ping");
        Ok(())
    }
}

#[derive(Default)]
struct Skipped;

#[flux::container(ignore)]
impl Skipped {
    #[case]
    fn never_runs(&mut self) {
        event("never_runs");
    }
}

#[test]
fn test_registered_containers_run() {
    let unit = Unit::from_registry();
    assert_eq!(unit.len(), 3);

    let style = ReportStyle {
        show_durations: false,
        ..ReportStyle::default()
    };
    let mut reporter = Reporter::with_style(Vec::new(), style);
    let outcome = run_unit(unit, &ExecutionConfig::default(), &mut reporter).unwrap();
    let text = String::from_utf8(reporter.into_inner()).unwrap();

    let names: Vec<_> = outcome
        .containers
        .iter()
        .map(|c| c.summary.container.as_str())
        .collect();
    assert_eq!(
        names,
        ["macro_containers::Skipped", "macros::Connection", "macros::Ledger"]
    );

    let skipped = &outcome.containers[0];
    assert_eq!(skipped.summary.ignored, 1);
    assert!(skipped.succeeded());

    let connection = &outcome.containers[1];
    assert_eq!(connection.summary.passed, 2);
    assert!(connection.succeeded());

    // only the first test_init candidate is used, so one seed of 100
    let ledger = &outcome.containers[2];
    let cases: Vec<_> = ledger
        .cases
        .iter()
        .map(|c| (c.name.as_str(), c.status))
        .collect();
    assert_eq!(
        cases,
        [
            ("audit", Status::Ignored),
            ("balanced", Status::Passed),
            ("unbalanced", Status::Failed),
        ]
    );
    assert_eq!(ledger.summary.class_init, HookStatus::Succeeded);
    assert_eq!(ledger.summary.class_cleanup, HookStatus::Succeeded);
    assert!(!outcome.succeeded());

    assert!(text.contains("  Message: ledger is unbalanced by 60\n"));
    assert!(text.contains("  Kind: macro_containers::Unbalanced\n"));

    let events = EVENTS.lock().unwrap().clone();
    assert_eq!(events, ["async_ping", "open_books", "close_books"]);
    assert_eq!(Ledger::default().helper_is_not_registered(), 0);
}
