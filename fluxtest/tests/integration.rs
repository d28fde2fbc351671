//! Integration tests for FluxTest
//!
//! These tests verify the end-to-end behavior of the engine: discovery,
//! lifecycle orchestration, failure isolation and report output.

use fluxtest::{
    CapturedError, ContainerBuilder, ExecutionConfig, HookStatus, ReportStyle, Reporter,
    RunOutcome, Status, Unit, discover, run_containers, run_unit,
};
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

#[derive(Debug, thiserror::Error)]
#[error("failed to load fixture")]
struct LoadError {
    #[source]
    source: std::io::Error,
}

struct Fixture {
    log: Log,
}

fn record(log: &Log, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

fn fixture(name: &str, log: &Log) -> ContainerBuilder<Fixture> {
    let log = log.clone();
    ContainerBuilder::new(name, move || {
        record(&log, "new");
        Ok::<_, CapturedError>(Fixture { log: log.clone() })
    })
}

fn run(unit: Unit) -> (RunOutcome, String) {
    let style = ReportStyle {
        show_durations: false,
        ..ReportStyle::default()
    };
    let mut reporter = Reporter::with_style(Vec::new(), style);
    let config = ExecutionConfig {
        capture_backtraces: false,
    };
    let outcome = run_unit(unit, &config, &mut reporter).unwrap();
    let text = String::from_utf8(reporter.into_inner()).unwrap();
    (outcome, text)
}

/// A unit with zero containers succeeds and prints no container summary
#[test]
fn test_empty_unit() {
    let (outcome, text) = run(Unit::new());

    assert!(outcome.succeeded());
    assert_eq!(outcome.summary.containers, 0);
    assert!(!text.contains("Summary:"));
    assert!(text.contains("Result: Succeeded"));
}

/// Scenario A: one passing test case, no hooks
#[test]
fn test_single_passing_case() {
    let log = Log::default();
    let unit = Unit::new().with(fixture("A", &log).case("passes", |_: &mut Fixture| ()).build());

    let (outcome, text) = run(unit);
    let summary = &outcome.containers[0].summary;

    assert_eq!(summary.total, 1);
    assert_eq!(summary.ran, 1);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.ignored, 0);
    assert_eq!(summary.class_init, HookStatus::NotPresent);
    assert_eq!(summary.class_cleanup, HookStatus::NotPresent);
    assert!(outcome.succeeded());
    assert!(text.contains("  Class init:    Not present\n"));
}

/// Scenario B: failing class-init ignores the cases, class-cleanup still runs
#[test]
fn test_failing_class_init() {
    let log = Log::default();
    let cleanup_log = log.clone();
    let unit = Unit::new().with(
        fixture("B", &log)
            .class_init("boot", || {
                Err::<(), _>(CapturedError::new("env::Missing", "DATABASE_URL not set"))
            })
            .class_cleanup("shutdown", move || record(&cleanup_log, "class-cleanup"))
            .case("would_pass", |f: &mut Fixture| record(&f.log, "body"))
            .build(),
    );

    let (outcome, text) = run(unit);
    let container = &outcome.containers[0];

    assert_eq!(container.cases[0].status, Status::Ignored);
    assert_eq!(container.summary.ignored, 1);
    assert_eq!(container.summary.failed, 0);
    assert_eq!(container.summary.class_init, HookStatus::Failed);
    assert_eq!(container.summary.class_cleanup, HookStatus::Succeeded);
    assert!(!outcome.succeeded());
    assert_eq!(*log.borrow(), ["class-cleanup"]);
    assert!(text.contains("  Message: DATABASE_URL not set\n  Kind: env::Missing\n"));
}

/// Scenario C: cases run in ascending name order regardless of registration order
#[test]
fn test_case_order() {
    let log = Log::default();
    let unit = Unit::new().with(
        fixture("C", &log)
            .case("B_Test", |f: &mut Fixture| record(&f.log, "B_Test"))
            .case("A_Test", |f: &mut Fixture| record(&f.log, "A_Test"))
            .build(),
    );

    let (outcome, text) = run(unit);

    assert_eq!(*log.borrow(), ["new", "A_Test", "new", "B_Test"]);
    let names: Vec<_> = outcome.containers[0]
        .cases
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, ["A_Test", "B_Test"]);
    let a = text.find("Test: A_Test").unwrap();
    let b = text.find("Test: B_Test").unwrap();
    assert!(a < b);
}

/// Scenario D: the cause block sits two spaces deeper than its error
#[test]
fn test_cause_chain_output() {
    let log = Log::default();
    let unit = Unit::new().with(
        fixture("D", &log)
            .case("loads", |_: &mut Fixture| {
                Err::<(), _>(LoadError {
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "fixture.json missing"),
                })
            })
            .build(),
    );

    let (outcome, text) = run(unit);

    assert!(!outcome.succeeded());
    let expected = "\
Test body: Failed
  Message: failed to load fixture
  Kind: integration::LoadError
  Cause:
    Message: fixture.json missing
    Kind: dyn Error
";
    assert!(text.contains(expected), "unexpected report:\n{text}");
}

#[test]
fn test_containers_run_sorted_by_name() {
    let log = Log::default();
    let unit = Unit::new()
        .with(fixture("zeta", &log).case("z", |f: &mut Fixture| record(&f.log, "zeta")).build())
        .with(fixture("alpha", &log).case("a", |f: &mut Fixture| record(&f.log, "alpha")).build());

    let (outcome, _) = run(unit);

    let names: Vec<_> = outcome
        .containers
        .iter()
        .map(|c| c.summary.container.as_str())
        .collect();
    assert_eq!(names, ["alpha", "zeta"]);
    assert_eq!(*log.borrow(), ["new", "alpha", "new", "zeta"]);
}

#[test]
fn test_ignored_case_is_never_instantiated() {
    let log = Log::default();
    let unit = Unit::new().with(
        fixture("ignored_case", &log)
            .test_init("init", |f: &mut Fixture| record(&f.log, "test-init"))
            .test_cleanup("cleanup", |f: &mut Fixture| record(&f.log, "test-cleanup"))
            .ignored_case("skipped", |f: &mut Fixture| record(&f.log, "body"))
            .build(),
    );

    let (outcome, _) = run(unit);

    assert!(log.borrow().is_empty());
    let summary = &outcome.containers[0].summary;
    assert_eq!((summary.total, summary.ran, summary.ignored), (1, 0, 1));
    assert!(outcome.succeeded());
}

#[test]
fn test_ignored_container_runs_class_hooks_only() {
    let log = Log::default();
    let init_log = log.clone();
    let cleanup_log = log.clone();
    let unit = Unit::new().with(
        fixture("ignored_container", &log)
            .ignore(true)
            .class_init("boot", move || record(&init_log, "class-init"))
            .class_cleanup("shutdown", move || record(&cleanup_log, "class-cleanup"))
            .test_init("init", |f: &mut Fixture| record(&f.log, "test-init"))
            .case("one", |f: &mut Fixture| record(&f.log, "one"))
            .case("two", |f: &mut Fixture| record(&f.log, "two"))
            .build(),
    );

    let (outcome, text) = run(unit);
    let summary = &outcome.containers[0].summary;

    assert_eq!(*log.borrow(), ["class-init", "class-cleanup"]);
    assert_eq!(summary.ignored, 2);
    assert_eq!(summary.class_init, HookStatus::Succeeded);
    assert_eq!(summary.class_cleanup, HookStatus::Succeeded);
    assert!(text.contains("Class init (boot): Passed"));
    assert!(text.contains("Class cleanup (shutdown): Passed"));
}

#[test]
fn test_init_failure_skips_body_and_cleanup() {
    let log = Log::default();
    let unit = Unit::new().with(
        fixture("init_fails", &log)
            .test_init("init", |f: &mut Fixture| {
                record(&f.log, "test-init");
                Err::<(), _>(CapturedError::new("setup", "socket busy"))
            })
            .test_cleanup("cleanup", |f: &mut Fixture| record(&f.log, "test-cleanup"))
            .case("body", |f: &mut Fixture| record(&f.log, "body"))
            .build(),
    );

    let (outcome, _) = run(unit);

    assert_eq!(*log.borrow(), ["new", "test-init"]);
    assert_eq!(outcome.containers[0].cases[0].status, Status::Failed);
}

#[test]
fn test_body_panic_skips_cleanup_and_is_isolated() {
    let log = Log::default();
    let unit = Unit::new().with(
        fixture("body_panics", &log)
            .test_cleanup("cleanup", |f: &mut Fixture| record(&f.log, "test-cleanup"))
            .case("a_panics", |f: &mut Fixture| {
                record(&f.log, "a_panics");
                let values: Vec<u32> = Vec::new();
                record(&f.log, values[3].to_string());
            })
            .case("b_passes", |f: &mut Fixture| record(&f.log, "b_passes"))
            .build(),
    );

    let (outcome, text) = run(unit);
    let container = &outcome.containers[0];

    assert_eq!(
        *log.borrow(),
        ["new", "a_panics", "new", "b_passes", "test-cleanup"]
    );
    assert_eq!(container.cases[0].status, Status::Failed);
    assert_eq!(container.cases[1].status, Status::Passed);
    assert!(text.contains("Kind: panic"));
    assert!(text.contains("index out of bounds"));
}

#[test]
fn test_rerun_yields_same_verdict() {
    let log = Log::default();
    let unit = Unit::new().with(
        fixture("rerun", &log)
            .case("ok", |_: &mut Fixture| ())
            .case("bad", |_: &mut Fixture| {
                Err::<(), _>(CapturedError::new("check", "mismatch"))
            })
            .ignored_case("later", |_: &mut Fixture| ())
            .build(),
    );
    let containers = discover(unit).unwrap();
    let config = ExecutionConfig::default();

    let mut first_sink = Reporter::new(Vec::new());
    let mut second_sink = Reporter::new(Vec::new());
    let first = run_containers(&containers, &config, &mut first_sink).unwrap();
    let second = run_containers(&containers, &config, &mut second_sink).unwrap();

    assert_eq!(first.containers[0].summary, second.containers[0].summary);
    assert_eq!(first.succeeded(), second.succeeded());
    assert!(!first.succeeded());
}

#[test]
fn test_first_hook_candidate_wins() {
    let log = Log::default();
    let unit = Unit::new().with(
        fixture("hooks", &log)
            .test_init("first", |f: &mut Fixture| record(&f.log, "first"))
            .test_init("second", |f: &mut Fixture| record(&f.log, "second"))
            .case("body", |_: &mut Fixture| ())
            .build(),
    );

    let (_, text) = run(unit);

    assert_eq!(*log.borrow(), ["new", "first"]);
    assert!(text.contains("Test init (first): Passed"));
}

struct Leaky;

impl Drop for Leaky {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            panic!("resource not released");
        }
    }
}

#[test]
fn test_panicking_drop_is_isolated() {
    let log = Log::default();
    let unit = Unit::new()
        .with(
            ContainerBuilder::new("a::Leaky", || Ok::<_, CapturedError>(Leaky))
                .case("holds", |_: &mut Leaky| ())
                .build(),
        )
        .with(fixture("b::Fine", &log).case("runs", |f: &mut Fixture| record(&f.log, "runs")).build());

    let (outcome, text) = run(unit);

    assert_eq!(*log.borrow(), ["new", "runs"]);
    assert_eq!(outcome.containers.len(), 2);
    assert_eq!(outcome.containers[0].cases[0].status, Status::Failed);
    assert!(outcome.containers[1].succeeded());
    assert!(text.contains("Instance disposal: Failed\n  Message: resource not released\n"));
    assert!(text.contains("Summary: a::Leaky\n"));
    assert!(text.contains("Summary: b::Fine\n"));
}
