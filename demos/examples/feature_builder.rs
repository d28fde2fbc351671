//! Explicit Registration: containers without macros
//!
//! `ContainerBuilder` registers a container from plain closures, and
//! `run_unit` runs a hand-built `Unit` against any `io::Write` sink with an
//! explicit style. Nothing here touches the global registry.
//!
//! Run with: cargo run --example feature_builder -p fluxtest-demos

use fluxtest::{
    CapturedError, ContainerBuilder, ExecutionConfig, ReportStyle, Reporter, Unit, run_unit,
};
use std::collections::VecDeque;

struct Queue {
    items: VecDeque<u32>,
    capacity: usize,
}

impl Queue {
    fn with_capacity(capacity: usize) -> Result<Self, CapturedError> {
        if capacity == 0 {
            return Err(CapturedError::new("queue::Config", "capacity must be positive"));
        }
        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    fn push(&mut self, value: u32) -> Result<(), CapturedError> {
        if self.items.len() == self.capacity {
            return Err(CapturedError::new("queue::Full", "queue is full")
                .with_data("capacity", self.capacity)
                .with_data("rejected", value));
        }
        self.items.push_back(value);
        Ok(())
    }
}

fn queue_container() -> ContainerBuilder<Queue> {
    ContainerBuilder::new("builder::Queue", || Queue::with_capacity(2))
        .test_init("prefill", |q: &mut Queue| q.push(1))
        .case("fifo_order", |q: &mut Queue| -> Result<(), CapturedError> {
            q.push(2)?;
            assert_eq!(q.items.pop_front(), Some(1));
            assert_eq!(q.items.pop_front(), Some(2));
            Ok(())
        })
        .case("overflow_is_reported", |q: &mut Queue| -> Result<(), CapturedError> {
            q.push(2)?;
            q.push(3)
        })
}

fn broken_container() -> ContainerBuilder<Queue> {
    // the factory fails: every case reports an invocation fault
    ContainerBuilder::new("builder::ZeroCapacity", || Queue::with_capacity(0))
        .case("never_built", |_: &mut Queue| ())
}

fn main() {
    let unit = Unit::new()
        .with(queue_container().build())
        .with(broken_container().build());

    let style = ReportStyle {
        heading_rule: '#',
        subheading_rule: '~',
        show_durations: false,
    };
    let stdout = std::io::stdout();
    let mut reporter = Reporter::with_style(stdout.lock(), style);

    match run_unit(unit, &ExecutionConfig::default(), &mut reporter) {
        Ok(outcome) if outcome.succeeded() => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
