//! Lifecycle Hooks: class and test scoped setup/teardown
//!
//! Every container may declare one hook per role. Class hooks run once around
//! the whole container; test hooks run around each test case, against the
//! fresh instance built for that case.
//!
//! Run with: cargo run --example feature_lifecycle -p fluxtest-demos
//!
//! Expected order for `lifecycle::Inventory`:
//!   class_init, (new, test_init, case, test_cleanup) per case, class_cleanup

use fluxtest::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

static INSTANCES: AtomicUsize = AtomicUsize::new(0);

// ---------------------------------------------------------------------------
// Full lifecycle: every hook role filled
// ---------------------------------------------------------------------------

struct Inventory {
    id: usize,
    stock: HashMap<&'static str, u32>,
}

impl Default for Inventory {
    fn default() -> Self {
        let id = INSTANCES.fetch_add(1, Ordering::SeqCst);
        println!("    [new] instance #{id}");
        Self {
            id,
            stock: HashMap::new(),
        }
    }
}

#[flux::container(name = "lifecycle::Inventory")]
impl Inventory {
    /// Runs once, before any test case
    #[class_init]
    fn open_warehouse() {
        println!("    [class_init] warehouse open");
    }

    /// Runs once, after every test case, even when they fail
    #[class_cleanup]
    fn close_warehouse() {
        println!("    [class_cleanup] {} instances built", INSTANCES.load(Ordering::SeqCst));
    }

    #[test_init]
    fn stock_shelves(&mut self) {
        self.stock.insert("bolts", 40);
        self.stock.insert("nuts", 25);
        println!("    [test_init] instance #{} stocked", self.id);
    }

    #[test_cleanup]
    fn audit_shelves(&mut self) {
        println!("    [test_cleanup] instance #{} holds {} items", self.id, self.total());
    }

    #[case]
    fn ships_an_order(&mut self) {
        *self.stock.get_mut("bolts").unwrap() -= 15;
        assert_eq!(self.stock["bolts"], 25);
    }

    #[case]
    fn starts_from_full_stock(&mut self) {
        // a fresh instance per case: the order above is invisible here
        assert_eq!(self.total(), 65);
    }

    #[case]
    #[ignore]
    fn reconciles_with_supplier(&mut self) {
        unreachable!("ignored cases never run");
    }

    fn total(&self) -> u32 {
        self.stock.values().sum()
    }
}

// ---------------------------------------------------------------------------
// Ignored container: class hooks still run, cases do not
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Migration;

#[flux::container(name = "lifecycle::Migration", ignore)]
impl Migration {
    #[class_init]
    fn snapshot() {
        println!("    [class_init] snapshot taken");
    }

    #[class_cleanup]
    fn restore() {
        println!("    [class_cleanup] snapshot restored");
    }

    #[case]
    fn applies_schema_v2(&mut self) {
        unreachable!("the container is ignored");
    }
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
