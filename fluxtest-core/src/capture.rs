//! Panic Capture
//!
//! Runs user code under `catch_unwind` and turns a panic into a
//! [`CapturedError`] of kind [`PANIC_KIND`].
//!
//! A process-wide panic hook is installed once. While a capture is active on
//! the current thread the hook records the panic location and backtrace into a
//! thread-local slot instead of printing; panics on other threads (or outside a
//! capture) are forwarded to the previously installed hook.

use crate::error::{CapturedError, PANIC_KIND};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::RefCell;
use std::panic::AssertUnwindSafe;
use std::sync::Once;

/// Crates whose frames are runtime machinery, not user code
const RUNTIME_CRATES: &[&str] = &["std::", "core::", "alloc::", "test::"];

/// Frames of the panic hook itself, above the panicking user frame
const HOOK_FRAME_PREFIX: &str = "fluxtest_core::capture::install_hook";

/// Engine frames that call into user code; everything below them is dropped
const ENGINE_ENTRY_PREFIXES: &[&str] = &[
    "fluxtest_core::builder::",
    "fluxtest_core::outcome::invoke",
    "fluxtest_core::capture::catch_panic",
];

thread_local! {
    static ACTIVE: RefCell<Option<CaptureState>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

struct CaptureState {
    backtraces: bool,
    record: Option<PanicRecord>,
}

struct PanicRecord {
    location: Option<String>,
    backtrace: Option<String>,
}

fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let recorded = ACTIVE.with(|slot| {
                let Ok(mut slot) = slot.try_borrow_mut() else {
                    return false;
                };
                let Some(state) = slot.as_mut() else {
                    return false;
                };
                let backtrace = if state.backtraces {
                    Some(Backtrace::force_capture())
                } else {
                    None
                };
                state.record = Some(PanicRecord {
                    location: info
                        .location()
                        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column())),
                    backtrace: backtrace
                        .filter(|bt| bt.status() == BacktraceStatus::Captured)
                        .map(|bt| bt.to_string()),
                });
                true
            });

            if !recorded {
                previous(info);
            }
        }));
    });
}

/// Run `f`, converting a panic into a [`CapturedError`]
///
/// When `backtraces` is set, the captured error carries the user-code frames
/// of the panicking thread's backtrace; otherwise only the panic location.
pub fn catch_panic<T>(backtraces: bool, f: impl FnOnce() -> T) -> Result<T, CapturedError> {
    install_hook();

    let outer = ACTIVE.with(|slot| {
        slot.replace(Some(CaptureState {
            backtraces,
            record: None,
        }))
    });
    let result = std::panic::catch_unwind(AssertUnwindSafe(f));
    let state = ACTIVE.with(|slot| slot.replace(outer));

    result.map_err(|payload| {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let record = state.and_then(|s| s.record);
        panic_error(message, record)
    })
}

fn panic_error(message: String, record: Option<PanicRecord>) -> CapturedError {
    let mut error = CapturedError::new(PANIC_KIND, message);
    let Some(record) = record else {
        return error;
    };

    if let Some(thread) = std::thread::current().name() {
        error = error.with_data("thread", thread);
    }

    let frames = record
        .backtrace
        .as_deref()
        .map(user_frames)
        .unwrap_or_default();

    if !frames.is_empty() {
        error = error.with_stack_trace(frames.join("\n"));
    } else if let Some(location) = record.location {
        error = error.with_stack_trace(format!("panic in {location}"));
    }
    error
}

/// Convert `std` backtrace output into `symbol in file:line:col` frames
///
/// Keeps the frames between the panic machinery and the engine frame that
/// invoked user code, minus runtime and unresolved frames.
fn user_frames(backtrace: &str) -> Vec<String> {
    let mut frames: Vec<(String, Option<String>)> = Vec::new();

    for line in backtrace.lines() {
        let trimmed = line.trim_start();
        if let Some(location) = trimmed.strip_prefix("at ") {
            if let Some((_, loc)) = frames.last_mut() {
                loc.get_or_insert_with(|| location.to_string());
            }
            continue;
        }
        let Some((index, symbol)) = trimmed.split_once(": ") else {
            continue;
        };
        if index.chars().all(|c| c.is_ascii_digit()) {
            frames.push((symbol.to_string(), None));
        }
    }

    frames
        .into_iter()
        .take_while(|(symbol, _)| !ENGINE_ENTRY_PREFIXES.iter().any(|p| symbol.starts_with(p)))
        .filter(|(symbol, _)| !is_hidden_frame(symbol))
        .map(|(symbol, location)| match location {
            Some(location) => format!("{symbol} in {location}"),
            None => symbol,
        })
        .collect()
}

fn is_hidden_frame(symbol: &str) -> bool {
    symbol == "<unknown>"
        || symbol.starts_with("__rust")
        || symbol.starts_with("rust_begin_unwind")
        || symbol.starts_with(HOOK_FRAME_PREFIX)
        || is_runtime_symbol(symbol)
}

/// `path::f`, or `<Type as Trait>::f` where the impl belongs to the runtime
fn is_runtime_symbol(symbol: &str) -> bool {
    let is_runtime_path = |path: &str| RUNTIME_CRATES.iter().any(|c| path.starts_with(c));

    let Some(qualified) = symbol.strip_prefix('<') else {
        return is_runtime_path(symbol);
    };
    match qualified.split_once(" as ") {
        // a primitive or generic self type takes the trait's side
        Some((self_ty, trait_path)) => {
            is_runtime_path(self_ty) || (!self_ty.contains("::") && is_runtime_path(trait_path))
        }
        None => is_runtime_path(qualified),
    }
}
