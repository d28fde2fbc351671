//! Async Test Cases: Tokio runtime integration
//!
//! Any marked method may be an `async fn`. Each invocation is driven to
//! completion on its own current-thread Tokio runtime, so from the engine's
//! view it is an ordinary blocking call.
//!
//! Run with: cargo run --example feature_async -p fluxtest-demos
//!
//! Expected output: `times_out` fails with a `tokio::time::error::Elapsed`
//! kind; the other cases pass.

use fluxtest::prelude::*;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
#[error("channel closed before {expected} messages arrived")]
struct ChannelClosed {
    expected: usize,
}

#[derive(Default)]
struct Pipeline {
    received: Vec<u64>,
}

#[flux::container(name = "async::Pipeline")]
impl Pipeline {
    #[class_init]
    async fn warm_up() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[case]
    async fn timer_fires(&mut self) {
        let start = Instant::now();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[case]
    async fn drains_channel(&mut self) -> Result<(), ChannelClosed> {
        let (tx, mut rx) = mpsc::channel(8);
        tokio::spawn(async move {
            for i in 0..4u64 {
                if tx.send(i * i).await.is_err() {
                    break;
                }
            }
        });

        while let Some(value) = rx.recv().await {
            self.received.push(value);
        }
        if self.received.len() != 4 {
            return Err(ChannelClosed { expected: 4 });
        }
        assert_eq!(self.received, [0, 1, 4, 9]);
        Ok(())
    }

    #[case]
    async fn times_out(&mut self) -> Result<(), tokio::time::error::Elapsed> {
        tokio::time::timeout(Duration::from_millis(1), std::future::pending::<()>()).await
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
