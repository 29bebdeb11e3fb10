//! Helpers for spawning tasks with our desired semantics.
//!
//! Tasks spawned through [`spawn`] abort the process when they panic, so a
//! broken invariant inside the server loop never leaves a half-dead
//! listener behind. Use [`spawn_allow_panic`] to opt out.

use futures03::future::{FutureExt, TryFutureExt};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;

fn abort_on_panic<T: Send + 'static>(
    f: impl Future<Output = T> + Send + 'static,
) -> impl Future<Output = T> {
    // We're crashing, unwind safety doesn't matter.
    AssertUnwindSafe(f).catch_unwind().unwrap_or_else(|_| {
        println!("Panic in tokio task, aborting!");
        std::process::abort()
    })
}

/// Aborts on panic.
pub fn spawn<T: Send + 'static>(f: impl Future<Output = T> + Send + 'static) -> JoinHandle<T> {
    tokio::spawn(abort_on_panic(f))
}

pub fn spawn_allow_panic<T: Send + 'static>(
    f: impl Future<Output = T> + Send + 'static,
) -> JoinHandle<T> {
    tokio::spawn(f)
}
