//! Common test utilities for integration tests

#![allow(dead_code)]

use allyhub::{ContextLoop, CountdownTimer, MainContext, TaskList};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Create a timer with default settings and the loop driving its context
pub fn timer_fixture() -> (CountdownTimer, ContextLoop) {
    let (context, context_loop) = MainContext::new();
    (CountdownTimer::new(context), context_loop)
}

/// Create a task list seeded with the four default tasks
pub fn tasks_fixture() -> (TaskList, ContextLoop) {
    let (context, context_loop) = MainContext::new();
    (TaskList::new(context), context_loop)
}

/// Shared sink that records every value a subscriber receives
pub type Recorded<T> = Arc<Mutex<Vec<T>>>;

/// Build a subscriber callback that appends each delivered value to a vector
pub fn recorder<T>() -> (Recorded<T>, impl Fn(&T) + Send + Sync + 'static)
where
    T: Clone + Send + 'static,
{
    let seen: Recorded<T> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |value: &T| sink.lock().unwrap().push(value.clone()))
}

/// Values recorded so far
pub fn recorded<T: Clone>(seen: &Recorded<T>) -> Vec<T> {
    seen.lock().unwrap().clone()
}

/// Let the paused clock run forward so the ticker can post its jobs
///
/// Ticks are only queued here; they run on the next drain of the loop.
pub async fn elapse(duration: Duration) {
    tokio::time::sleep(duration).await;
}
