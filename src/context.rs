//! Designated execution context
//!
//! Every model command and every change notification runs as a job on one
//! FIFO queue. [`MainContext`] is the cloneable handle used to post jobs;
//! [`ContextLoop`] is the single consumer that drains them in order.
//!
//! The binary spawns [`ContextLoop::run`] once at startup. Tests usually keep
//! the loop in hand and drive it with [`ContextLoop::run_until_idle`] or
//! [`ContextLoop::turn`] so delivery order stays deterministic.

use anyhow::{Result, anyhow};
use tokio::sync::{mpsc, oneshot};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle for posting work onto the designated execution context
#[derive(Clone)]
pub struct MainContext {
    sender: mpsc::UnboundedSender<Job>,
}

/// The consuming side of the execution context
pub struct ContextLoop {
    receiver: mpsc::UnboundedReceiver<Job>,
}

impl MainContext {
    /// Create a new execution context and the loop that drives it
    pub fn new() -> (Self, ContextLoop) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, ContextLoop { receiver })
    }

    /// Enqueue a job behind everything already posted
    ///
    /// # Returns
    /// `false` when the loop has been dropped and the job was discarded
    pub fn post<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.sender.send(Box::new(job)).is_err() {
            tracing::debug!("execution context closed; job discarded");
            return false;
        }
        true
    }

    /// Run `f` on the execution context and wait for its result
    ///
    /// Must not be awaited from inside a job: the loop would be waiting on
    /// itself.
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let posted = self.post(move || {
            // The caller may have given up waiting; nothing to do then.
            let _ = reply_tx.send(f());
        });
        if !posted {
            return Err(anyhow!("execution context has shut down"));
        }
        reply_rx
            .await
            .map_err(|_| anyhow!("execution context stopped before the call completed"))
    }

    /// Whether the loop side has been dropped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl ContextLoop {
    /// Drain jobs until every [`MainContext`] handle is gone
    pub async fn run(mut self) {
        tracing::debug!("execution context started");
        while let Some(job) = self.receiver.recv().await {
            job();
        }
        tracing::debug!("execution context finished");
    }

    /// Wait for the next job and run it
    ///
    /// # Returns
    /// `false` once every sender is gone and the queue is empty
    pub async fn turn(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run queued jobs, including the ones they enqueue, until the queue is empty
    ///
    /// # Returns
    /// The number of jobs executed
    pub fn run_until_idle(&mut self) -> usize {
        let mut executed = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            executed += 1;
        }
        executed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_jobs_run_in_post_order() {
        let (context, mut context_loop) = MainContext::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let seen = seen.clone();
            assert!(context.post(move || seen.lock().unwrap().push(i)));
        }

        assert_eq!(context_loop.run_until_idle(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_jobs_posted_by_jobs_run_in_same_drain() {
        let (context, mut context_loop) = MainContext::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner_context = context.clone();
        let inner_seen = seen.clone();
        context.post(move || {
            inner_seen.lock().unwrap().push("outer");
            let nested_seen = inner_seen.clone();
            inner_context.post(move || nested_seen.lock().unwrap().push("nested"));
        });

        assert_eq!(context_loop.run_until_idle(), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["outer", "nested"]);
    }

    #[test]
    fn test_post_after_loop_dropped() {
        let (context, context_loop) = MainContext::new();
        drop(context_loop);

        assert!(context.is_closed());
        assert!(!context.post(|| {}));
    }

    #[tokio::test]
    async fn test_call_returns_result_from_loop() {
        let (context, context_loop) = MainContext::new();
        let runner = tokio::spawn(context_loop.run());

        let value = context.call(|| 40 + 2).await.unwrap();
        assert_eq!(value, 42);

        drop(context);
        runner.await.unwrap();
    }

    #[tokio::test]
    async fn test_call_fails_when_loop_is_gone() {
        let (context, context_loop) = MainContext::new();
        drop(context_loop);

        let result = context.call(|| 1).await;
        assert!(result.is_err());
    }
}
