//! Per-job "already running" guard.
//!
//! Each scheduled job owns one [`JobGuard`]. An invocation that fires while
//! the previous one is still running is skipped instead of overlapping it.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct JobGuard {
    name: &'static str,
    running: Arc<AtomicBool>,
}

/// Held for the duration of a run; releases the guard on drop, including
/// when the run panics or is cancelled.
#[derive(Debug)]
pub struct RunningJob {
    running: Arc<AtomicBool>,
}

impl Drop for RunningJob {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl JobGuard {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Claims the guard, or returns `None` if a run is already in progress.
    #[must_use]
    pub fn try_start(&self) -> Option<RunningJob> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunningJob {
                running: Arc::clone(&self.running),
            })
    }

    /// Runs `job` if no other run holds the guard; otherwise logs and returns
    /// `None` without polling `job`.
    pub async fn run<F, T>(&self, job: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let Some(_running) = self.try_start() else {
            tracing::info!(
                job = self.name,
                "scheduler: previous run still in progress; skipping this invocation"
            );
            return None;
        };
        Some(job.await)
    }
}
