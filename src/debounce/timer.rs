// src/debounce/timer.rs
// =============================================================================
// A one-shot timer that can be cancelled.
//
// schedule() runs an action after a delay on a tokio task. Scheduling again
// (or calling cancel()) aborts the previous task before it fires. Dropping
// the timer cancels it too, so nothing fires after its owner is gone.
//
// Rust concepts:
// - JoinHandle::abort(): Stops a spawned task at its next .await
// - Drop: Cleanup code that runs automatically when a value goes away
// =============================================================================

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

#[derive(Debug, Default)]
pub struct CancellableTimer {
    handle: Option<JoinHandle<()>>,
}

impl CancellableTimer {
    pub fn new() -> Self {
        Self::default()
    }

    // Runs `action` once `delay` has passed, replacing any pending action
    //
    // Must be called from inside a tokio runtime
    pub fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        // Fix the deadline now, not when the task first gets polled
        let deadline = Instant::now() + delay;
        self.handle = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            action();
        }));
    }

    // Returns true if an action was still waiting to fire
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }
}

impl Drop for CancellableTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = CancellableTimer::new();

        let counter = Arc::clone(&fired);
        timer.schedule(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_action() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = CancellableTimer::new();

        let counter = Arc::clone(&fired);
        timer.schedule(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(timer.cancel());
        assert!(!timer.cancel());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let mut timer = CancellableTimer::new();
            let counter = Arc::clone(&fired);
            timer.schedule(Duration::from_millis(100), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
