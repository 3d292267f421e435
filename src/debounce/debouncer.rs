// src/debounce/debouncer.rs
// =============================================================================
// Waits for typing to pause before passing the query on.
//
// Every keystroke restarts a short timer (300ms by default). Only when the
// timer runs out with no new keystroke is the trimmed text sent on the
// output channel. Fast typing therefore produces exactly one query: the
// last one.
//
// Clearing the field is a special case, controlled by ClearPolicy:
// - Immediate: an empty field is sent right away (suggestions vanish at once)
// - Debounced: an empty field waits like any other input
//
// A value that already fired can still be sitting in the channel when the
// next keystroke arrives. Every value carries the generation it was pushed
// in, and is_current() tells the receiver whether it's been overtaken.
// =============================================================================

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::debug;

use super::timer::CancellableTimer;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearPolicy {
    Immediate,
    #[default]
    Debounced,
}

// One value that made it through the quiet interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    generation: u64,
    pub value: String,
}

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    policy: ClearPolicy,
    timer: CancellableTimer,
    // Bumped by every push() and cancel()
    generation: u64,
    tx: mpsc::UnboundedSender<Settled>,
}

impl Debouncer {
    // Returns the debouncer and the receiving end of its output channel
    pub fn new(delay: Duration, policy: ClearPolicy) -> (Self, mpsc::UnboundedReceiver<Settled>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            policy,
            timer: CancellableTimer::new(),
            generation: 0,
            tx,
        };
        (debouncer, rx)
    }

    // Feeds one raw input change (the whole field contents, not a single key)
    pub fn push(&mut self, raw: &str) {
        self.generation += 1;
        let settled = Settled {
            generation: self.generation,
            value: raw.trim().to_string(),
        };

        if settled.value.is_empty() && self.policy == ClearPolicy::Immediate {
            self.timer.cancel();
            debug!("input cleared, propagating immediately");
            let _ = self.tx.send(settled);
            return;
        }

        let tx = self.tx.clone();
        self.timer.schedule(self.delay, move || {
            debug!(query = %settled.value, "input settled");
            // The receiver may be gone if the explorer was dropped
            let _ = tx.send(settled);
        });
    }

    // Drops a pending value, including one already waiting in the channel
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.timer.cancel();
    }

    // False once a newer push() or a cancel() has happened
    pub fn is_current(&self, settled: &Settled) -> bool {
        settled.generation == self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }
}
