//! Channels and double-buffered signal delivery (§4.3).
//!
//! A channel connects one component's output link to one or more input
//! links on other components. At any instant the *current* slot is what
//! readers see; `UpdateOutput` schedules a publish that becomes visible once
//! its `responseTime` has elapsed, not immediately — this is what lets a
//! component model actuator lag at the graph level.

use op_core::{Signal, TimeMs};

/// One pending publish: the signal becomes the channel's current value once
/// `self.0 <= now`. Several may coexist when `responseTime` delays differ
/// across ticks (open question 1, §9).
type PendingPublish = (TimeMs, Signal);

/// The rendezvous point at one channel: a current slot readers see, and a
/// queue of not-yet-visible publishes.
#[derive(Debug, Default)]
pub struct Buffer {
    current: Option<Signal>,
    pending: Vec<PendingPublish>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value an `UpdateInput` at time `t` would read — the most recent
    /// publish visible at or before `t`.
    pub fn read(&self) -> Option<Signal> {
        self.current.clone()
    }

    /// Queue `signal` to become current at `at` (the trigger time plus the
    /// component's `responseTime`).
    pub fn schedule_publish(&mut self, at: TimeMs, signal: Signal) {
        self.pending.push((at, signal));
    }

    /// Apply every publish due at or before `now`, keeping whichever has the
    /// latest `at` among them as the new current value.
    pub fn advance(&mut self, now: TimeMs) {
        let mut latest: Option<PendingPublish> = None;
        self.pending.retain(|(at, signal)| {
            if *at > now {
                return true;
            }
            if latest.as_ref().is_none_or(|(t, _)| *at >= *t) {
                latest = Some((*at, signal.clone()));
            }
            false
        });
        if let Some((_, signal)) = latest {
            self.current = Some(signal);
        }
    }

    /// `true` if a publish is still queued, not yet visible.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
