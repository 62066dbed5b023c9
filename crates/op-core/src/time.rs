//! Simulation time model.
//!
//! # Design
//!
//! Time is an integer millisecond counter (§3: "Integer milliseconds...
//! Monotonic; no wall clock"). Using an integer as the canonical time unit
//! means all schedule arithmetic is exact (no floating-point drift) and
//! comparisons are O(1). There is no wall-clock mapping anywhere in this
//! crate — the kernel has no notion of real time, only tick order.

use std::fmt;

// ── TimeMs ───────────────────────────────────────────────────────────────────

/// An absolute simulation time, in milliseconds since run start.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeMs(pub u64);

impl TimeMs {
    pub const ZERO: TimeMs = TimeMs(0);

    /// Return the time `n` milliseconds after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> TimeMs {
        TimeMs(self.0 + n)
    }

    /// Milliseconds elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: TimeMs) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for TimeMs {
    type Output = TimeMs;
    #[inline]
    fn add(self, rhs: u64) -> TimeMs {
        TimeMs(self.0 + rhs)
    }
}

impl std::ops::Sub for TimeMs {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: TimeMs) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for TimeMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ── RunClock ──────────────────────────────────────────────────────────────────

/// Drives the monotonic tick counter for one invocation.
///
/// `RunClock` is cheap to copy and holds no heap data. It is intentionally
/// minimal — the kernel has no wall-clock concept, only `current_time`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunClock {
    /// The framework update rate (fixed tick length). All component cycle
    /// times must be integer multiples of this.
    pub framework_cycle_time_ms: u64,
    /// The current simulation time — advanced explicitly by the scheduler,
    /// never uniformly by one cycle (the next timestamp is the minimum
    /// `nextFireTime` across all pending tasks, §4.7).
    pub current_time: TimeMs,
}

impl RunClock {
    /// Create a clock at time zero with the given framework update rate.
    pub fn new(framework_cycle_time_ms: u64) -> Self {
        Self {
            framework_cycle_time_ms,
            current_time: TimeMs::ZERO,
        }
    }

    /// Advance the clock to `time`. The scheduler is the only caller —
    /// `time` must be the result of `GetNextTimestamp`.
    #[inline]
    pub fn advance_to(&mut self, time: TimeMs) {
        debug_assert!(time >= self.current_time, "time must not move backwards");
        self.current_time = time;
    }

    /// The framework-rate successor of `t` — used by `GetNextTimestamp` when
    /// no pending task fires strictly after `t`.
    #[inline]
    pub fn framework_successor(&self, t: TimeMs) -> TimeMs {
        t.offset(self.framework_cycle_time_ms)
    }
}

impl fmt::Display for RunClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.current_time)
    }
}

// ── RunConfig ─────────────────────────────────────────────────────────────────

/// Per-component timing parameters named directly in §3/§6: `cycleTime`,
/// `offsetTime`, `responseTime`, and the tie-breaking `priority`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    /// How often the component fires, in ms. Must be an integer multiple of
    /// the framework's `cycleTime`.
    pub cycle_time_ms: u64,
    /// Delay, in ms, from spawn (or run start) to the component's first
    /// fire.
    pub offset_time_ms: u64,
    /// Delay, in ms, between a component's trigger and the publication of
    /// its output.
    pub response_time_ms: u64,
    /// Tie-breaker among tasks scheduled at the same instant — higher runs
    /// first.
    pub priority: i32,
    /// `true` marks a component whose trigger/update fire only once, right
    /// after spawn (non-recurring).
    pub is_init: bool,
}

impl TimingConfig {
    /// A recurring component with the given cycle time, zero offset and
    /// response time, and default priority.
    pub fn recurring(cycle_time_ms: u64) -> Self {
        Self {
            cycle_time_ms,
            offset_time_ms: 0,
            response_time_ms: 0,
            priority: 0,
            is_init: false,
        }
    }

    /// A non-recurring (`isInit`) component firing once at `offset_time_ms`.
    pub fn init_once(offset_time_ms: u64) -> Self {
        Self {
            cycle_time_ms: 0,
            offset_time_ms,
            response_time_ms: 0,
            priority: 0,
            is_init: true,
        }
    }
}

// ── ExperimentConfig ──────────────────────────────────────────────────────────

/// Top-level experiment configuration (§6: `experimentConfig`).
///
/// One `ExperimentConfig` drives `numberOfInvocations` separate replays of
/// the same scenario, each reseeded from `randomSeed + i`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentConfig {
    /// How many independent invocations to run.
    pub number_of_invocations: u32,
    /// Base seed; invocation `i` is seeded with `random_seed + i`.
    pub random_seed: u32,
    /// The framework's fixed update rate in ms (default 100).
    pub framework_cycle_time_ms: u64,
    /// The scenario's end time, in ms, relative to invocation start.
    pub scenario_end_time_ms: u64,
}

impl ExperimentConfig {
    /// Seed for invocation `i`.
    #[inline]
    pub fn seed_for_invocation(&self, i: u32) -> u32 {
        self.random_seed.wrapping_add(i)
    }

    /// Construct a `RunClock` pre-configured for this experiment.
    pub fn make_clock(&self) -> RunClock {
        RunClock::new(self.framework_cycle_time_ms)
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            number_of_invocations: 1,
            random_seed: 0,
            framework_cycle_time_ms: 100,
            scenario_end_time_ms: 0,
        }
    }
}
