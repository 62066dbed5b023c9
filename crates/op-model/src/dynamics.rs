//! `TrajectoryFollower` — a built-in `Model` that drives an agent's
//! dynamics signal from a scripted position trajectory, optionally
//! overridden by an external acceleration input (§7 "S1"/"S2").

use op_core::{ComponentState, DynamicsSignal, LinkId, Signal, TimeMs};

use crate::Model;

/// One scripted `(time, x, y, yaw)` sample.
#[derive(Copy, Clone, Debug)]
pub struct Waypoint {
    pub time: TimeMs,
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

/// Input link carrying an externally commanded acceleration.
pub const ACCEL_IN: LinkId = LinkId(0);
/// Output link carrying the computed [`DynamicsSignal`].
pub const DYNAMICS_OUT: LinkId = LinkId(1);

/// Follows a scripted trajectory, reporting velocity/acceleration/yaw-rate
/// derived from successive waypoints (S1).
///
/// Once any signal arrives on [`ACCEL_IN`], the component switches
/// permanently into acceleration-driven mode (S2): velocity integrates via
/// `v' = v + a*dt` using the most recently received acceleration (zero
/// counts — "at t=800 (accel=0) velocity stays at 5"), and position
/// advances along the last known heading by `v'*dt` instead of following
/// further waypoints. If `v'` would drop to zero or below, the component
/// transitions to [`ComponentState::Disabled`] and every subsequent output
/// carries that state unchanged.
pub struct TrajectoryFollower {
    waypoints: Vec<Waypoint>,
    accel_override: Option<f64>,
    prev: Option<Waypoint>,
    prev_v: f64,
    state: ComponentState,
    pending: Option<DynamicsSignal>,
}

impl TrajectoryFollower {
    /// `waypoints` must be sorted ascending by `time`.
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self {
            waypoints,
            accel_override: None,
            prev: None,
            prev_v: 0.0,
            state: ComponentState::Enabled,
            pending: None,
        }
    }
}

impl Model for TrajectoryFollower {
    fn update_input(&mut self, link: LinkId, signal: Signal, _time: TimeMs) {
        if link == ACCEL_IN {
            if let Signal::Dynamics(d) = signal {
                self.accel_override = Some(d.a);
            }
        }
    }

    fn trigger(&mut self, time: TimeMs) {
        if self.state == ComponentState::Disabled {
            let mut frozen = self.pending.unwrap_or_default();
            frozen.state = ComponentState::Disabled;
            self.pending = Some(frozen);
            return;
        }

        let (x, y, yaw, yaw_rate, v, a, distance) = match self.accel_override {
            Some(accel) => {
                let prev = self.prev.unwrap_or(Waypoint { time, x: 0.0, y: 0.0, yaw: 0.0 });
                let dt = if time > prev.time { time.since(prev.time) as f64 / 1000.0 } else { 0.0 };
                let v_new = self.prev_v + accel * dt;
                let distance = v_new.max(0.0) * dt;
                let (x, y) = (prev.x + prev.yaw.cos() * distance, prev.y + prev.yaw.sin() * distance);
                (x, y, prev.yaw, 0.0, v_new.max(0.0), accel, distance)
            }
            None => {
                let Some(&wp) = self.waypoints.iter().find(|w| w.time == time) else {
                    self.pending = None;
                    return;
                };
                let prev = self.prev.unwrap_or(wp);
                let dt = if time > prev.time { time.since(prev.time) as f64 / 1000.0 } else { 0.0 };
                let dx = wp.x - prev.x;
                let dy = wp.y - prev.y;
                let distance = (dx * dx + dy * dy).sqrt();
                let v = if dt > 0.0 { distance / dt } else { 0.0 };
                let a = if dt > 0.0 { (v - self.prev_v) / dt } else { 0.0 };
                let yaw_rate = if dt > 0.0 { (wp.yaw - prev.yaw) / dt } else { 0.0 };
                (wp.x, wp.y, wp.yaw, yaw_rate, v, a, distance)
            }
        };

        if v <= 0.0 && self.accel_override.is_some() {
            self.state = ComponentState::Disabled;
        }

        self.pending = Some(DynamicsSignal {
            x,
            y,
            yaw,
            yaw_rate,
            v,
            a,
            travel_distance: distance,
            state: self.state,
        });
        self.prev_v = v;
        self.prev = Some(Waypoint { time, x, y, yaw });
    }

    fn update_output(&mut self, link: LinkId, _time: TimeMs) -> Option<Signal> {
        if link != DYNAMICS_OUT {
            return None;
        }
        self.pending.take().map(Signal::Dynamics)
    }

    fn set_state(&mut self, state: ComponentState) {
        self.state = state;
    }
}
