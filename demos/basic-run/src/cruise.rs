//! A minimal longitudinal controller: accelerates toward a target velocity
//! and holds it, publishing a `Dynamics` signal every trigger.

use op_core::{ComponentState, DynamicsSignal, LinkId, Signal, TimeMs};
use op_model::Model;

/// Ramps velocity toward `target_velocity_mps` at `accel_mps2`, then cruises.
pub struct CruiseControlModel {
    target_velocity_mps: f64,
    accel_mps2: f64,
    velocity_mps: f64,
    last_trigger: Option<TimeMs>,
}

impl CruiseControlModel {
    pub fn new(target_velocity_mps: f64, accel_mps2: f64) -> Self {
        Self {
            target_velocity_mps,
            accel_mps2,
            velocity_mps: 0.0,
            last_trigger: None,
        }
    }
}

impl Model for CruiseControlModel {
    fn trigger(&mut self, time: TimeMs) {
        let dt_s = match self.last_trigger {
            Some(prev) => time.since(prev) as f64 / 1000.0,
            None => 0.0,
        };
        self.last_trigger = Some(time);

        let remaining = self.target_velocity_mps - self.velocity_mps;
        if remaining > 0.0 {
            self.velocity_mps = (self.velocity_mps + self.accel_mps2 * dt_s).min(self.target_velocity_mps);
        }
    }

    fn update_input(&mut self, _link: LinkId, _signal: Signal, _time: TimeMs) {}

    fn update_output(&mut self, _link: LinkId, _time: TimeMs) -> Option<Signal> {
        let still_accelerating = self.velocity_mps < self.target_velocity_mps;
        Some(Signal::Dynamics(DynamicsSignal {
            x: 0.0,
            y: 0.0,
            yaw: 0.0,
            yaw_rate: 0.0,
            v: self.velocity_mps,
            a: if still_accelerating { self.accel_mps2 } else { 0.0 },
            travel_distance: 0.0,
            state: ComponentState::Enabled,
        }))
    }
}
