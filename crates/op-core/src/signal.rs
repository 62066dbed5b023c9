//! The `Signal` payload type carried through agent dataflow channels (§3).
//!
//! The kernel never inspects a signal's contents beyond its variant tag —
//! components decide what a given link id's signal means. `Signal` lives in
//! `op-core` (rather than `op-model`, which owns the `Model` trait) so both
//! `op-agent`'s channel/buffer machinery and `op-model`'s component
//! implementations can depend on it without a cycle.

/// Whether a component that produces dynamics is still actively driving its
/// agent, or has handed off control (S2, §8: a decelerating trajectory
/// follower transitions to `Disabled` once velocity would go negative).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ComponentState {
    #[default]
    Enabled,
    Disabled,
}

/// Longitudinal/vertical vehicle dynamics — position, heading, and motion.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct DynamicsSignal {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub yaw_rate: f64,
    pub v: f64,
    pub a: f64,
    pub travel_distance: f64,
    pub state: ComponentState,
}

/// Lateral/steering actuation summary.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct LateralSignal {
    pub steering_angle_rad: f64,
    pub curvature: f64,
}

/// A condensed summary a sensor/driver component emits about the
/// environment it perceives (distance to nearest relevant object, lane
/// geometry at the current position). The kernel never interprets these
/// fields — only the consuming model does.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct SensorDriverSignal {
    pub nearest_object_distance: Option<f64>,
    pub lane_width: f64,
    pub lane_curvature: f64,
}

/// A named bundle of scalar parameters, e.g. model coefficients loaded from
/// a vehicle/pedestrian catalog.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ParameterSignal {
    pub values: Vec<(String, f64)>,
}

impl ParameterSignal {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }
}

/// Opaque, immutable payload passed between component ports through a
/// channel. The kernel routes `Signal`s by link id only; it never branches
/// on the variant.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    Dynamics(DynamicsSignal),
    Lateral(LateralSignal),
    SensorDriver(SensorDriverSignal),
    Parameter(ParameterSignal),
}

impl Signal {
    /// A human-readable tag for logging — never used for kernel-level
    /// dispatch (§3: "The kernel never inspects signal contents beyond type
    /// tags").
    pub fn kind(&self) -> &'static str {
        match self {
            Signal::Dynamics(_) => "Dynamics",
            Signal::Lateral(_) => "Lateral",
            Signal::SensorDriver(_) => "SensorDriver",
            Signal::Parameter(_) => "Parameter",
        }
    }

    pub fn as_dynamics(&self) -> Option<&DynamicsSignal> {
        match self {
            Signal::Dynamics(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_lateral(&self) -> Option<&LateralSignal> {
        match self {
            Signal::Lateral(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_sensor_driver(&self) -> Option<&SensorDriverSignal> {
        match self {
            Signal::SensorDriver(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&ParameterSignal> {
        match self {
            Signal::Parameter(p) => Some(p),
            _ => None,
        }
    }
}
