//! Environment configuration and per-invocation world-parameter sampling
//! (§4.8 step 2: "sample world parameters... from the environment-config
//! distributions").

use op_core::StochasticsRng;

/// A closed interval an [`EnvironmentConfig`] distribution is sampled from.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn constant(value: f64) -> Self {
        Self { min: value, max: value }
    }

    fn sample(self, rng: &mut StochasticsRng) -> f64 {
        rng.uniform(self.min, self.max)
    }
}

/// `environmentConfig` (§6): distributions for `TimeOfDay`,
/// `VisibilityDistance`, `Friction`, `Weather`.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvironmentConfig {
    pub time_of_day_hours: Range,
    pub visibility_distance_m: Range,
    pub friction: Range,
    /// Weather is sampled as a [0, 1) draw and left to the caller (world
    /// plug-in, observation plug-in) to bucket into named conditions.
    pub weather: Range,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            time_of_day_hours: Range { min: 0.0, max: 24.0 },
            visibility_distance_m: Range { min: 50.0, max: 1000.0 },
            friction: Range { min: 0.3, max: 1.0 },
            weather: Range { min: 0.0, max: 1.0 },
        }
    }
}

/// One invocation's sampled draw from an [`EnvironmentConfig`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldParameters {
    pub time_of_day_hours: f64,
    pub visibility_distance_m: f64,
    pub friction: f64,
    pub weather: f64,
}

impl EnvironmentConfig {
    pub fn sample(&self, rng: &mut StochasticsRng) -> WorldParameters {
        WorldParameters {
            time_of_day_hours: self.time_of_day_hours.sample(rng),
            visibility_distance_m: self.visibility_distance_m.sample(rng),
            friction: self.friction.sample(rng),
            weather: self.weather.sample(rng),
        }
    }
}
