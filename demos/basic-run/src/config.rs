//! TOML-loadable configuration for the demo binary.

use op_core::ExperimentConfig;
use op_sim::EnvironmentConfig;
use serde::Deserialize;

/// Scenario knobs that aren't part of the kernel's own config types —
/// how many agents to spawn and how fast they accelerate.
#[derive(Clone, Debug, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_agent_count")]
    pub agent_count: u32,
    #[serde(default = "default_spacing_m")]
    pub spacing_m: f64,
    #[serde(default = "default_target_velocity_mps")]
    pub target_velocity_mps: f64,
    #[serde(default = "default_accel_mps2")]
    pub accel_mps2: f64,
}

fn default_agent_count() -> u32 {
    5
}

fn default_spacing_m() -> f64 {
    20.0
}

fn default_target_velocity_mps() -> f64 {
    13.0
}

fn default_accel_mps2() -> f64 {
    1.5
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            agent_count: default_agent_count(),
            spacing_m: default_spacing_m(),
            target_velocity_mps: default_target_velocity_mps(),
            accel_mps2: default_accel_mps2(),
        }
    }
}

/// Top-level `--config` file shape: `[experiment]`, `[environment]`, and
/// `[scenario]` tables, each optional (falling back to kernel defaults).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub experiment: ExperimentConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl DemoConfig {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
