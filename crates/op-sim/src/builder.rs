//! Fluent builder for constructing a [`RunOrchestrator`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use op_agent::Agent;
use op_core::ExperimentConfig;
use op_datastore::DataStore;
use op_eventnet::{EventDetector, Manipulator};
use op_networks::{
    EventDetectorFactory, ManipulatorFactory, NewAgentRequest, ObservationFactory, ObservationNetwork,
    ObservationPlugin, SpawnPointFactory, SpawnPointPlugin,
};
use op_plugin::{Callbacks, LibraryDescriptor, RuntimeInfo};
use op_world::World;

use crate::environment::EnvironmentConfig;
use crate::observer::{NoopObserver, RunObserver};
use crate::plugins::{EventDetectorSource, Maker, ManipulatorSource, SpawnSource};
use crate::sim::RunOrchestrator;

/// Wires a freshly spawned agent's component graph from its profile name.
/// Called once per agent, right after `AgentNetwork::add_agent` (§4.4
/// "agent factory").
pub type AgentBuilder = Box<dyn FnMut(&mut Agent, &NewAgentRequest) + Send>;

const DEFAULT_AGENT_LENGTH_M: f64 = 4.5;
const DEFAULT_AGENT_WIDTH_M: f64 = 1.8;

/// Fluent builder for [`RunOrchestrator`].
///
/// # Required inputs
///
/// - a [`World`] — the already-built road graph and spatial index (§4.2).
/// - an [`AgentBuilder`] — how to wire a spawned agent's component graph.
///
/// # Optional inputs (have defaults)
///
/// | Method                          | Default                         |
/// |----------------------------------|----------------------------------|
/// | `.experiment(cfg)`                | `ExperimentConfig::default()`    |
/// | `.environment(cfg)`               | `EnvironmentConfig::default()`   |
/// | `.agent_dimensions(len, width)`    | `4.5m x 1.8m`                     |
/// | `.spawn_point(...)`                | none registered                   |
/// | `.event_detector(...)`             | none registered                   |
/// | `.manipulator(...)`                | none registered                   |
/// | `.observation(...)`                | none registered                   |
pub struct RunOrchestratorBuilder {
    experiment: ExperimentConfig,
    environment: EnvironmentConfig,
    world: World,
    agent_builder: Option<AgentBuilder>,
    runtime_info: RuntimeInfo,
    callbacks: Callbacks,
    default_agent_length_m: f64,
    default_agent_width_m: f64,
    spawn_source: SpawnSource,
    event_detector_source: EventDetectorSource,
    manipulator_source: ManipulatorSource,
    observation: ObservationNetwork,
    observation_factories: HashMap<String, ObservationFactory>,
    observation_descriptors: Vec<LibraryDescriptor>,
    observer: Box<dyn RunObserver>,
}

impl RunOrchestratorBuilder {
    pub fn new(world: World, callbacks: Callbacks) -> Self {
        Self {
            experiment: ExperimentConfig::default(),
            environment: EnvironmentConfig::default(),
            world,
            agent_builder: None,
            runtime_info: RuntimeInfo { kernel_version: 1 },
            callbacks,
            default_agent_length_m: DEFAULT_AGENT_LENGTH_M,
            default_agent_width_m: DEFAULT_AGENT_WIDTH_M,
            spawn_source: SpawnSource::default(),
            event_detector_source: EventDetectorSource::default(),
            manipulator_source: ManipulatorSource::default(),
            observation: ObservationNetwork::new(&[]),
            observation_factories: HashMap::new(),
            observation_descriptors: Vec::new(),
            observer: Box::new(NoopObserver),
        }
    }

    pub fn observer(mut self, observer: Box<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn experiment(mut self, experiment: ExperimentConfig) -> Self {
        self.experiment = experiment;
        self
    }

    pub fn environment(mut self, environment: EnvironmentConfig) -> Self {
        self.environment = environment;
        self
    }

    pub fn agent_builder(mut self, builder: AgentBuilder) -> Self {
        self.agent_builder = Some(builder);
        self
    }

    pub fn agent_dimensions(mut self, length_m: f64, width_m: f64) -> Self {
        self.default_agent_length_m = length_m;
        self.default_agent_width_m = width_m;
        self
    }

    /// Register a bundled (natively compiled) spawn point. `maker` is called
    /// once per invocation, since `SpawnNetwork` is rebuilt fresh each time
    /// (§4.8 step 3) and a plug-in's internal state (e.g. how many agents it
    /// has already spawned) must not leak across invocations.
    pub fn spawn_point(mut self, name: impl Into<String>, maker: Maker<dyn SpawnPointPlugin>) -> Self {
        self.spawn_source.bundled.push((name.into(), maker));
        self
    }

    pub fn event_detector(mut self, maker: Maker<dyn EventDetector>) -> Self {
        self.event_detector_source.bundled.push(maker);
        self
    }

    pub fn manipulator(mut self, maker: Maker<dyn Manipulator>) -> Self {
        self.manipulator_source.bundled.push(maker);
        self
    }

    /// Register a dynamically loaded spawn-point library plus the bundled
    /// factory the kernel falls back to when `Instantiate` resolves it
    /// (§4.1/§4.5).
    pub fn spawn_library(mut self, descriptor: LibraryDescriptor, factory: SpawnPointFactory) -> Self {
        self.spawn_source.factories.insert(descriptor.name.clone(), factory);
        self.spawn_source.descriptors.push(descriptor);
        self
    }

    pub fn event_detector_library(mut self, descriptor: LibraryDescriptor, factory: EventDetectorFactory) -> Self {
        self.event_detector_source.factories.insert(descriptor.name.clone(), factory);
        self.event_detector_source.descriptors.push(descriptor);
        self
    }

    pub fn manipulator_library(mut self, descriptor: LibraryDescriptor, factory: ManipulatorFactory) -> Self {
        self.manipulator_source.factories.insert(descriptor.name.clone(), factory);
        self.manipulator_source.descriptors.push(descriptor);
        self
    }

    /// Register a bundled observation plug-in (e.g. `op-observation-csv`'s
    /// `CsvObservation`). Unlike spawn/event-detector/manipulator, the
    /// observation network persists across invocations (§4.5), so this takes
    /// an already-built instance rather than a maker.
    pub fn observation(mut self, name: impl Into<String>, plugin: Box<dyn ObservationPlugin>) -> Self {
        self.observation.register_bundled(name, plugin);
        self
    }

    pub fn observation_library(mut self, descriptor: LibraryDescriptor, factory: ObservationFactory) -> Self {
        self.observation_factories.insert(descriptor.name.clone(), factory);
        self.observation_descriptors.push(descriptor);
        self
    }

    pub fn build(mut self) -> RunOrchestrator {
        if !self.observation_descriptors.is_empty() {
            let failed = self.observation.instantiate(
                &self.observation_descriptors,
                &self.observation_factories,
                &self.runtime_info,
                &self.callbacks,
            );
            for name in failed {
                tracing::warn!(library = %name, "observation plug-in failed to instantiate at build time");
            }
        }

        RunOrchestrator {
            experiment: self.experiment,
            environment: self.environment,
            world: Arc::new(Mutex::new(self.world)),
            data_store: Arc::new(Mutex::new(DataStore::new())),
            observation: Arc::new(Mutex::new(self.observation)),
            spawn_source: self.spawn_source,
            event_detector_source: self.event_detector_source,
            manipulator_source: self.manipulator_source,
            agent_builder: self.agent_builder.unwrap_or_else(|| Box::new(|_, _| {})),
            runtime_info: self.runtime_info,
            callbacks: self.callbacks,
            default_agent_length_m: self.default_agent_length_m,
            default_agent_width_m: self.default_agent_width_m,
            observer: self.observer,
        }
    }
}
