//! Spawn-point network (§4.5): `TriggerPreRunSpawnPoints`,
//! `TriggerRuntimeSpawnPoints(time)`, and the `ConsumeNewAgents` queue the
//! scheduler drains every tick.

use std::collections::{HashMap, VecDeque};

use op_core::{LaneId, RoadId, TimeMs};
use op_plugin::{Binding, Callbacks, LibraryDescriptor, RuntimeInfo};

/// Where and what kind of agent a spawn point wants created. The spawn
/// network never builds the `op_agent::Agent` itself — that needs the
/// dataflow graph wiring, which belongs to whoever owns the agent factory.
#[derive(Clone, Debug)]
pub struct NewAgentRequest {
    pub road: RoadId,
    pub lane: LaneId,
    pub s: f64,
    pub t: f64,
    pub agent_profile: String,
}

pub trait SpawnPointPlugin: Send {
    fn trigger_pre_run(&mut self) -> Vec<NewAgentRequest>;
    fn trigger_runtime(&mut self, time: TimeMs) -> Vec<NewAgentRequest>;
}

pub type SpawnPointFactory = fn() -> Box<dyn SpawnPointPlugin>;

pub struct SpawnNetwork {
    bindings: HashMap<String, Binding>,
    plugins: HashMap<String, Box<dyn SpawnPointPlugin>>,
    pending: VecDeque<NewAgentRequest>,
}

impl SpawnNetwork {
    pub fn new(descriptors: &[LibraryDescriptor]) -> Self {
        let bindings = descriptors
            .iter()
            .map(|d| (d.name.clone(), Binding::new(d.path.clone())))
            .collect();
        Self {
            bindings,
            plugins: HashMap::new(),
            pending: VecDeque::new(),
        }
    }

    /// Iterates `descriptors`; for each, loads the dynamic binding and looks
    /// up the kernel's bundled native implementation of that name in
    /// `factories`. A library that fails to load, or has no matching
    /// factory, is logged and skipped — already-instantiated plug-ins are
    /// retained, no all-or-nothing rollback (§4.5).
    pub fn instantiate(
        &mut self,
        descriptors: &[LibraryDescriptor],
        factories: &HashMap<String, SpawnPointFactory>,
        runtime_info: &RuntimeInfo,
        callbacks: &Callbacks,
    ) -> Vec<String> {
        let mut failed = Vec::new();
        for descriptor in descriptors {
            let Some(binding) = self.bindings.get_mut(&descriptor.name) else {
                failed.push(descriptor.name.clone());
                continue;
            };
            // Null is valid here: this category's `CreateInstance` takes no
            // extra arguments.
            if let Err(error) = unsafe { binding.instantiate(runtime_info, callbacks, std::ptr::null()) } {
                tracing::warn!(library = %descriptor.name, %error, "failed to instantiate spawn point");
                failed.push(descriptor.name.clone());
                continue;
            }
            match factories.get(descriptor.name.as_str()) {
                Some(factory) => {
                    self.plugins.insert(descriptor.name.clone(), factory());
                }
                None => {
                    tracing::warn!(library = %descriptor.name, "no bundled implementation registered for spawn point");
                    failed.push(descriptor.name.clone());
                }
            }
        }
        failed
    }

    /// Registers a natively compiled spawn point directly, bypassing the
    /// dynamic-load path entirely — how the kernel wires in its own bundled
    /// defaults rather than dlopen-ing itself.
    pub fn register_bundled(&mut self, name: impl Into<String>, plugin: Box<dyn SpawnPointPlugin>) {
        self.plugins.insert(name.into(), plugin);
    }

    pub fn trigger_pre_run_spawn_points(&mut self) {
        for plugin in self.plugins.values_mut() {
            self.pending.extend(plugin.trigger_pre_run());
        }
    }

    pub fn trigger_runtime_spawn_points(&mut self, time: TimeMs) {
        for plugin in self.plugins.values_mut() {
            self.pending.extend(plugin.trigger_runtime(time));
        }
    }

    /// Drains the queue the scheduler's spawning task consumes each tick.
    pub fn consume_new_agents(&mut self) -> Vec<NewAgentRequest> {
        self.pending.drain(..).collect()
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }
}
