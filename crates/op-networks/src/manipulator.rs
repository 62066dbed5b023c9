//! Manipulator network (§4.5 + §4.6) — wraps bindings the same way
//! [`crate::event_detector::EventDetectorNetwork`] does, handing its
//! instantiated plug-ins straight to `op_eventnet::EventNetwork::
//! run_manipulators` rather than defining a second manipulator trait.

use std::collections::HashMap;

use op_core::{AgentId, TimeMs};
use op_eventnet::{EventNetwork, Manipulator, Mutation};
use op_plugin::{Binding, Callbacks, LibraryDescriptor, RuntimeInfo};

pub type ManipulatorFactory = fn() -> Box<dyn Manipulator>;

pub struct ManipulatorNetwork {
    bindings: HashMap<String, Binding>,
    plugins: Vec<Box<dyn Manipulator>>,
}

impl ManipulatorNetwork {
    pub fn new(descriptors: &[LibraryDescriptor]) -> Self {
        let bindings = descriptors
            .iter()
            .map(|d| (d.name.clone(), Binding::new(d.path.clone())))
            .collect();
        Self {
            bindings,
            plugins: Vec::new(),
        }
    }

    pub fn instantiate(
        &mut self,
        descriptors: &[LibraryDescriptor],
        factories: &HashMap<String, ManipulatorFactory>,
        runtime_info: &RuntimeInfo,
        callbacks: &Callbacks,
    ) -> Vec<String> {
        let mut failed = Vec::new();
        for descriptor in descriptors {
            let Some(binding) = self.bindings.get_mut(&descriptor.name) else {
                failed.push(descriptor.name.clone());
                continue;
            };
            if let Err(error) = unsafe { binding.instantiate(runtime_info, callbacks, std::ptr::null()) } {
                tracing::warn!(library = %descriptor.name, %error, "failed to instantiate manipulator");
                failed.push(descriptor.name.clone());
                continue;
            }
            match factories.get(descriptor.name.as_str()) {
                Some(factory) => self.plugins.push(factory()),
                None => {
                    tracing::warn!(library = %descriptor.name, "no bundled implementation registered for manipulator");
                    failed.push(descriptor.name.clone());
                }
            }
        }
        failed
    }

    /// Registers a natively compiled manipulator directly, bypassing the
    /// dynamic-load path.
    pub fn register_bundled(&mut self, plugin: Box<dyn Manipulator>) {
        self.plugins.push(plugin);
    }

    pub fn trigger(&mut self, time: TimeMs, events: &mut EventNetwork) -> Vec<(AgentId, Mutation)> {
        events.run_manipulators(time, &mut self.plugins)
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }
}
