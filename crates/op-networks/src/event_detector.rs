//! Event-detector network (§4.5 + §4.6) — wraps bindings the same way
//! [`crate::spawn::SpawnNetwork`] and [`crate::observation::ObservationNetwork`]
//! do, but hands its instantiated plug-ins straight to
//! `op_eventnet::EventNetwork::run_detectors` rather than defining a second
//! detector trait.

use std::collections::HashMap;

use op_core::TimeMs;
use op_eventnet::{EventDetector, EventNetwork};
use op_plugin::{Binding, Callbacks, LibraryDescriptor, RuntimeInfo};

pub type EventDetectorFactory = fn() -> Box<dyn EventDetector>;

pub struct EventDetectorNetwork {
    bindings: HashMap<String, Binding>,
    plugins: Vec<Box<dyn EventDetector>>,
}

impl EventDetectorNetwork {
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
        factories: &HashMap<String, EventDetectorFactory>,
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
                tracing::warn!(library = %descriptor.name, %error, "failed to instantiate event detector");
                failed.push(descriptor.name.clone());
                continue;
            }
            match factories.get(descriptor.name.as_str()) {
                Some(factory) => self.plugins.push(factory()),
                None => {
                    tracing::warn!(library = %descriptor.name, "no bundled implementation registered for event detector");
                    failed.push(descriptor.name.clone());
                }
            }
        }
        failed
    }

    /// Registers a natively compiled event detector directly, bypassing the
    /// dynamic-load path.
    pub fn register_bundled(&mut self, plugin: Box<dyn EventDetector>) {
        self.plugins.push(plugin);
    }

    pub fn trigger(&mut self, time: TimeMs, events: &mut EventNetwork) {
        events.run_detectors(time, &mut self.plugins);
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }
}
