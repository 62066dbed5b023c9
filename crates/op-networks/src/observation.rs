//! Observation network (§4.5) — "the exemplar" for the hook sequence every
//! category follows: `SlavePreHook` once before any invocation,
//! `SlavePreRunHook` at the start of each invocation, `SlaveUpdateHook`
//! every tick, `SlavePostRunHook` at invocation end, `SlavePostHook` once
//! after all invocations.

use std::collections::HashMap;

use op_core::TimeMs;
use op_datastore::DataStore;
use op_plugin::{Binding, Callbacks, LibraryDescriptor, RuntimeInfo};

use crate::error::{NetworksError, NetworksResult};

/// An Observation plug-in reads out of the shared [`DataStore`] at each hook
/// point and does whatever it wants with what it finds there (write rows to
/// a file, aggregate statistics, ...). The kernel never interprets the
/// return value beyond success/failure.
pub trait ObservationPlugin: Send {
    fn slave_pre_hook(&mut self) -> bool;
    fn slave_pre_run_hook(&mut self) -> bool;
    fn slave_update_hook(&mut self, time: TimeMs, store: &DataStore) -> bool;
    fn slave_post_run_hook(&mut self, store: &DataStore) -> bool;
    fn slave_post_hook(&mut self) -> bool;
}

pub type ObservationFactory = fn() -> Box<dyn ObservationPlugin>;

pub struct ObservationNetwork {
    bindings: HashMap<String, Binding>,
    plugins: Vec<(String, Box<dyn ObservationPlugin>)>,
}

impl ObservationNetwork {
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
        factories: &HashMap<String, ObservationFactory>,
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
                tracing::warn!(library = %descriptor.name, %error, "failed to instantiate observation plug-in");
                failed.push(descriptor.name.clone());
                continue;
            }
            match factories.get(descriptor.name.as_str()) {
                Some(factory) => self.plugins.push((descriptor.name.clone(), factory())),
                None => {
                    tracing::warn!(library = %descriptor.name, "no bundled implementation registered for observation");
                    failed.push(descriptor.name.clone());
                }
            }
        }
        failed
    }

    /// Registers a natively compiled observation plug-in directly, bypassing
    /// the dynamic-load path (how `op-observation-csv`, the kernel's bundled
    /// default, gets wired in).
    pub fn register_bundled(&mut self, name: impl Into<String>, plugin: Box<dyn ObservationPlugin>) {
        self.plugins.push((name.into(), plugin));
    }

    fn run_hook(&mut self, hook: &'static str, mut call: impl FnMut(&mut dyn ObservationPlugin) -> bool) -> NetworksResult<()> {
        for (name, plugin) in &mut self.plugins {
            if !call(plugin.as_mut()) {
                return Err(NetworksError::HookFailed {
                    library: name.clone(),
                    hook,
                });
            }
        }
        Ok(())
    }

    pub fn slave_pre_hook(&mut self) -> NetworksResult<()> {
        self.run_hook("SlavePreHook", |p| p.slave_pre_hook())
    }

    pub fn slave_pre_run_hook(&mut self) -> NetworksResult<()> {
        self.run_hook("SlavePreRunHook", |p| p.slave_pre_run_hook())
    }

    pub fn slave_update_hook(&mut self, time: TimeMs, store: &DataStore) -> NetworksResult<()> {
        self.run_hook("SlaveUpdateHook", |p| p.slave_update_hook(time, store))
    }

    pub fn slave_post_run_hook(&mut self, store: &DataStore) -> NetworksResult<()> {
        self.run_hook("SlavePostRunHook", |p| p.slave_post_run_hook(store))
    }

    pub fn slave_post_hook(&mut self) -> NetworksResult<()> {
        self.run_hook("SlavePostHook", |p| p.slave_post_hook())
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }
}
