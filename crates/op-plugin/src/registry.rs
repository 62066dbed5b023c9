//! A name-keyed collection of bindings, one per configured library. Used by
//! `op-networks` to resolve the library descriptors named in scenario
//! configuration (§4.5: "looks up the matching binding").

use std::collections::HashMap;

use crate::binding::Binding;
use crate::category::LibraryDescriptor;
use crate::error::{PluginError, PluginResult};

pub struct BindingRegistry {
    bindings: HashMap<String, Binding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn from_descriptors(descriptors: &[LibraryDescriptor]) -> Self {
        let mut bindings = HashMap::with_capacity(descriptors.len());
        for d in descriptors {
            bindings.insert(d.name.clone(), Binding::new(d.path.clone()));
        }
        Self { bindings }
    }

    pub fn get_mut(&mut self, name: &str) -> PluginResult<&mut Binding> {
        self.bindings
            .get_mut(name)
            .ok_or_else(|| PluginError::NotInstantiated {
                path: name.to_string(),
            })
    }

    pub fn unload_all(&mut self) -> PluginResult<()> {
        for binding in self.bindings.values_mut() {
            binding.unload()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for BindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
