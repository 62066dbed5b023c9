//! Dynamic plug-in binding layer (C1, §4.1).
//!
//! One [`binding::Binding`] owns a dynamic library handle plus zero-or-one
//! instantiated implementation. Every plug-in category shares the same
//! three C-linkage symbols (`OpenPASS_GetVersion`, `OpenPASS_CreateInstance`,
//! `OpenPASS_DestroyInstance`); category-specific crates (`op-world`,
//! `op-networks`, `op-model`) build typed wrappers on top of `Binding` using
//! their own extra `CreateInstance` arguments.

pub mod binding;
pub mod category;
pub mod error;
pub mod registry;


pub use binding::{Binding, Callbacks, RuntimeInfo};
pub use category::{Category, LibraryDescriptor};
pub use error::{PluginError, PluginResult};
pub use registry::BindingRegistry;
