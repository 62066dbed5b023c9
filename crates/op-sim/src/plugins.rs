//! Per-category plug-in sources: the named library descriptors an
//! invocation dynamically loads, their matching bundled-native factories,
//! and the kernel's own compiled-in defaults (§4.5, §6 "libraries
//! (per-category name lists)").

use std::collections::HashMap;

use op_eventnet::{EventDetector, Manipulator};
use op_networks::{EventDetectorFactory, ManipulatorFactory, SpawnPointFactory, SpawnPointPlugin};
use op_plugin::LibraryDescriptor;

/// Builds one fresh bundled plug-in instance. Spawn/event-detector/
/// manipulator networks are rebuilt every invocation (§4.8 step 3:
/// "instantiate spawn-point network; initialize event network with a fresh
/// RunResult"), so the kernel's own defaults are stored as makers rather
/// than as already-built instances.
pub type Maker<T> = Box<dyn Fn() -> Box<T> + Send + Sync>;

#[derive(Default)]
pub struct SpawnSource {
    pub descriptors: Vec<LibraryDescriptor>,
    pub factories: HashMap<String, SpawnPointFactory>,
    pub bundled: Vec<(String, Maker<dyn SpawnPointPlugin>)>,
}

#[derive(Default)]
pub struct EventDetectorSource {
    pub descriptors: Vec<LibraryDescriptor>,
    pub factories: HashMap<String, EventDetectorFactory>,
    pub bundled: Vec<Maker<dyn EventDetector>>,
}

#[derive(Default)]
pub struct ManipulatorSource {
    pub descriptors: Vec<LibraryDescriptor>,
    pub factories: HashMap<String, ManipulatorFactory>,
    pub bundled: Vec<Maker<dyn Manipulator>>,
}
