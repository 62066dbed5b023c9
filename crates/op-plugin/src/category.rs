//! Plug-in categories (§4.1, §6): every category shares the same three
//! C-linkage symbols; only the extra `CreateInstance` arguments and the
//! resulting implementation's method set differ per category.

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    World,
    Stochastics,
    Observation,
    Spawn,
    EventDetector,
    Manipulator,
    DataStore,
    Model,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::World => "World",
            Category::Stochastics => "Stochastics",
            Category::Observation => "Observation",
            Category::Spawn => "SpawnPoint",
            Category::EventDetector => "EventDetector",
            Category::Manipulator => "Manipulator",
            Category::DataStore => "DataStore",
            Category::Model => "Model",
        };
        write!(f, "{s}")
    }
}

/// A named library entry from configuration (§6: "libraries (per-category
/// name lists)").
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LibraryDescriptor {
    pub name: String,
    pub path: String,
    pub category: Category,
}
