//! `DataStoreBackend` — the surface a bound data-store implementation
//! would need to satisfy to stand in for the in-kernel default (the
//! original implementation's `dataStoreLibrary.h` binds the whole store
//! itself, the same way `op-plugin` binds a spawn point or an observation
//! plug-in). [`DataStore`] is the only backend shipped; this trait exists
//! so a future dynamically loaded store could be swapped in without
//! touching any caller that only depends on the trait.
//!
//! Unlike [`DataStore`]'s own inherent `get_cyclic`/`get_acyclic`, which
//! return a borrowing `impl Iterator` for zero-cost reads, this trait's
//! methods return owned `Vec`s — a trait object (`Box<dyn
//! DataStoreBackend>`) can't name a borrowed `impl Iterator` return type,
//! so every in-kernel caller keeps using [`DataStore`] directly and only
//! reaches for this trait at a binding boundary.

use op_core::{AgentId, TimeMs};

use crate::error::DataStoreResult;
use crate::record::{AcyclicRecord, CyclicRecord, StaticRecord};
use crate::store::DataStore;
use crate::value::Value;

pub trait DataStoreBackend: Send {
    fn put_cyclic(&mut self, time: TimeMs, agent: AgentId, key: &str, value: Value) -> DataStoreResult<()>;
    fn put_acyclic(&mut self, time: TimeMs, agent: AgentId, key: &str, value: Value) -> DataStoreResult<()>;
    fn put_static(&mut self, key: &str, value: Value, persist: bool);
    fn get_cyclic(&self, time: Option<TimeMs>, agent: Option<AgentId>, key: &str) -> Vec<CyclicRecord>;
    fn get_acyclic(&self, time: Option<TimeMs>, agent: Option<AgentId>, key: &str) -> Vec<AcyclicRecord>;
    fn get_static(&self, key: &str) -> Option<StaticRecord>;
    fn get_keys(&self, prefix: &str) -> Vec<String>;
    fn clear(&mut self);
}

impl DataStoreBackend for DataStore {
    fn put_cyclic(&mut self, time: TimeMs, agent: AgentId, key: &str, value: Value) -> DataStoreResult<()> {
        DataStore::put_cyclic(self, time, agent, key.to_string(), value)
    }

    fn put_acyclic(&mut self, time: TimeMs, agent: AgentId, key: &str, value: Value) -> DataStoreResult<()> {
        DataStore::put_acyclic(self, time, agent, key.to_string(), value)
    }

    fn put_static(&mut self, key: &str, value: Value, persist: bool) {
        DataStore::put_static(self, key.to_string(), value, persist)
    }

    fn get_cyclic(&self, time: Option<TimeMs>, agent: Option<AgentId>, key: &str) -> Vec<CyclicRecord> {
        DataStore::get_cyclic(self, time, agent, key).cloned().collect()
    }

    fn get_acyclic(&self, time: Option<TimeMs>, agent: Option<AgentId>, key: &str) -> Vec<AcyclicRecord> {
        DataStore::get_acyclic(self, time, agent, key).cloned().collect()
    }

    fn get_static(&self, key: &str) -> Option<StaticRecord> {
        DataStore::get_static(self, key).cloned()
    }

    fn get_keys(&self, prefix: &str) -> Vec<String> {
        DataStore::get_keys(self, prefix).into_iter().map(str::to_string).collect()
    }

    fn clear(&mut self) {
        DataStore::clear(self)
    }
}
