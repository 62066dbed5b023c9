//! `DataStore`: the process-wide key/value bus (§4.9).

use std::collections::{HashMap, HashSet};

use op_core::{AgentId, TimeMs};

use crate::error::{DataStoreError, DataStoreResult};
use crate::key::is_under_prefix;
use crate::record::{AcyclicRecord, CyclicRecord, StaticRecord};
use crate::value::Value;

/// Insertion-ordered records for one key, plus a same-tick write guard.
struct Bucket<R> {
    records: Vec<R>,
    written: HashSet<(AgentId, TimeMs)>,
}

impl<R> Default for Bucket<R> {
    fn default() -> Self {
        Bucket {
            records: Vec::new(),
            written: HashSet::new(),
        }
    }
}

#[derive(Default)]
pub struct DataStore {
    cyclic: HashMap<String, Bucket<CyclicRecord>>,
    acyclic: HashMap<String, Bucket<AcyclicRecord>>,
    statics: HashMap<String, StaticRecord>,
    key_order: Vec<String>,
    seen_keys: HashSet<String>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn note_key(&mut self, key: &str) {
        if self.seen_keys.insert(key.to_string()) {
            self.key_order.push(key.to_string());
        }
    }

    pub fn put_cyclic(
        &mut self,
        time: TimeMs,
        agent: AgentId,
        key: impl Into<String>,
        value: Value,
    ) -> DataStoreResult<()> {
        let key = key.into();
        self.note_key(&key);
        let bucket = self.cyclic.entry(key.clone()).or_default();
        if !bucket.written.insert((agent, time)) {
            return Err(DataStoreError::DuplicateWrite { key, agent, time });
        }
        bucket.records.push(CyclicRecord { time, agent, value });
        Ok(())
    }

    pub fn put_acyclic(
        &mut self,
        time: TimeMs,
        agent: AgentId,
        key: impl Into<String>,
        value: Value,
    ) -> DataStoreResult<()> {
        let key = key.into();
        self.note_key(&key);
        let bucket = self.acyclic.entry(key.clone()).or_default();
        if !bucket.written.insert((agent, time)) {
            return Err(DataStoreError::DuplicateWrite { key, agent, time });
        }
        bucket.records.push(AcyclicRecord { time, agent, value });
        Ok(())
    }

    pub fn put_static(&mut self, key: impl Into<String>, value: Value, persist: bool) {
        let key = key.into();
        self.note_key(&key);
        let record = self.statics.entry(key).or_default();
        record.persist = persist;
        record.values.push(value);
    }

    /// Wildcard `time`/`agent` (`None`) match every record for `key`;
    /// results come back in insertion order.
    pub fn get_cyclic(
        &self,
        time: Option<TimeMs>,
        agent: Option<AgentId>,
        key: &str,
    ) -> impl Iterator<Item = &CyclicRecord> {
        self.cyclic.get(key).into_iter().flat_map(move |bucket| {
            bucket
                .records
                .iter()
                .filter(move |r| time.is_none_or(|t| t == r.time) && agent.is_none_or(|a| a == r.agent))
        })
    }

    pub fn get_acyclic(
        &self,
        time: Option<TimeMs>,
        agent: Option<AgentId>,
        key: &str,
    ) -> impl Iterator<Item = &AcyclicRecord> {
        self.acyclic.get(key).into_iter().flat_map(move |bucket| {
            bucket
                .records
                .iter()
                .filter(move |r| time.is_none_or(|t| t == r.time) && agent.is_none_or(|a| a == r.agent))
        })
    }

    pub fn get_static(&self, key: &str) -> Option<&StaticRecord> {
        self.statics.get(key)
    }

    pub fn get_keys(&self, prefix: &str) -> Vec<&str> {
        self.key_order
            .iter()
            .map(String::as_str)
            .filter(|k| is_under_prefix(k, prefix))
            .collect()
    }

    /// Drops cyclic and acyclic records and any non-`persist` static
    /// records.
    pub fn clear(&mut self) {
        self.cyclic.clear();
        self.acyclic.clear();
        self.statics.retain(|_, record| record.persist);

        self.seen_keys.clear();
        self.key_order.clear();
        for key in self.statics.keys() {
            self.seen_keys.insert(key.clone());
            self.key_order.push(key.clone());
        }
    }
}
