use op_core::{AgentId, TimeMs};

use crate::backend::DataStoreBackend;
use crate::error::DataStoreError;
use crate::store::DataStore;
use crate::value::Value;

fn agent(id: u64) -> AgentId {
    AgentId(id)
}

mod cyclic {
    use super::*;

    #[test]
    fn put_then_get_with_exact_coordinates() {
        let mut store = DataStore::new();
        store
            .put_cyclic(TimeMs(100), agent(1), "Agent.Position", Value::Float(1.5))
            .unwrap();

        let got: Vec<_> = store
            .get_cyclic(Some(TimeMs(100)), Some(agent(1)), "Agent.Position")
            .collect();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].value, Value::Float(1.5));
    }

    #[test]
    fn wildcard_time_returns_every_tick_in_insertion_order() {
        let mut store = DataStore::new();
        store
            .put_cyclic(TimeMs(0), agent(1), "Agent.Position", Value::Float(0.0))
            .unwrap();
        store
            .put_cyclic(TimeMs(100), agent(1), "Agent.Position", Value::Float(1.0))
            .unwrap();
        store
            .put_cyclic(TimeMs(200), agent(1), "Agent.Position", Value::Float(2.0))
            .unwrap();

        let got: Vec<_> = store
            .get_cyclic(None, Some(agent(1)), "Agent.Position")
            .map(|r| r.time)
            .collect();
        assert_eq!(got, vec![TimeMs(0), TimeMs(100), TimeMs(200)]);
    }

    #[test]
    fn wildcard_agent_returns_every_agent_at_that_tick() {
        let mut store = DataStore::new();
        store
            .put_cyclic(TimeMs(100), agent(1), "Agent.Position", Value::Float(1.0))
            .unwrap();
        store
            .put_cyclic(TimeMs(100), agent(2), "Agent.Position", Value::Float(2.0))
            .unwrap();

        let got: Vec<_> = store
            .get_cyclic(Some(TimeMs(100)), None, "Agent.Position")
            .map(|r| r.agent)
            .collect();
        assert_eq!(got, vec![agent(1), agent(2)]);
    }

    #[test]
    fn a_second_write_to_the_same_key_agent_time_is_rejected() {
        let mut store = DataStore::new();
        store
            .put_cyclic(TimeMs(100), agent(1), "Agent.Position", Value::Float(1.0))
            .unwrap();

        let err = store
            .put_cyclic(TimeMs(100), agent(1), "Agent.Position", Value::Float(2.0))
            .unwrap_err();
        assert!(matches!(err, DataStoreError::DuplicateWrite { .. }));
    }

    #[test]
    fn clear_drops_all_cyclic_records() {
        let mut store = DataStore::new();
        store
            .put_cyclic(TimeMs(100), agent(1), "Agent.Position", Value::Float(1.0))
            .unwrap();
        store.clear();

        assert_eq!(store.get_cyclic(None, None, "Agent.Position").count(), 0);
    }
}

mod acyclic {
    use super::*;

    #[test]
    fn sparse_records_are_retrievable_by_exact_tick() {
        let mut store = DataStore::new();
        store
            .put_acyclic(TimeMs(450), agent(3), "Collision", Value::Text("rear-end".into()))
            .unwrap();

        let got: Vec<_> = store
            .get_acyclic(Some(TimeMs(450)), Some(agent(3)), "Collision")
            .collect();
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn a_second_write_to_the_same_key_agent_time_is_rejected() {
        let mut store = DataStore::new();
        store
            .put_acyclic(TimeMs(450), agent(3), "Collision", Value::Bool(true))
            .unwrap();

        let err = store
            .put_acyclic(TimeMs(450), agent(3), "Collision", Value::Bool(false))
            .unwrap_err();
        assert!(matches!(err, DataStoreError::DuplicateWrite { .. }));
    }
}

mod statics {
    use super::*;

    #[test]
    fn put_static_accumulates_values_under_one_key() {
        let mut store = DataStore::new();
        store.put_static("Road.Count", Value::Int(3), false);
        store.put_static("Road.Count", Value::Int(4), false);

        let record = store.get_static("Road.Count").unwrap();
        assert_eq!(record.values, vec![Value::Int(3), Value::Int(4)]);
    }

    #[test]
    fn clear_drops_non_persistent_statics_but_keeps_persistent_ones() {
        let mut store = DataStore::new();
        store.put_static("RunConfig.Seed", Value::Int(42), true);
        store.put_static("Scratch.Counter", Value::Int(0), false);

        store.clear();

        assert!(store.get_static("RunConfig.Seed").is_some());
        assert!(store.get_static("Scratch.Counter").is_none());
    }
}

mod keys {
    use super::*;

    #[test]
    fn get_keys_returns_matches_in_first_seen_order_with_boundary_matching() {
        let mut store = DataStore::new();
        store
            .put_cyclic(TimeMs(0), agent(3), "Agent.3.Position", Value::Float(0.0))
            .unwrap();
        store
            .put_cyclic(TimeMs(0), agent(30), "Agent.30.Position", Value::Float(0.0))
            .unwrap();
        store
            .put_cyclic(TimeMs(0), agent(3), "Agent.3.Velocity", Value::Float(0.0))
            .unwrap();

        let keys = store.get_keys("Agent.3");
        assert_eq!(keys, vec!["Agent.3.Position", "Agent.3.Velocity"]);
    }

    #[test]
    fn clear_rebuilds_key_order_from_surviving_persistent_statics() {
        let mut store = DataStore::new();
        store
            .put_cyclic(TimeMs(0), agent(1), "Agent.Position", Value::Float(0.0))
            .unwrap();
        store.put_static("RunConfig.Seed", Value::Int(42), true);

        store.clear();

        assert_eq!(store.get_keys(""), vec!["RunConfig.Seed"]);
    }
}

mod backend {
    use super::*;

    fn as_backend(store: &mut DataStore) -> &mut dyn DataStoreBackend {
        store
    }

    #[test]
    fn put_and_get_cyclic_round_trip_through_the_trait() {
        let mut store = DataStore::new();
        let backend = as_backend(&mut store);
        backend
            .put_cyclic(TimeMs(100), agent(1), "Agent.Position", Value::Float(1.5))
            .unwrap();

        let got = backend.get_cyclic(Some(TimeMs(100)), Some(agent(1)), "Agent.Position");
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].value, Value::Float(1.5));
    }

    #[test]
    fn put_and_get_acyclic_round_trip_through_the_trait() {
        let mut store = DataStore::new();
        let backend = as_backend(&mut store);
        backend
            .put_acyclic(TimeMs(450), agent(3), "Collision", Value::Text("rear-end".into()))
            .unwrap();

        let got = backend.get_acyclic(Some(TimeMs(450)), Some(agent(3)), "Collision");
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].value, Value::Text("rear-end".into()));
    }

    #[test]
    fn a_duplicate_cyclic_write_is_rejected_through_the_trait_too() {
        let mut store = DataStore::new();
        let backend = as_backend(&mut store);
        backend
            .put_cyclic(TimeMs(100), agent(1), "Agent.Position", Value::Float(1.0))
            .unwrap();

        let err = backend
            .put_cyclic(TimeMs(100), agent(1), "Agent.Position", Value::Float(2.0))
            .unwrap_err();
        assert!(matches!(err, DataStoreError::DuplicateWrite { .. }));
    }

    #[test]
    fn get_static_returns_an_owned_record() {
        let mut store = DataStore::new();
        let backend = as_backend(&mut store);
        backend.put_static("Road.Count", Value::Int(3), false);
        backend.put_static("Road.Count", Value::Int(4), false);

        let record = backend.get_static("Road.Count").unwrap();
        assert_eq!(record.values, vec![Value::Int(3), Value::Int(4)]);
        assert!(backend.get_static("Road.Missing").is_none());
    }

    #[test]
    fn get_keys_returns_owned_strings_in_first_seen_order() {
        let mut store = DataStore::new();
        let backend = as_backend(&mut store);
        backend
            .put_cyclic(TimeMs(0), agent(3), "Agent.3.Position", Value::Float(0.0))
            .unwrap();
        backend
            .put_cyclic(TimeMs(0), agent(3), "Agent.3.Velocity", Value::Float(0.0))
            .unwrap();

        let keys: Vec<String> = backend.get_keys("Agent.3");
        assert_eq!(keys, vec!["Agent.3.Position".to_string(), "Agent.3.Velocity".to_string()]);
    }

    #[test]
    fn clear_through_the_trait_keeps_persistent_statics() {
        let mut store = DataStore::new();
        let backend = as_backend(&mut store);
        backend
            .put_cyclic(TimeMs(0), agent(1), "Agent.Position", Value::Float(0.0))
            .unwrap();
        backend.put_static("RunConfig.Seed", Value::Int(42), true);

        backend.clear();

        assert_eq!(backend.get_cyclic(None, None, "Agent.Position").len(), 0);
        assert!(backend.get_static("RunConfig.Seed").is_some());
    }

    #[test]
    fn a_boxed_trait_object_works_identically() {
        let mut boxed: Box<dyn DataStoreBackend> = Box::new(DataStore::new());
        boxed
            .put_cyclic(TimeMs(10), agent(9), "Agent.Position", Value::Float(9.0))
            .unwrap();

        let got = boxed.get_cyclic(Some(TimeMs(10)), Some(agent(9)), "Agent.Position");
        assert_eq!(got[0].value, Value::Float(9.0));
    }
}
