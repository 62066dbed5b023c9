use std::ffi::c_char;

use op_core::{LaneId, RoadId, TimeMs};
use op_datastore::DataStore;
use op_plugin::{Callbacks, Category, LibraryDescriptor, RuntimeInfo};

use crate::event_detector::EventDetectorNetwork;
use crate::manipulator::ManipulatorNetwork;
use crate::observation::{ObservationNetwork, ObservationPlugin};
use crate::spawn::{NewAgentRequest, SpawnNetwork, SpawnPointPlugin};

extern "C" fn noop_log(_: *const c_char) {}

fn descriptor(name: &str, category: Category) -> LibraryDescriptor {
    LibraryDescriptor {
        name: name.to_string(),
        path: "/nonexistent/libfoo.so".to_string(),
        category,
    }
}

mod spawn_points {
    use super::*;

    struct FixedSpawner {
        pre_run: Vec<NewAgentRequest>,
        at_time: TimeMs,
    }

    impl SpawnPointPlugin for FixedSpawner {
        fn trigger_pre_run(&mut self) -> Vec<NewAgentRequest> {
            std::mem::take(&mut self.pre_run)
        }

        fn trigger_runtime(&mut self, time: TimeMs) -> Vec<NewAgentRequest> {
            if time == self.at_time {
                vec![NewAgentRequest {
                    road: RoadId(0),
                    lane: LaneId(0),
                    s: 0.0,
                    t: 0.0,
                    agent_profile: "car".to_string(),
                }]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn trigger_pre_run_then_runtime_feed_the_consume_queue() {
        let mut net = SpawnNetwork::new(&[]);
        net.register_bundled(
            "basic",
            Box::new(FixedSpawner {
                pre_run: vec![NewAgentRequest {
                    road: RoadId(1),
                    lane: LaneId(2),
                    s: 10.0,
                    t: 0.0,
                    agent_profile: "truck".to_string(),
                }],
                at_time: TimeMs(500),
            }),
        );

        net.trigger_pre_run_spawn_points();
        net.trigger_runtime_spawn_points(TimeMs(100));
        net.trigger_runtime_spawn_points(TimeMs(500));

        let consumed = net.consume_new_agents();
        assert_eq!(consumed.len(), 2);
        assert_eq!(consumed[0].agent_profile, "truck");
        assert_eq!(consumed[1].agent_profile, "car");
        assert!(net.consume_new_agents().is_empty());
    }

    #[test]
    fn instantiate_logs_and_skips_unresolvable_descriptors() {
        let descriptors = vec![descriptor("spawnpoint_basic", Category::Spawn)];
        let mut net = SpawnNetwork::new(&descriptors);
        let runtime_info = RuntimeInfo { kernel_version: 1 };
        let callbacks = Callbacks { log: noop_log };

        let factories = std::collections::HashMap::new();
        let failed = net.instantiate(&descriptors, &factories, &runtime_info, &callbacks);
        assert_eq!(failed, vec!["spawnpoint_basic".to_string()]);
        assert_eq!(net.plugin_count(), 0);
    }
}

mod observation {
    use super::*;

    struct RecordingObserver {
        calls: Vec<&'static str>,
        fail_on: Option<&'static str>,
    }

    impl ObservationPlugin for RecordingObserver {
        fn slave_pre_hook(&mut self) -> bool {
            self.calls.push("pre");
            self.fail_on != Some("pre")
        }
        fn slave_pre_run_hook(&mut self) -> bool {
            self.calls.push("pre_run");
            self.fail_on != Some("pre_run")
        }
        fn slave_update_hook(&mut self, _time: TimeMs, _store: &DataStore) -> bool {
            self.calls.push("update");
            self.fail_on != Some("update")
        }
        fn slave_post_run_hook(&mut self, _store: &DataStore) -> bool {
            self.calls.push("post_run");
            self.fail_on != Some("post_run")
        }
        fn slave_post_hook(&mut self) -> bool {
            self.calls.push("post");
            self.fail_on != Some("post")
        }
    }

    #[test]
    fn hook_sequence_runs_across_all_plugins() {
        let mut net = ObservationNetwork::new(&[]);
        net.register_bundled("csv", Box::new(RecordingObserver { calls: Vec::new(), fail_on: None }));
        let store = DataStore::new();

        net.slave_pre_hook().unwrap();
        net.slave_pre_run_hook().unwrap();
        net.slave_update_hook(TimeMs(100), &store).unwrap();
        net.slave_post_run_hook(&store).unwrap();
        net.slave_post_hook().unwrap();
    }

    #[test]
    fn a_failing_hook_aborts_and_is_attributed_to_the_plugin() {
        let mut net = ObservationNetwork::new(&[]);
        net.register_bundled(
            "flaky",
            Box::new(RecordingObserver { calls: Vec::new(), fail_on: Some("update") }),
        );
        let store = DataStore::new();

        assert!(net.slave_pre_hook().is_ok());
        let err = net.slave_update_hook(TimeMs(100), &store).unwrap_err();
        assert_eq!(err.to_string(), "hook failed for plug-in flaky: SlaveUpdateHook");
    }
}

mod event_detectors {
    use super::*;
    use op_eventnet::{Event, EventDetector, EventNetwork, EventPayload};

    struct AlwaysPosts;

    impl EventDetector for AlwaysPosts {
        fn trigger(&mut self, time: TimeMs, network: &mut EventNetwork) {
            network.post(time, "detector", "Heartbeat", vec![], vec![], EventPayload::Empty, false);
        }
    }

    #[test]
    fn trigger_forwards_to_the_shared_event_network() {
        let mut net = EventDetectorNetwork::new(&[]);
        net.register_bundled(Box::new(AlwaysPosts));

        let mut events = EventNetwork::new();
        net.trigger(TimeMs(50), &mut events);

        let posted: Vec<&Event> = events.events_of_kind("Heartbeat");
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].time, TimeMs(50));
    }
}

mod manipulators {
    use super::*;
    use op_core::{AgentId, ComponentId, ComponentState};
    use op_eventnet::{Event, EventNetwork, EventPayload, Manipulator, Mutation};

    struct DisableOnHeartbeat;

    impl Manipulator for DisableOnHeartbeat {
        fn subscribed_kinds(&self) -> Vec<&'static str> {
            vec!["Heartbeat"]
        }

        fn trigger(
            &mut self,
            _time: TimeMs,
            matching: &[Event],
            _network: &mut EventNetwork,
        ) -> Vec<(AgentId, Mutation)> {
            matching
                .iter()
                .flat_map(|e| e.acting_agents.iter())
                .map(|&agent| (agent, Mutation::SetComponentState(ComponentId(0), ComponentState::Disabled)))
                .collect()
        }
    }

    #[test]
    fn trigger_forwards_to_the_shared_event_network() {
        let mut events = EventNetwork::new();
        events.post(TimeMs(50), "detector", "Heartbeat", vec![AgentId(7)], vec![], EventPayload::Empty, false);

        let mut net = ManipulatorNetwork::new(&[]);
        net.register_bundled(Box::new(DisableOnHeartbeat));

        let mutations = net.trigger(TimeMs(50), &mut events);
        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].0, AgentId(7));
    }
}
