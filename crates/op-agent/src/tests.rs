use op_core::{LinkId, Signal, TimeMs, TimingConfig};
use op_model::{Model, NoopModel};

use crate::agent::GlobalData;
use crate::network::AgentNetwork;

/// Echoes whatever `DynamicsSignal` it last received straight back out,
/// one tick later, so tests can observe a publish cross a channel.
struct Echo {
    last: Option<Signal>,
}

const ECHO_IN: LinkId = LinkId(0);
const ECHO_OUT: LinkId = LinkId(1);

impl Model for Echo {
    fn update_input(&mut self, link: LinkId, signal: Signal, _time: TimeMs) {
        if link == ECHO_IN {
            self.last = Some(signal);
        }
    }

    fn trigger(&mut self, _time: TimeMs) {}

    fn update_output(&mut self, link: LinkId, _time: TimeMs) -> Option<Signal> {
        if link == ECHO_OUT {
            self.last.take()
        } else {
            None
        }
    }
}

/// Always publishes the same fixed `DynamicsSignal`.
struct Constant(Signal);

impl Model for Constant {
    fn update_input(&mut self, _link: LinkId, _signal: Signal, _time: TimeMs) {}
    fn trigger(&mut self, _time: TimeMs) {}
    fn update_output(&mut self, link: LinkId, _time: TimeMs) -> Option<Signal> {
        if link == ECHO_OUT {
            Some(self.0.clone())
        } else {
            None
        }
    }
}

fn dynamics(v: f64) -> Signal {
    Signal::Dynamics(op_core::DynamicsSignal { v, ..Default::default() })
}

#[cfg(test)]
mod graph {
    use super::*;
    use crate::graph::AgentGraph;

    #[test]
    fn value_crosses_channel_after_one_tick() {
        let mut graph = AgentGraph::new();
        let source = graph.add_component(TimingConfig::recurring(100), Box::new(Constant(dynamics(7.0))));
        let sink = graph.add_component(TimingConfig::recurring(100), Box::new(Echo { last: None }));
        graph.connect((source, ECHO_OUT), &[(sink, ECHO_IN)]).unwrap();

        // Tick 0: source publishes, but the channel has nothing current yet.
        graph.update_input(source, TimeMs(0));
        graph.trigger(source, TimeMs(0));
        graph.update_output(source, TimeMs(0)).unwrap();
        graph.update_input(sink, TimeMs(0));
        graph.trigger(sink, TimeMs(0));
        assert!(graph.update_output(sink, TimeMs(0)).unwrap().is_none());

        graph.advance_channels(TimeMs(0));

        // Tick 100: sink now sees the source's publish.
        graph.update_input(source, TimeMs(100));
        graph.trigger(source, TimeMs(100));
        graph.update_output(source, TimeMs(100)).unwrap();
        graph.update_input(sink, TimeMs(100));
        graph.trigger(sink, TimeMs(100));
        let out = graph.update_output(sink, TimeMs(100)).unwrap().unwrap();
        assert_eq!(out.as_dynamics().unwrap().v, 7.0);
    }

    #[test]
    fn response_time_delays_visibility() {
        let mut graph = AgentGraph::new();
        let mut timing = TimingConfig::recurring(100);
        timing.response_time_ms = 250;
        let source = graph.add_component(timing, Box::new(Constant(dynamics(1.0))));
        let sink = graph.add_component(TimingConfig::recurring(100), Box::new(Echo { last: None }));
        graph.connect((source, ECHO_OUT), &[(sink, ECHO_IN)]).unwrap();

        graph.trigger(source, TimeMs(0));
        graph.update_output(source, TimeMs(0)).unwrap();

        // Publish is due at t=250; at t=200 it must still be invisible.
        graph.advance_channels(TimeMs(200));
        graph.update_input(sink, TimeMs(200));
        graph.trigger(sink, TimeMs(200));
        assert!(graph.update_output(sink, TimeMs(200)).unwrap().is_none());

        // Past t=250 the publish becomes the channel's current value.
        graph.advance_channels(TimeMs(300));
        graph.update_input(sink, TimeMs(300));
        graph.trigger(sink, TimeMs(300));
        let out = graph.update_output(sink, TimeMs(300)).unwrap().unwrap();
        assert_eq!(out.as_dynamics().unwrap().v, 1.0);
    }

    #[test]
    fn connecting_same_input_twice_is_an_error() {
        let mut graph = AgentGraph::new();
        let a = graph.add_component(TimingConfig::recurring(100), Box::new(Constant(dynamics(1.0))));
        let b = graph.add_component(TimingConfig::recurring(100), Box::new(Constant(dynamics(2.0))));
        let sink = graph.add_component(TimingConfig::recurring(100), Box::new(NoopModel));
        graph.connect((a, ECHO_OUT), &[(sink, ECHO_IN)]).unwrap();
        let err = graph.connect((b, ECHO_OUT), &[(sink, ECHO_IN)]).unwrap_err();
        assert!(matches!(err, crate::error::AgentError::InputAlreadyConnected(_, _)));
    }
}

#[cfg(test)]
mod network {
    use super::*;
    use op_core::AgentId;

    #[test]
    fn duplicate_add_agent_fails() {
        let mut net = AgentNetwork::new(42);
        net.add_agent(AgentId(0), TimeMs(0)).unwrap();
        let err = net.add_agent(AgentId(0), TimeMs(100)).unwrap_err();
        assert!(matches!(err, crate::error::AgentError::DuplicateAgent(_)));
    }

    #[test]
    fn queued_update_applies_during_sync() {
        let mut net = AgentNetwork::new(1);
        net.add_agent(AgentId(0), TimeMs(0)).unwrap();
        net.queue_agent_update(AgentId(0), |agent| {
            agent.set_global_data(GlobalData { velocity: 12.5, ..Default::default() });
        });
        net.sync_global_data(|_| true);
        assert_eq!(net.agent(AgentId(0)).unwrap().global_data().velocity, 12.5);
    }

    #[test]
    fn queued_remove_is_retained_not_deleted() {
        let mut net = AgentNetwork::new(1);
        net.add_agent(AgentId(0), TimeMs(0)).unwrap();
        net.queue_agent_remove(AgentId(0));
        net.sync_global_data(|_| true);

        assert!(net.agent(AgentId(0)).is_none(), "removed agents drop out of id lookup");
        assert_eq!(net.agent_count(), 1, "but the slot itself is retained");
        assert_eq!(net.live_agents().count(), 0);
    }

    #[test]
    fn failed_localization_marks_invalid_not_removed() {
        let mut net = AgentNetwork::new(1);
        net.add_agent(AgentId(0), TimeMs(0)).unwrap();
        net.sync_global_data(|_| false);
        assert_eq!(net.agent(AgentId(0)).unwrap().status(), crate::agent::AgentStatus::Invalid);
        assert_eq!(net.live_agents().count(), 0);
    }

    #[test]
    fn update_and_removal_for_same_tick_do_not_panic() {
        let mut net = AgentNetwork::new(1);
        net.add_agent(AgentId(0), TimeMs(0)).unwrap();
        net.queue_agent_update(AgentId(0), |agent| {
            agent.set_global_data(GlobalData { velocity: 9.0, ..Default::default() });
        });
        net.queue_agent_remove(AgentId(0));
        net.sync_global_data(|_| true);
        // The update applies to the retained slot before removal flips its
        // status, even though the id no longer resolves afterward.
        assert!(net.agent(AgentId(0)).is_none());
        assert_eq!(net.agent_count(), 1);
    }

    #[test]
    fn publish_global_data_visits_only_live_agents() {
        let mut net = AgentNetwork::new(1);
        net.add_agent(AgentId(0), TimeMs(0)).unwrap();
        net.add_agent(AgentId(1), TimeMs(0)).unwrap();
        net.queue_agent_remove(AgentId(1));
        net.sync_global_data(|_| true);

        let mut seen = Vec::new();
        net.publish_global_data(|id, _data| seen.push(id));
        assert_eq!(seen, vec![AgentId(0)]);
    }

    #[test]
    fn global_seed_is_reproducible_for_a_given_agent() {
        let net = AgentNetwork::new(7);
        assert_eq!(net.global_seed(), 7);
    }
}
