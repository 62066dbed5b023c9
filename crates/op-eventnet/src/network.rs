use op_core::{AgentId, EventId, TimeMs};

use crate::event::{Event, EventPayload};
use crate::mutation::Mutation;

/// Reads world/agent state and posts events. `Trigger(time)` in spec
/// terms.
pub trait EventDetector: Send {
    fn trigger(&mut self, time: TimeMs, network: &mut EventNetwork);
}

/// Subscribes to event kinds and, when matching events are active, queues
/// mutations (or posts events of its own, via `network`).
pub trait Manipulator: Send {
    fn subscribed_kinds(&self) -> Vec<&'static str>;

    fn trigger(
        &mut self,
        time: TimeMs,
        matching: &[Event],
        network: &mut EventNetwork,
    ) -> Vec<(AgentId, Mutation)>;
}

/// Chains two manipulators into one that runs both in order: a trait +
/// `.then()` extension + struct holding the pair, the same composable-
/// behavior-chain shape used elsewhere for schedule modifiers.
pub struct ChainedManipulator<A, B> {
    first: A,
    second: B,
}

impl<A: Manipulator, B: Manipulator> Manipulator for ChainedManipulator<A, B> {
    fn subscribed_kinds(&self) -> Vec<&'static str> {
        let mut kinds = self.first.subscribed_kinds();
        kinds.extend(self.second.subscribed_kinds());
        kinds
    }

    fn trigger(
        &mut self,
        time: TimeMs,
        matching: &[Event],
        network: &mut EventNetwork,
    ) -> Vec<(AgentId, Mutation)> {
        let mut out = self.first.trigger(time, matching, network);
        out.extend(self.second.trigger(time, matching, network));
        out
    }
}

pub trait ManipulatorExt: Manipulator + Sized {
    fn then<B: Manipulator>(self, next: B) -> ChainedManipulator<Self, B> {
        ChainedManipulator { first: self, second: next }
    }
}

impl<T: Manipulator> ManipulatorExt for T {}

/// Holds the active events for the current tick. Events ordering within a
/// tick is detector-order then manipulator-order, insertion order within
/// each (§4.6) — a plain append-only `Vec` already gives that, since
/// `run_detectors`/`run_manipulators` iterate their slices in the order
/// the caller registered them.
#[derive(Default)]
pub struct EventNetwork {
    active: Vec<Event>,
    next_event_id: u64,
}

impl EventNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn post(
        &mut self,
        time: TimeMs,
        source_name: impl Into<String>,
        kind: impl Into<String>,
        acting_agents: Vec<AgentId>,
        triggering_agents: Vec<AgentId>,
        payload: EventPayload,
        retain: bool,
    ) -> EventId {
        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        let kind = kind.into();
        tracing::debug!(event = ?id, %kind, ?time, "event posted");
        self.active.push(Event {
            id,
            time,
            source_name: source_name.into(),
            kind,
            acting_agents,
            triggering_agents,
            payload,
            retain,
        });
        id
    }

    pub fn active_events(&self) -> &[Event] {
        &self.active
    }

    pub fn events_of_kind(&self, kind: &str) -> Vec<&Event> {
        self.active.iter().filter(|e| e.kind == kind).collect()
    }

    /// Drops every event whose `retain` flag is `false`; the scheduler
    /// calls this once per tick after the synchronize phase.
    pub fn clear_active_events(&mut self) {
        self.active.retain(|e| e.retain);
    }

    pub fn run_detectors(&mut self, time: TimeMs, detectors: &mut [Box<dyn EventDetector>]) {
        for detector in detectors {
            detector.trigger(time, self);
        }
    }

    /// Runs manipulators in registration order. Each is offered only the
    /// events whose kind it subscribed to; mutations come back in
    /// manipulator order, preserving insertion order within a manipulator's
    /// own returned list.
    pub fn run_manipulators(
        &mut self,
        time: TimeMs,
        manipulators: &mut [Box<dyn Manipulator>],
    ) -> Vec<(AgentId, Mutation)> {
        let mut mutations = Vec::new();
        for manipulator in manipulators {
            let kinds = manipulator.subscribed_kinds();
            let matching: Vec<Event> = self
                .active
                .iter()
                .filter(|e| kinds.contains(&e.kind.as_str()))
                .cloned()
                .collect();
            if matching.is_empty() {
                continue;
            }
            mutations.extend(manipulator.trigger(time, &matching, self));
        }
        mutations
    }
}
