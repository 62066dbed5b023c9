//! The per-agent dataflow graph: components, their links, and the channels
//! wiring them together (§4.3).
//!
//! Per-tick ordering for one component is `UpdateInput` → `Trigger` →
//! `UpdateOutput`, driven from outside by whoever schedules the component
//! (op-schedule, ordered by `priority`/`responseTime` — this crate only
//! provides the three phases and the buffered channels between them).

use std::collections::HashMap;

use op_core::{ComponentId, ComponentState, LinkId, Signal, TimeMs, TimingConfig};
use op_model::Model;

use crate::channel::Buffer;
use crate::error::{AgentError, AgentResult};

struct ComponentSlot {
    model: Box<dyn Model>,
    timing: TimingConfig,
    inputs: HashMap<LinkId, usize>,
    outputs: HashMap<LinkId, usize>,
}

impl std::fmt::Debug for ComponentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentSlot")
            .field("model", &"<dyn Model>")
            .field("timing", &self.timing)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}

/// One component's dataflow graph, private to an [`crate::Agent`].
///
/// Channels are stored densely; a component's `inputs`/`outputs` maps hold
/// indices into `channels` rather than owning buffers directly, since one
/// channel fans out to many input links.
#[derive(Debug, Default)]
pub struct AgentGraph {
    components: Vec<ComponentSlot>,
    channels: Vec<Buffer>,
}

impl AgentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component driven by `model`, with the given timing parameters.
    /// Returns the `ComponentId` other calls address it by.
    pub fn add_component(&mut self, timing: TimingConfig, model: Box<dyn Model>) -> ComponentId {
        let id = ComponentId(self.components.len() as u32);
        self.components.push(ComponentSlot {
            model,
            timing,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
        });
        id
    }

    /// Wire `source`'s output link to one or more target input links,
    /// creating a fresh channel. Fails if the source component has no such
    /// output link registered yet, or a target input link is already wired.
    pub fn connect(
        &mut self,
        source: (ComponentId, LinkId),
        targets: &[(ComponentId, LinkId)],
    ) -> AgentResult<()> {
        let channel_index = self.channels.len();
        self.channels.push(Buffer::new());

        let (source_component, source_link) = source;
        self.components[source_component.index()]
            .outputs
            .insert(source_link, channel_index);

        for &(component, link) in targets {
            let slot = &mut self.components[component.index()];
            if slot.inputs.contains_key(&link) {
                return Err(AgentError::InputAlreadyConnected(component, link));
            }
            slot.inputs.insert(link, channel_index);
        }
        Ok(())
    }

    pub fn timing(&self, component: ComponentId) -> TimingConfig {
        self.components[component.index()].timing
    }

    /// Forward a manipulator's `SetComponentState` mutation to the
    /// component's model.
    pub fn set_component_state(&mut self, component: ComponentId, state: ComponentState) {
        self.components[component.index()].model.set_state(state);
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Phase 1: copy every connected input channel's current value into the
    /// component's local state.
    pub fn update_input(&mut self, component: ComponentId, time: TimeMs) {
        let slot = &mut self.components[component.index()];
        let links: Vec<(LinkId, usize)> = slot.inputs.iter().map(|(&l, &c)| (l, c)).collect();
        for (link, channel) in links {
            if let Some(signal) = self.channels[channel].read() {
                slot.model.update_input(link, signal, time);
            }
        }
    }

    /// Phase 2: run the component's compute step.
    pub fn trigger(&mut self, component: ComponentId, time: TimeMs) {
        self.components[component.index()].model.trigger(time);
    }

    /// Phase 3: for each output link with a value, schedule its publish
    /// `responseTime` ms after `time`. Returns the last signal actually
    /// produced this tick (across whichever output links fired), mainly so
    /// callers and tests can observe that a trigger did something without
    /// reaching into channel internals.
    pub fn update_output(
        &mut self,
        component: ComponentId,
        time: TimeMs,
    ) -> AgentResult<Option<Signal>> {
        let slot = &mut self.components[component.index()];
        let response = slot.timing.response_time_ms;
        let outputs: Vec<LinkId> = slot.outputs.keys().copied().collect();
        let mut produced = None;
        for link in outputs {
            let Some(signal) = slot.model.update_output(link, time) else {
                continue;
            };
            let &channel = slot
                .outputs
                .get(&link)
                .ok_or(AgentError::UnknownOutputLink(component, link))?;
            self.channels[channel].schedule_publish(time.offset(response), signal.clone());
            produced = Some(signal);
        }
        Ok(produced)
    }

    /// Make every publish due at or before `time` visible. Called once per
    /// tick after every component in the agent has run `update_output`.
    pub fn advance_channels(&mut self, time: TimeMs) {
        for channel in &mut self.channels {
            channel.advance(time);
        }
    }
}
