//! Agent factory and network (§4.4): adding agents during spawn, deferring
//! mutation/removal to the synchronize phase, and publishing global data.

use std::collections::HashMap;

use op_core::{AgentId, AgentRng, TimeMs};

use crate::agent::{Agent, AgentStatus, GlobalData};
use crate::error::{AgentError, AgentResult};

type UpdateClosure = Box<dyn FnOnce(&mut Agent) + Send>;

/// Owns every agent that has ever existed in this invocation (live,
/// invalid, or removed) plus the deferred update/remove queues (§4.4).
#[derive(Default)]
pub struct AgentNetwork {
    global_seed: u64,
    slots: Vec<Agent>,
    index: HashMap<AgentId, usize>,
    update_queue: Vec<(AgentId, UpdateClosure)>,
    remove_queue: Vec<AgentId>,
}

impl AgentNetwork {
    pub fn new(global_seed: u64) -> Self {
        Self {
            global_seed,
            ..Default::default()
        }
    }

    /// The seed this network's agent RNGs were derived from, so a caller
    /// that only holds an `&AgentNetwork` can still reproduce an agent's
    /// `AgentRng` deterministically (e.g. a localization retry attempt,
    /// which only gets `&Agent`).
    pub fn global_seed(&self) -> u64 {
        self.global_seed
    }

    /// Add a new agent spawned at `spawn_time`. Fails if `id` is already
    /// present — agents are added only during the spawn phase (§4.4).
    pub fn add_agent(&mut self, id: AgentId, spawn_time: TimeMs) -> AgentResult<&mut Agent> {
        if self.index.contains_key(&id) {
            return Err(AgentError::DuplicateAgent(id));
        }
        let rng = AgentRng::new(self.global_seed, id);
        let slot = self.slots.len();
        self.slots.push(Agent::new(id, spawn_time, rng));
        self.index.insert(id, slot);
        Ok(&mut self.slots[slot])
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.index.get(&id).map(|&slot| &self.slots[slot])
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.index.get(&id).copied().map(move |slot| &mut self.slots[slot])
    }

    pub fn live_agents(&self) -> impl Iterator<Item = &Agent> {
        self.slots.iter().filter(|a| a.is_live())
    }

    pub fn agent_count(&self) -> usize {
        self.slots.len()
    }

    /// Defer a state mutation to `SyncGlobalData`. Queued FIFO; applied
    /// before removals so a mutation racing a removal still lands.
    pub fn queue_agent_update<F>(&mut self, agent: AgentId, mutation: F)
    where
        F: FnOnce(&mut Agent) + Send + 'static,
    {
        self.update_queue.push((agent, Box::new(mutation)));
    }

    /// Defer removal to `SyncGlobalData`.
    pub fn queue_agent_remove(&mut self, agent: AgentId) {
        self.remove_queue.push(agent);
    }

    /// Drain the update queue FIFO, then the remove queue, then re-run
    /// localization for every still-live agent via `relocalize` (returns
    /// `false` to mark the agent `Invalid`). Kept generic over the
    /// localization callback so this crate has no dependency on the world
    /// representation it is re-localizing against (§4.4).
    pub fn sync_global_data<F>(&mut self, mut relocalize: F)
    where
        F: FnMut(&Agent) -> bool,
    {
        for (agent, mutation) in self.update_queue.drain(..) {
            if let Some(&slot) = self.index.get(&agent) {
                mutation(&mut self.slots[slot]);
            } else {
                tracing::warn!(?agent, "queued update for unknown agent");
            }
        }

        for agent in self.remove_queue.drain(..) {
            match self.index.remove(&agent) {
                Some(slot) => self.slots[slot].mark_removed(),
                None => tracing::warn!(?agent, "queued removal for unknown agent"),
            }
        }

        for slot in &mut self.slots {
            if slot.status() != AgentStatus::Live {
                continue;
            }
            if !relocalize(slot) {
                tracing::warn!(agent = ?slot.id(), "localization failed, marking invalid");
                slot.mark_invalid();
            }
        }
    }

    /// Call `publish` once per live agent with its current [`GlobalData`].
    pub fn publish_global_data<F>(&self, mut publish: F)
    where
        F: FnMut(AgentId, &GlobalData),
    {
        for agent in self.live_agents() {
            publish(agent.id(), agent.global_data());
        }
    }
}
