//! `RunOrchestrator` — the per-invocation lifecycle driving one experiment
//! from seeded stochastics through to `FinalizeAll` (§4.8).

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use op_agent::{AgentNetwork, GlobalData};
use op_core::{AgentId, AgentRng, ComponentId, ExperimentConfig, ObjectId, Signal, StochasticsRng, TimeMs};
use op_datastore::{DataStore, DataStoreResult, Value};
use op_eventnet::{EventNetwork, Mutation};
use op_navigation::{NavigationEngine, RouteEntry};
use op_networks::{
    EventDetectorNetwork, ManipulatorNetwork, NewAgentRequest, ObservationNetwork, SpawnNetwork,
};
use op_plugin::{Callbacks, RuntimeInfo};
use op_schedule::{NewTaskBatch, TaskKind, TaskQueue, TaskSpec};
use op_world::{ObjectPolygon, World};

use crate::builder::AgentBuilder;
use crate::environment::EnvironmentConfig;
use crate::error::{SimError, SimResult};
use crate::observer::RunObserver;
use crate::plugins::{EventDetectorSource, ManipulatorSource, SpawnSource};

/// Relative priority among the common recurring tasks (§4.7 tie-breaking —
/// higher runs first within the same tick): runtime spawning happens before
/// anything reads global data, which happens before relocalization, which
/// happens before the observation update that must see the tick's final
/// state.
const PRIORITY_SPAWNING: i32 = 3;
const PRIORITY_PRE_AGENT: i32 = 2;
const PRIORITY_WORLD_SYNC: i32 = 1;
const PRIORITY_OBSERVATION_UPDATE: i32 = 0;

/// Outcome of a single invocation that did not abort the whole simulation.
/// A task failure instead surfaces as `Err(SimError::Schedule(..))` from
/// [`RunOrchestrator::run_all`] (§7).
pub enum InvocationOutcome {
    Completed,
    BootstrapFailed,
}

/// Owns everything that spans the whole experiment (§4.8): the road
/// network, the process-wide data store, and the persistent observation
/// network. Spawn/event-detector/manipulator networks and the agent
/// population are scoped to a single invocation and rebuilt every time.
pub struct RunOrchestrator {
    pub(crate) experiment: ExperimentConfig,
    pub(crate) environment: EnvironmentConfig,
    pub(crate) world: Arc<Mutex<World>>,
    pub(crate) data_store: Arc<Mutex<DataStore>>,
    pub(crate) observation: Arc<Mutex<ObservationNetwork>>,
    pub(crate) spawn_source: SpawnSource,
    pub(crate) event_detector_source: EventDetectorSource,
    pub(crate) manipulator_source: ManipulatorSource,
    pub(crate) agent_builder: AgentBuilder,
    pub(crate) runtime_info: RuntimeInfo,
    pub(crate) callbacks: Callbacks,
    pub(crate) default_agent_length_m: f64,
    pub(crate) default_agent_width_m: f64,
    pub(crate) observer: Box<dyn RunObserver>,
}

impl RunOrchestrator {
    /// Runs every configured invocation in sequence. Returns the overall
    /// success flag: the conjunction of each invocation's scheduler outcome
    /// and the final `SlavePostHook` result (§4.8). Stops early, returning
    /// `Err`, if a task failure aborts the whole simulation — `SlavePostHook`
    /// still runs once before that error is returned, since bootstrap has by
    /// then succeeded at least once (§7).
    pub fn run_all(&mut self) -> SimResult<bool> {
        self.observation.lock().unwrap().slave_pre_hook()?;

        let mut overall = true;
        for index in 0..self.experiment.number_of_invocations {
            match self.run_one_invocation(index) {
                Ok(outcome) => {
                    let succeeded = matches!(outcome, InvocationOutcome::Completed);
                    self.observer.on_invocation_end(index, succeeded);
                    overall &= succeeded;
                }
                Err(error) => {
                    tracing::error!(invocation = index, %error, "task failure aborted the simulation");
                    self.observer.on_invocation_end(index, false);
                    if let Err(e) = self.observation.lock().unwrap().slave_post_hook() {
                        tracing::warn!(%e, "SlavePostHook failed while aborting the simulation");
                    }
                    self.observer.on_run_end(false);
                    return Err(error);
                }
            }
        }

        let finalize = self.observation.lock().unwrap().slave_post_hook();
        if let Err(error) = &finalize {
            tracing::warn!(%error, "SlavePostHook failed");
        }
        overall &= finalize.is_ok();
        self.observer.on_run_end(overall);
        Ok(overall)
    }

    /// Runs invocation `index` end to end. `BootstrapFailed` means a
    /// bootstrap- or hook-level failure aborted just this invocation (§7
    /// "Bootstrap errors") — the caller should still attempt subsequent
    /// invocations. `Err` means a task failed during the run loop, which
    /// aborts the entire simulation.
    fn run_one_invocation(&mut self, index: u32) -> SimResult<InvocationOutcome> {
        let seed = self.experiment.seed_for_invocation(index) as u64;
        let mut stochastics = StochasticsRng::new(seed);
        let parameters = self.environment.sample(&mut stochastics);
        self.observer.on_invocation_start(index, &parameters);

        let pre_run_hook_result = self.observation.lock().unwrap().slave_pre_run_hook();
        if let Err(error) = pre_run_hook_result {
            tracing::warn!(invocation = index, %error, "SlavePreRunHook failed, aborting invocation");
            self.clear_run();
            return Ok(InvocationOutcome::BootstrapFailed);
        }

        let spawn_network = Arc::new(Mutex::new(SpawnNetwork::new(&self.spawn_source.descriptors)));
        {
            let mut network = spawn_network.lock().unwrap();
            let failed = network.instantiate(
                &self.spawn_source.descriptors,
                &self.spawn_source.factories,
                &self.runtime_info,
                &self.callbacks,
            );
            for name in failed {
                tracing::warn!(library = %name, "spawn point failed to instantiate");
            }
            for (name, maker) in &self.spawn_source.bundled {
                network.register_bundled(name.clone(), maker());
            }
        }

        let event_detector_network =
            Arc::new(Mutex::new(EventDetectorNetwork::new(&self.event_detector_source.descriptors)));
        {
            let mut network = event_detector_network.lock().unwrap();
            let failed = network.instantiate(
                &self.event_detector_source.descriptors,
                &self.event_detector_source.factories,
                &self.runtime_info,
                &self.callbacks,
            );
            for name in failed {
                tracing::warn!(library = %name, "event detector failed to instantiate");
            }
            for maker in &self.event_detector_source.bundled {
                network.register_bundled(maker());
            }
        }

        let manipulator_network =
            Arc::new(Mutex::new(ManipulatorNetwork::new(&self.manipulator_source.descriptors)));
        {
            let mut network = manipulator_network.lock().unwrap();
            let failed = network.instantiate(
                &self.manipulator_source.descriptors,
                &self.manipulator_source.factories,
                &self.runtime_info,
                &self.callbacks,
            );
            for name in failed {
                tracing::warn!(library = %name, "manipulator failed to instantiate");
            }
            for maker in &self.manipulator_source.bundled {
                network.register_bundled(maker());
            }
        }

        let event_network = Arc::new(Mutex::new(EventNetwork::new()));
        let agent_network = Arc::new(Mutex::new(AgentNetwork::new(seed)));
        let mut tasks = TaskQueue::new(self.experiment.framework_cycle_time_ms);
        let tick_removed: Arc<Mutex<Vec<AgentId>>> = Arc::new(Mutex::new(Vec::new()));
        let tick_retrying: Arc<Mutex<HashSet<AgentId>>> = Arc::new(Mutex::new(HashSet::new()));
        let mut next_agent_id: u64 = 0;

        let pre_run_requests = {
            let mut network = spawn_network.lock().unwrap();
            network.trigger_pre_run_spawn_points();
            network.consume_new_agents()
        };

        let mut bootstrap_batch = NewTaskBatch::default();
        for request in pre_run_requests {
            let id = AgentId(next_agent_id);
            next_agent_id += 1;
            if let Err(error) = spawn_agent(
                &agent_network,
                &self.world,
                &mut self.agent_builder,
                self.default_agent_length_m,
                self.default_agent_width_m,
                id,
                TimeMs::ZERO,
                &request,
                &mut bootstrap_batch,
            ) {
                tracing::warn!(invocation = index, %error, "bootstrap spawn failed, aborting invocation");
                self.clear_run();
                return Ok(InvocationOutcome::BootstrapFailed);
            }
        }
        for (spec, spawn_tick, offset) in bootstrap_batch.non_recurring {
            tasks.schedule_new_non_recurring_tasks(spec, spawn_tick, offset);
        }
        for (spec, spawn_tick, offset, cycle) in bootstrap_batch.recurring {
            tasks.schedule_new_recurring_tasks(spec, spawn_tick, offset, cycle);
        }

        self.register_common_tasks(
            &mut tasks,
            &spawn_network,
            &event_detector_network,
            &manipulator_network,
            &event_network,
            &agent_network,
            &tick_removed,
            &tick_retrying,
        );

        let world = Arc::clone(&self.world);
        let default_length = self.default_agent_length_m;
        let default_width = self.default_agent_width_m;
        let agent_builder = &mut self.agent_builder;

        let update_agents = |current_time: TimeMs| -> NewTaskBatch {
            let mut batch = NewTaskBatch::default();
            {
                let mut removed = tick_removed.lock().unwrap();
                batch.remove_agents.append(&mut removed);
            }

            let requests = spawn_network.lock().unwrap().consume_new_agents();
            for request in requests {
                let id = AgentId(next_agent_id);
                next_agent_id += 1;
                if let Err(error) = spawn_agent(
                    &agent_network,
                    &world,
                    agent_builder,
                    default_length,
                    default_width,
                    id,
                    current_time,
                    &request,
                    &mut batch,
                ) {
                    tracing::warn!(agent = ?id, %error, "runtime spawn failed for agent");
                }
            }
            batch
        };

        let end = TimeMs(self.experiment.scenario_end_time_ms);
        let is_end_condition = |time: TimeMs| time > end;
        let clear_active_events = || {
            event_network.lock().unwrap().clear_active_events();
        };

        let result = tasks.run_invocation(TimeMs::ZERO, end, update_agents, is_end_condition, clear_active_events);

        let outcome = match result {
            Ok(()) => {
                let finalize = {
                    let store = self.data_store.lock().unwrap();
                    self.observation.lock().unwrap().slave_post_run_hook(&store)
                };
                if let Err(error) = &finalize {
                    tracing::warn!(invocation = index, %error, "SlavePostRunHook failed");
                }
                Ok(InvocationOutcome::Completed)
            }
            Err(error) => {
                tracing::error!(invocation = index, %error, "scheduler task failed");
                Err(SimError::from(error))
            }
        };

        self.clear_run();
        outcome
    }

    /// §4.8's `ClearRun`: resets the road network's tracked object
    /// positions and drops non-persistent data-store records. Always runs,
    /// whether or not the invocation succeeded.
    fn clear_run(&mut self) {
        self.data_store.lock().unwrap().clear();
        self.world.lock().unwrap().clear_objects();
    }

    #[allow(clippy::too_many_arguments)]
    fn register_common_tasks(
        &self,
        tasks: &mut TaskQueue,
        spawn_network: &Arc<Mutex<SpawnNetwork>>,
        event_detector_network: &Arc<Mutex<EventDetectorNetwork>>,
        manipulator_network: &Arc<Mutex<ManipulatorNetwork>>,
        event_network: &Arc<Mutex<EventNetwork>>,
        agent_network: &Arc<Mutex<AgentNetwork>>,
        tick_removed: &Arc<Mutex<Vec<AgentId>>>,
        tick_retrying: &Arc<Mutex<HashSet<AgentId>>>,
    ) {
        let cycle = self.experiment.framework_cycle_time_ms;

        {
            let spawn_network = Arc::clone(spawn_network);
            tasks.schedule_new_recurring_tasks(
                TaskSpec {
                    kind: TaskKind::Spawning,
                    agent: None,
                    priority: PRIORITY_SPAWNING,
                    action: Box::new(move |time| {
                        spawn_network.lock().unwrap().trigger_runtime_spawn_points(time);
                        true
                    }),
                },
                TimeMs::ZERO,
                0,
                cycle,
            );
        }

        {
            let agent_network = Arc::clone(agent_network);
            let data_store = Arc::clone(&self.data_store);
            let event_detector_network = Arc::clone(event_detector_network);
            let manipulator_network = Arc::clone(manipulator_network);
            let event_network = Arc::clone(event_network);
            let tick_removed = Arc::clone(tick_removed);
            tasks.schedule_new_recurring_tasks(
                TaskSpec {
                    kind: TaskKind::PreAgent,
                    agent: None,
                    priority: PRIORITY_PRE_AGENT,
                    action: Box::new(move |time| {
                        run_pre_agent_task(
                            time,
                            &agent_network,
                            &data_store,
                            &event_detector_network,
                            &manipulator_network,
                            &event_network,
                            &tick_removed,
                        )
                    }),
                },
                TimeMs::ZERO,
                0,
                cycle,
            );
        }

        {
            let agent_network = Arc::clone(agent_network);
            let world = Arc::clone(&self.world);
            let tick_removed = Arc::clone(tick_removed);
            let tick_retrying = Arc::clone(tick_retrying);
            let length = self.default_agent_length_m;
            let width = self.default_agent_width_m;
            tasks.schedule_new_recurring_tasks(
                TaskSpec {
                    kind: TaskKind::Synchronize,
                    agent: None,
                    priority: PRIORITY_WORLD_SYNC,
                    action: Box::new(move |_time| {
                        run_world_sync_task(&agent_network, &world, &tick_removed, &tick_retrying, length, width)
                    }),
                },
                TimeMs::ZERO,
                0,
                cycle,
            );
        }

        {
            let observation = Arc::clone(&self.observation);
            let data_store = Arc::clone(&self.data_store);
            tasks.schedule_new_recurring_tasks(
                TaskSpec {
                    kind: TaskKind::Synchronize,
                    agent: None,
                    priority: PRIORITY_OBSERVATION_UPDATE,
                    action: Box::new(move |time| {
                        let store = data_store.lock().unwrap();
                        match observation.lock().unwrap().slave_update_hook(time, &store) {
                            Ok(()) => true,
                            Err(error) => {
                                tracing::warn!(%error, "SlaveUpdateHook failed");
                                false
                            }
                        }
                    }),
                },
                TimeMs::ZERO,
                0,
                cycle,
            );
        }
    }
}

/// Builds one newly spawned agent: registers it, wires its component graph,
/// localizes its starting pose, and appends its per-component scheduler
/// tasks to `batch`.
#[allow(clippy::too_many_arguments)]
fn spawn_agent(
    agent_network: &Arc<Mutex<AgentNetwork>>,
    world: &Arc<Mutex<World>>,
    agent_builder: &mut AgentBuilder,
    length_m: f64,
    width_m: f64,
    id: AgentId,
    spawn_time: TimeMs,
    request: &NewAgentRequest,
    batch: &mut NewTaskBatch,
) -> SimResult<()> {
    {
        let mut network = agent_network.lock().unwrap();
        let agent = network.add_agent(id, spawn_time)?;
        agent_builder(agent, request);
    }

    let (position, heading) = {
        let w = world.lock().unwrap();
        let position = w.road_coord_to_world_coord(request.lane, request.s, request.t);
        let heading = w.get_lane_direction(request.lane, request.s).unwrap_or(0.0);
        (position, heading)
    };

    if let Some(position) = position {
        let polygon = ObjectPolygon::rectangle(position, heading, length_m, width_m, None);
        let located = {
            let mut w = world.lock().unwrap();
            w.locate_object(ObjectId(id.0), polygon).clone()
        };
        let mut network = agent_network.lock().unwrap();
        if let Some(agent) = network.agent_mut(id) {
            let mut data = GlobalData { position: Some(position), ..GlobalData::default() };
            if let Some(reference) = located.reference_point {
                data.lane = Some(reference.lane);
                data.road = Some(reference.road);
                data.s = reference.s;
                data.t = reference.t;
                data.yaw = reference.yaw;
            }
            agent.set_global_data(data);
        }
    }

    let component_count = {
        let network = agent_network.lock().unwrap();
        network.agent(id).map(|a| a.graph().component_count()).unwrap_or(0)
    };

    for index in 0..component_count {
        let component = ComponentId(index as u32);
        let timing = {
            let network = agent_network.lock().unwrap();
            network.agent(id).expect("just added").graph().timing(component)
        };
        let agent_network = Arc::clone(agent_network);
        let action: Box<dyn FnMut(TimeMs) -> bool + Send> =
            Box::new(move |time: TimeMs| run_component_task(&agent_network, id, component, time));
        let spec = TaskSpec {
            kind: if timing.is_init { TaskKind::NonRecurringAgent } else { TaskKind::RecurringAgent },
            agent: Some(id),
            priority: timing.priority,
            action,
        };
        if timing.is_init {
            batch.non_recurring.push((spec, spawn_time, timing.offset_time_ms));
        } else {
            batch.recurring.push((spec, spawn_time, timing.offset_time_ms, timing.cycle_time_ms));
        }
    }

    Ok(())
}

/// One component's `UpdateInput` → `Trigger` → `UpdateOutput` → channel
/// advance (§4.3). Folds a produced `Dynamics` signal back into the agent's
/// `GlobalData` so `PublishGlobalData` sees it next tick — last writer
/// wins if more than one component emits dynamics (open question, §9).
fn run_component_task(
    agent_network: &Arc<Mutex<AgentNetwork>>,
    id: AgentId,
    component: ComponentId,
    time: TimeMs,
) -> bool {
    let mut network = agent_network.lock().unwrap();
    let Some(agent) = network.agent_mut(id) else { return true };
    if !agent.is_live() {
        return true;
    }

    let produced = {
        let graph = agent.graph_mut();
        graph.update_input(component, time);
        graph.trigger(component, time);
        let produced = graph.update_output(component, time);
        graph.advance_channels(time);
        produced
    };

    match produced {
        Ok(signal) => {
            if let Some(Signal::Dynamics(dynamics)) = signal {
                let mut data = agent.global_data().clone();
                data.velocity = dynamics.v;
                data.acceleration = dynamics.a;
                data.yaw = dynamics.yaw;
                data.yaw_rate = dynamics.yaw_rate;
                data.odometer += dynamics.travel_distance;
                agent.set_global_data(data);
            }
            true
        }
        Err(error) => {
            tracing::warn!(agent = ?id, ?component, %error, "component update_output failed");
            false
        }
    }
}

/// `PreAgent` common task: `PublishGlobalData` into the data store, then
/// event detectors, then manipulators, applying whatever mutations they
/// return (§4.4, §4.6).
#[allow(clippy::too_many_arguments)]
fn run_pre_agent_task(
    time: TimeMs,
    agent_network: &Arc<Mutex<AgentNetwork>>,
    data_store: &Arc<Mutex<DataStore>>,
    event_detector_network: &Arc<Mutex<EventDetectorNetwork>>,
    manipulator_network: &Arc<Mutex<ManipulatorNetwork>>,
    event_network: &Arc<Mutex<EventNetwork>>,
    tick_removed: &Arc<Mutex<Vec<AgentId>>>,
) -> bool {
    let mut publish_failed = false;
    {
        let network = agent_network.lock().unwrap();
        let mut store = data_store.lock().unwrap();
        network.publish_global_data(|id, data| {
            if let Err(error) = write_global_data(&mut store, time, id, data) {
                tracing::warn!(agent = ?id, %error, "failed to publish global data");
                publish_failed = true;
            }
        });
    }
    if publish_failed {
        return false;
    }

    let mutations = {
        let mut events = event_network.lock().unwrap();
        event_detector_network.lock().unwrap().trigger(time, &mut events);
        manipulator_network.lock().unwrap().trigger(time, &mut events)
    };

    let mut network = agent_network.lock().unwrap();
    let mut removed = tick_removed.lock().unwrap();
    for (agent, mutation) in mutations {
        match mutation {
            Mutation::Remove => {
                network.queue_agent_remove(agent);
                removed.push(agent);
            }
            Mutation::OverrideAcceleration(value) => {
                network.queue_agent_update(agent, move |a| {
                    let mut data = a.global_data().clone();
                    data.acceleration = value;
                    a.set_global_data(data);
                });
            }
            Mutation::OverrideVelocity(value) => {
                network.queue_agent_update(agent, move |a| {
                    let mut data = a.global_data().clone();
                    data.velocity = value;
                    a.set_global_data(data);
                });
            }
            Mutation::SetComponentState(component, state) => {
                network.queue_agent_update(agent, move |a| {
                    a.graph_mut().set_component_state(component, state);
                });
            }
        }
    }
    true
}

/// How many roads a rescue route is allowed to extend through before the
/// retry itself is treated as having found nothing to stand on (§4.2).
const RESCUE_ROUTE_MAX_ROADS: usize = 8;

/// `Synchronize`/WorldSync common task: drains the agent network's deferred
/// mutation/removal queues and re-localizes every surviving agent (§4.4,
/// §4.2). Runs with higher priority than the observation-update task so the
/// latter always sees this tick's final positions.
///
/// A failed localization (`isOnRoute=false`) isn't fatal on its own: the
/// first time it happens for an agent, `retrying` requests a fresh route
/// from that agent's main-locator position via `NavigationEngine::
/// build_route` and, if one exists, grants the agent one more tick to
/// re-localize before giving up. An agent that fails twice in a row — or
/// whose main locator is gone entirely, leaving nothing to route from — is
/// removed (§4.2's "retry once, then remove" failure semantics).
fn run_world_sync_task(
    agent_network: &Arc<Mutex<AgentNetwork>>,
    world: &Arc<Mutex<World>>,
    tick_removed: &Arc<Mutex<Vec<AgentId>>>,
    retrying: &Arc<Mutex<HashSet<AgentId>>>,
    length_m: f64,
    width_m: f64,
) -> bool {
    let mut network = agent_network.lock().unwrap();
    let mut w = world.lock().unwrap();
    let mut removed = tick_removed.lock().unwrap();
    let mut retrying = retrying.lock().unwrap();
    let global_seed = network.global_seed();

    network.sync_global_data(|agent| {
        let data = agent.global_data();
        let Some(position) = data.position else { return true };
        let polygon = ObjectPolygon::rectangle(position, data.yaw, length_m, width_m, None);
        let located = w.locate_object(ObjectId(agent.id().0), polygon).clone();
        if located.is_on_route() {
            retrying.remove(&agent.id());
            return true;
        }

        let already_retried = retrying.remove(&agent.id());
        if !already_retried {
            if let Some(main_locator) = located.main_locator {
                let mut rng = AgentRng::new(global_seed, agent.id());
                let start = RouteEntry { road: main_locator.road, in_stream_direction: true };
                if NavigationEngine::build_route(&w.graph, &mut rng, start, RESCUE_ROUTE_MAX_ROADS).is_ok() {
                    retrying.insert(agent.id());
                    return true;
                }
            }
        }

        removed.push(agent.id());
        false
    });
    true
}

fn write_global_data(
    store: &mut DataStore,
    time: TimeMs,
    agent: AgentId,
    data: &GlobalData,
) -> DataStoreResult<()> {
    store.put_cyclic(time, agent, "Agent.Velocity", Value::Float(data.velocity))?;
    store.put_cyclic(time, agent, "Agent.Acceleration", Value::Float(data.acceleration))?;
    store.put_cyclic(time, agent, "Agent.Yaw", Value::Float(data.yaw))?;
    store.put_cyclic(time, agent, "Agent.YawRate", Value::Float(data.yaw_rate))?;
    store.put_cyclic(time, agent, "Agent.SteeringAngle", Value::Float(data.steering_angle_rad))?;
    store.put_cyclic(time, agent, "Agent.Odometer", Value::Float(data.odometer))?;
    store.put_cyclic(time, agent, "Agent.S", Value::Float(data.s))?;
    store.put_cyclic(time, agent, "Agent.T", Value::Float(data.t))?;
    if let Some(position) = data.position {
        store.put_cyclic(time, agent, "Agent.PositionX", Value::Float(position.x))?;
        store.put_cyclic(time, agent, "Agent.PositionY", Value::Float(position.y))?;
    }
    if let Some(lane) = data.lane {
        store.put_cyclic(time, agent, "Agent.Lane", Value::Int(lane.0 as i64))?;
    }
    if let Some(road) = data.road {
        store.put_cyclic(time, agent, "Agent.Road", Value::Int(road.0 as i64))?;
    }
    if let Some(front) = data.front_agent {
        store.put_cyclic(time, agent, "Agent.FrontAgent", Value::Int(front.0 as i64))?;
    }
    Ok(())
}
