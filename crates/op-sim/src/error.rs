use op_agent::AgentError;
use op_networks::NetworksError;
use op_schedule::ScheduleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("scheduler aborted the invocation: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("plug-in network error: {0}")]
    Networks(#[from] NetworksError),
}

pub type SimResult<T> = Result<T, SimError>;
