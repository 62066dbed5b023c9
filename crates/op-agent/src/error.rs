use op_core::{AgentId, ComponentId, LinkId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent {0} is already present")]
    DuplicateAgent(AgentId),

    #[error("agent {0} is not known to this network")]
    UnknownAgent(AgentId),

    #[error("component {0:?} has no output link {1:?} to connect")]
    UnknownOutputLink(ComponentId, LinkId),

    #[error("input link {1:?} on component {0:?} is already connected")]
    InputAlreadyConnected(ComponentId, LinkId),
}

pub type AgentResult<T> = Result<T, AgentError>;
