use op_core::{AgentId, TimeMs};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("key {key} already has a value for agent {agent} at {time}")]
    DuplicateWrite {
        key: String,
        agent: AgentId,
        time: TimeMs,
    },
}

pub type DataStoreResult<T> = Result<T, DataStoreError>;
