//! World/localization error type.

use thiserror::Error;

use op_core::{JunctionId, LaneId, RoadId};

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("road {0} references itself as predecessor or successor")]
    SelfReference(RoadId),

    #[error("road {0} has a missing predecessor/successor link")]
    MissingLink(RoadId),

    #[error("road {0} has no lane with index {1} to link against")]
    MissingLaneLink(RoadId, i32),

    #[error("road {0} not found")]
    RoadNotFound(RoadId),

    #[error("lane {0} not found")]
    LaneNotFound(LaneId),

    #[error("junction {0} not found")]
    JunctionNotFound(JunctionId),

    #[error("localization failed: no reference point on route")]
    LocalizationFailed,
}

pub type WorldResult<T> = Result<T, WorldError>;
