use op_core::{JunctionId, RoadId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("junction {0:?} has no connection matching the incoming road")]
    NoViableExit(JunctionId),

    #[error("road {0} has no section to build a stream from")]
    EmptyRoad(RoadId),
}

pub type NavigationResult<T> = Result<T, NavigationError>;
