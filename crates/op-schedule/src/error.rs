use op_core::TaskId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("task {0} returned failure and aborted its phase")]
    TaskFailed(TaskId),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
