use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model configuration error: {0}")]
    Config(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
