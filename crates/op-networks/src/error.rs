use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworksError {
    #[error("hook failed for plug-in {library}: {hook}")]
    HookFailed { library: String, hook: &'static str },
}

pub type NetworksResult<T> = Result<T, NetworksError>;
