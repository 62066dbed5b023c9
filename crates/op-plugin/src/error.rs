use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("failed to load library {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: libloading::Error,
    },

    #[error("symbol {symbol} not found in {path}: {source}")]
    Symbol {
        path: String,
        symbol: String,
        #[source]
        source: libloading::Error,
    },

    #[error("CreateInstance returned a null implementation for {path}")]
    InstanceCreationFailed { path: String },

    #[error("library {path} is already loaded")]
    AlreadyLoaded { path: String },

    #[error("no implementation instantiated for {path}")]
    NotInstantiated { path: String },
}

pub type PluginResult<T> = Result<T, PluginError>;
