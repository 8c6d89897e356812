//! CLI 错误

use std::path::PathBuf;

use mwscript_api::ScriptError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid environment file '{}': {source}", path.display())]
    Environment {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{}' is neither UTF-8 source nor a compiled container", .0.display())]
    NotSource(PathBuf),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("cannot serialize script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot initialise logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error(transparent)]
    Script(#[from] ScriptError),
}
