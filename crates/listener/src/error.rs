//! Listener error types.

use std::net::SocketAddr;
use std::path::PathBuf;

use paddock_tracker::TrackerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid listener config `{field}`: {message}")]
    InvalidConfig { field: &'static str, message: String },

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("receive task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
