//! Error types for paddockctl

use paddock_listener::ListenerError;
use paddock_wire::{DecodeError, Rejection};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No input: {0}")]
    NoInput(String),

    #[error("Datagram rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
