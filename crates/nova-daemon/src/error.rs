//! The daemon's structured error taxonomy.
//!
//! Every failure surfaced by the loop is bucketed into one of these six
//! categories so supervising tooling can tell a corrupt saved-state blob
//! apart from a transport hiccup apart from a genuinely uncaught handler
//! panic.

use std::path::PathBuf;

use nova_core::RepoPath;

/// Errors that can terminate or degrade the daemon loop.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// Saved state existed but could not be loaded (corrupt blob, schema
    /// mismatch, missing file referenced by the change list).
    #[error("failed to load saved state from {path}: {source}")]
    InitLoadFailure {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A panic was caught while running initialization.
    #[error("initialization panicked: {detail}")]
    InitUncaught { detail: String },

    /// A request arrived while the daemon was in a state that cannot serve
    /// it.
    #[error("request cannot be served in state {state:?}")]
    WrongState { state: &'static str },

    /// A panic was caught while running a request handler. The daemon
    /// recovers by treating the request as failed; state is unaffected.
    #[error("handler for request {request_id} panicked: {detail}")]
    HandlerUncaught { request_id: u64, detail: String },

    /// A single file's backlog processing failed (re-parse or re-derive
    /// error). The Change-Backlog Processor logs and continues with the
    /// remaining files rather than aborting the whole backlog.
    #[error("failed to process backlog entry for {path}: {source}")]
    BacklogFailure {
        path: RepoPath,
        #[source]
        source: anyhow::Error,
    },

    /// The framed transport itself failed (I/O error, malformed frame,
    /// decode error). Always fatal to the connection.
    #[error("transport error: {0}")]
    TransportFailure(#[from] TransportError),
}

/// Errors specific to the framed wire codec.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame of {len} bytes exceeds the maximum frame size of {max} bytes")]
    FrameTooLarge { len: u32, max: u32 },

    #[error("failed to decode frame body: {0}")]
    Decode(#[from] bincode::Error),

    #[error("connection closed mid-frame")]
    UnexpectedEof,
}

pub type DaemonResult<T> = Result<T, DaemonError>;
