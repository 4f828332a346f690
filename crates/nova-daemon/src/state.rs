//! The daemon's top-level state machine.

use crate::error::DaemonError;

/// Structured detail captured when initialization fails, carried by
/// `FailedToInitialize` so every subsequent request can report why.
#[derive(Debug, Clone)]
pub struct InitFailureDetail {
    pub short_message: String,
    pub debug_details: String,
    pub actionable: bool,
}

impl InitFailureDetail {
    pub fn from_error(err: &DaemonError) -> Self {
        Self {
            short_message: format!("Failed to initialize: {err}"),
            debug_details: format!("{err:?}"),
            actionable: matches!(err, DaemonError::InitLoadFailure { .. }),
        }
    }
}

/// Which of the three top-level states the loop is in. The
/// `Initialized` payload itself lives alongside this in the loop, not inside
/// the enum, so the borrow checker doesn't force moving a large struct in
/// and out on every state check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTag {
    Initializing,
    Initialized,
    FailedToInitialize,
}

impl StateTag {
    pub fn as_str(self) -> &'static str {
        match self {
            StateTag::Initializing => "Initializing",
            StateTag::Initialized => "Initialized",
            StateTag::FailedToInitialize => "FailedToInitialize",
        }
    }
}
