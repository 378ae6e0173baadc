use alloc::string::String;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::*;

/// Identity of one attempt at the puzzle. Bumped by every reset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl SessionId {
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    NotSubmitted,
    Submitting,
    Submitted,
    Failed,
}

impl SubmissionState {
    pub const fn as_str(self) -> &'static str {
        use SubmissionState::*;
        match self {
            NotSubmitted => "not_submitted",
            Submitting => "submitting",
            Submitted => "submitted",
            Failed => "failed",
        }
    }
}

/// Permission to send one record to the ranking service.
///
/// Only the session hands these out, and at most once per session. The result
/// must come back with the same ticket so late answers for an older session can
/// be told apart.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub session: SessionId,
    pub clear_time_ms: u32,
    pub issued_at: Instant,
}

#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionError {
    /// The server refused the record as invalid, e.g. an implausibly fast time.
    #[error("Record rejected: {detail}")]
    Rejected { detail: String },
    #[error("Not signed in")]
    Unauthorized,
    #[error("Server error (status {status})")]
    Server { status: u16 },
    #[error("Network error: {0}")]
    Network(String),
    #[error("No answer from the server in time")]
    TimedOut,
    #[error("Server did not record the result")]
    NotRecorded,
    #[error("Unexpected server reply: {0}")]
    Decode(String),
}

impl SubmissionError {
    /// Text shown to the player. Rejections are passed through verbatim.
    pub fn user_message(&self) -> String {
        use SubmissionError::*;
        match self {
            Rejected { detail } if !detail.is_empty() => detail.clone(),
            Rejected { .. } => "This record looks invalid and was not saved.".into(),
            Unauthorized => "Your sign-in has expired, please sign in again.".into(),
            Server { .. } => "A temporary server error occurred, please try again later.".into(),
            Network(_) => "Cannot connect to the server.".into(),
            TimedOut => "Saving the record took too long, please try again.".into(),
            NotRecorded | Decode(_) => "Failed to save the record.".into(),
        }
    }

    /// Whether a new attempt could be saved. A rejection or a lost sign-in would
    /// fail the same way again.
    pub const fn is_transient(&self) -> bool {
        use SubmissionError::*;
        matches!(self, Server { .. } | Network(_) | TimedOut)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
    Recorded { rank: u32 },
    /// Submission failed, `message` is the notice to show once.
    Failed { message: String },
    /// The ticket no longer matches an outstanding submission, nothing changed.
    Stale,
}
