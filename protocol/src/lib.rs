//! Wire types shared between the puzzle client and the ranking backend.
//!
//! Field names follow the backend's JSON exactly, which mixes camelCase
//! (`clearTimeMs`, `userId`) with plain lowercase names.

use serde::{Deserialize, Serialize};

pub mod push;

pub use push::{FrameError, PushFrame};

/// Namespace the ranking push events are emitted on.
pub const RANKING_NAMESPACE: &str = "/ranking";

/// Event name announcing that the standings changed.
pub const RANKING_UPDATE_EVENT: &str = "ranking_update";

/// Body of `POST /games/record`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    pub clear_time_ms: u32,
}

/// Reply to `POST /games/record`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResponse {
    pub success: bool,
    pub rank: u32,
}

/// One row of `GET /ranks?limit=N`, also carried by `ranking_update` pushes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub rank: u32,
    pub name: String,
    /// Best clear time formatted as seconds, e.g. `"12.34"`.
    pub record: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// Reply to `GET /ranks/my`. A rank of `0` means the user has no record yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MyRank {
    pub rank: u32,
    pub record: String,
}

impl MyRank {
    pub const fn has_record(&self) -> bool {
        self.rank > 0
    }
}

/// Reply to `GET /games/hidden-message`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenMessages {
    pub messages: Vec<String>,
}

/// Reply to `GET /games/puzzle-image`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleImage {
    pub url: String,
}

/// Error body the backend attaches to 4xx replies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}
