use thiserror::Error;

/// Reasons a command on the game session is rejected.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid tile index")]
    InvalidIndex,
    #[error("Board must have at least two tiles")]
    InvalidBoardSize,
    #[error("Game has not started yet")]
    NotStarted,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Board is locked while the hint is shown")]
    HintActive,
    #[error("Hint was already used in this game")]
    HintUnavailable,
}

pub type Result<T> = core::result::Result<T, GameError>;
