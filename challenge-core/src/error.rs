use thiserror::Error;

/// Errors raised while building challenge state from external data
/// (session files, query parameters, fetched banks). In-game input never
/// produces an error; it is ignored or scored as zero instead.
#[derive(Error, Debug)]
pub enum ChallengeError {
    #[error("unknown challenge kind: {0}")]
    UnknownKind(String),

    #[error("tile grid must contain 0..=8 exactly once, got {0:?}")]
    InvalidTiles(Vec<u8>),

    #[error("two pieces share square ({row}, {col})")]
    OverlappingPieces { row: u8, col: u8 },

    #[error("square ({row}, {col}) is off the 8x8 board")]
    OffBoard { row: u8, col: u8 },

    #[error("bank '{0}' has no entries")]
    EmptyBank(String),

    #[error("session is for {found}, not {expected}")]
    KindMismatch { expected: String, found: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChallengeError>;
