use crate::board::Side;

/// Errors raised while reading move, side or result notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("empty move string")]
    Empty,

    #[error("invalid coordinate `{0}`")]
    InvalidCoordinate(String),

    #[error("expected {expected} coordinates, found {found}")]
    TokenCount { expected: usize, found: usize },

    #[error("duplicate coordinate `{0}` in placement")]
    DuplicateCoordinate(String),

    #[error("unrecognised move `{0}`")]
    Unrecognised(String),

    #[error("unknown side `{0}`")]
    UnknownSide(String),

    #[error("unknown game result `{0}`")]
    UnknownResult(String),
}

/// Errors raised while reading a board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("missing `% ABCDEF` marker line")]
    MissingMarker,

    #[error("expected 6 board rows, found {0}")]
    RowCount(usize),

    #[error("row {row}: {reason}")]
    BadRow { row: usize, reason: String },

    #[error("unknown piece character `{0}`")]
    UnknownPiece(char),

    #[error("more than one sovereign for {0:?}")]
    DuplicateSovereign(Side),
}
