//! Turn-level errors

/// Anything that can go wrong while one agent reads, decides or writes a turn.
///
/// The caller decides the fallback; the harness and the turn command both submit
/// an empty order list instead of aborting the game.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state is missing the {0} line")]
    MissingLine(&'static str),

    #[error("invalid troop count {value:?} at position {position}")]
    InvalidCount { position: usize, value: String },

    #[error("unknown owner code {code:?} at position {position}")]
    UnknownOwner { position: usize, code: String },

    #[error("{counts} troop counts but {owners} owner codes")]
    LengthMismatch { counts: usize, owners: usize },

    #[error("ring has no nodes")]
    EmptyRing,

    #[error("orders spend {spent} troops but the budget is {budget}")]
    Overspend { spent: u64, budget: u32 },
}
