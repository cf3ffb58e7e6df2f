//! Rejection and configuration errors
//!
//! `MoveError` is always recoverable: a rejected call leaves the game untouched.
//! `BoardError` means the board cannot be played and is only produced while
//! constructing a grid or a game.

use thiserror::Error;

use super::cell::{Player, PortalId};
use super::game::GamePhase;

/// An illegal move. The call that produced it made no state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("action not allowed during {phase:?}")]
    WrongPhase { phase: GamePhase },

    #[error("it is not {player}'s turn")]
    NotYourTurn { player: Player },

    #[error("column {column} is outside a board of size {size}")]
    ColumnOutOfRange { column: usize, size: usize },

    #[error("column {column} is already secured")]
    ColumnSecured { column: usize },

    #[error("column {column} is full")]
    ColumnFull { column: usize },

    #[error("top cell of column {column} is not empty")]
    TopCellBlocked { column: usize },

    #[error("column {column} is already reserved this round")]
    ColumnReserved { column: usize },

    #[error("column {column} is not reserved")]
    ColumnNotReserved { column: usize },

    #[error("column {column} is not reserved by {player}")]
    NotReservationOwner { column: usize, player: Player },

    #[error("{player} already holds a reservation this round")]
    AlreadyReserved { player: Player },

    #[error("{player} has no balls remaining")]
    NoBallsRemaining { player: Player },

    #[error("dormant ball already placed in column {column}")]
    DormantBallPlaced { column: usize },

    #[error("no dormant ball in column {column}")]
    NoDormantBall { column: usize },
}

/// A board that cannot be played.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board size {size} outside {min}..={max}")]
    InvalidSize { size: usize, min: usize, max: usize },

    #[error("row {row} has {len} cells, expected {size}")]
    RaggedRow { row: usize, len: usize, size: usize },

    #[error("portal {id} appears {count} time(s), expected exactly 2")]
    UnpairedPortal { id: PortalId, count: usize },

    #[error("portal {id} pair spans rows {first} and {second}")]
    PortalRowMismatch { id: PortalId, first: usize, second: usize },

    #[error("dormant ball at ({row}, {col}) in a board layout")]
    DormantBallInLayout { row: usize, col: usize },

    #[error("unknown layout symbol {symbol:?} at ({row}, {col})")]
    UnknownSymbol { symbol: char, row: usize, col: usize },

    #[error("{features} features do not fit below the top row of a {size}x{size} board")]
    TooManyFeatures { features: usize, size: usize },

    #[error("{pairs} portal pairs exceed the limit of {max}")]
    TooManyPortals { pairs: usize, max: usize },

    #[error("each player needs at least one ball")]
    NoBalls,
}
