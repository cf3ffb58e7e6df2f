//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (board generation)
//! - Every move runs to completion before the next one is accepted
//! - No rendering, audio or platform dependencies

pub mod board;
pub mod cell;
pub mod error;
pub mod game;
pub mod grid;
pub mod path;
pub mod reservation;

pub use board::generate_board;
pub use cell::{Cell, Direction, Player, PortalId, Position};
pub use error::{BoardError, MoveError};
pub use game::{Game, GameEvent, GameMode, GamePhase, GameResult, Move};
pub use grid::Grid;
pub use path::{BallPath, Step, StepAction};
pub use reservation::ColumnReservation;
