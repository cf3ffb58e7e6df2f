//! Board value types: players, cells and positions

use serde::{Deserialize, Serialize};

/// One of the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    /// The opponent
    pub fn other(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Index for per-player arrays
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::One => write!(f, "Player 1"),
            Player::Two => write!(f, "Player 2"),
        }
    }
}

/// Horizontal push applied by a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Column after the push, `None` when it would leave the board
    pub fn apply(self, col: usize, size: usize) -> Option<usize> {
        match self {
            Direction::Left => col.checked_sub(1),
            Direction::Right => (col + 1 < size).then_some(col + 1),
        }
    }
}

/// Identifier shared by the two cells of a portal pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortalId(pub u8);

impl std::fmt::Display for PortalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Box(Direction),
    Ball(Player),
    /// Reserved ball waiting to be released (hard mode)
    DormantBall(Player),
    Portal(PortalId),
}

impl Cell {
    /// True for cells a falling ball cannot enter
    pub fn is_occupied(&self) -> bool {
        matches!(self, Cell::Ball(_) | Cell::DormantBall(_))
    }

    /// Text layout symbol
    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Box(Direction::Left) => '<',
            Cell::Box(Direction::Right) => '>',
            Cell::Ball(Player::One) => 'X',
            Cell::Ball(Player::Two) => 'O',
            Cell::DormantBall(Player::One) => 'x',
            Cell::DormantBall(Player::Two) => 'o',
            Cell::Portal(id) => char::from_digit(u32::from(id.0) % 10, 10).unwrap_or('?'),
        }
    }

    /// Parse a text layout symbol
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Cell::Empty),
            '<' => Some(Cell::Box(Direction::Left)),
            '>' => Some(Cell::Box(Direction::Right)),
            'X' => Some(Cell::Ball(Player::One)),
            'O' => Some(Cell::Ball(Player::Two)),
            'x' => Some(Cell::DormantBall(Player::One)),
            'o' => Some(Cell::DormantBall(Player::Two)),
            _ => symbol
                .to_digit(10)
                .map(|d| Cell::Portal(PortalId(d as u8))),
        }
    }
}

/// A (row, col) grid coordinate, row 0 at the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The cell directly below
    pub const fn below(self) -> Self {
        Self::new(self.row + 1, self.col)
    }
}
