//! Board state and ball trajectory resolution
//!
//! Cells are stored row-major, row 0 at the top. Balls enter at row 0 and
//! fall toward row `size - 1`. A ball resting on the bottom row secures its
//! column for the dropping player, permanently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Player, PortalId, Position};
use super::error::{BoardError, MoveError};
use super::path::{BallPath, Step, StepAction};
use crate::consts::{MAX_GRID_SIZE, MIN_GRID_SIZE};

/// N x N board with static features and column ownership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
    column_winners: Vec<Option<Player>>,
}

impl Grid {
    /// Create an empty board
    pub fn new(size: usize) -> Result<Self, BoardError> {
        check_size(size)?;
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size * size],
            column_winners: vec![None; size],
        })
    }

    /// Build a board from rows of cells.
    ///
    /// Balls already resting on the bottom row secure their column.
    pub fn from_cells(rows: Vec<Vec<Cell>>) -> Result<Self, BoardError> {
        let size = rows.len();
        check_size(size)?;

        let mut cells = Vec::with_capacity(size * size);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != size {
                return Err(BoardError::RaggedRow { row, len: line.len(), size });
            }
            cells.extend(line);
        }

        let mut grid = Self {
            size,
            cells,
            column_winners: vec![None; size],
        };
        grid.validate_layout()?;

        for col in 0..size {
            if let Cell::Ball(owner) = grid.at(Position::new(size - 1, col)) {
                grid.column_winners[col] = Some(owner);
            }
        }
        Ok(grid)
    }

    /// Parse a text layout, one line per row.
    ///
    /// `.` empty, `<`/`>` boxes, `0`-`9` portals, `X`/`O` resting balls.
    /// Whitespace inside a line is ignored.
    pub fn parse(layout: &str) -> Result<Self, BoardError> {
        let mut rows = Vec::new();
        for (row, line) in layout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .enumerate()
        {
            let mut cells = Vec::new();
            for (col, symbol) in line.chars().filter(|c| !c.is_whitespace()).enumerate() {
                let cell = Cell::from_symbol(symbol)
                    .ok_or(BoardError::UnknownSymbol { symbol, row, col })?;
                cells.push(cell);
            }
            rows.push(cells);
        }
        Self::from_cells(rows)
    }

    fn validate_layout(&self) -> Result<(), BoardError> {
        let mut portals: BTreeMap<PortalId, Vec<Position>> = BTreeMap::new();
        for pos in self.positions() {
            match self.at(pos) {
                Cell::DormantBall(_) => {
                    return Err(BoardError::DormantBallInLayout { row: pos.row, col: pos.col });
                }
                Cell::Portal(id) => portals.entry(id).or_default().push(pos),
                _ => {}
            }
        }

        for (id, ends) in portals {
            if ends.len() != 2 {
                return Err(BoardError::UnpairedPortal { id, count: ends.len() });
            }
            if ends[0].row != ends[1].row {
                return Err(BoardError::PortalRowMismatch {
                    id,
                    first: ends[0].row,
                    second: ends[1].row,
                });
            }
        }
        Ok(())
    }

    // === Snapshot accessors ===

    pub fn size(&self) -> usize {
        self.size
    }

    /// Read-only cell snapshot, row-major
    pub fn cells(&self) -> Vec<Vec<Cell>> {
        self.cells.chunks(self.size).map(<[Cell]>::to_vec).collect()
    }

    pub fn column_winners(&self) -> &[Option<Player>] {
        &self.column_winners
    }

    pub fn column_winner(&self, column: usize) -> Option<Player> {
        self.column_winners.get(column).copied().flatten()
    }

    /// Cell at `pos`, or None off the board
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        if pos.row >= self.size || pos.col >= self.size {
            return None;
        }
        self.cells.get(pos.row * self.size + pos.col).copied()
    }

    /// Unchecked lookup for positions already known to be on the board
    pub(crate) fn at(&self, pos: Position) -> Cell {
        self.cells[pos.row * self.size + pos.col]
    }

    fn set_cell(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.row * self.size + pos.col] = cell;
    }

    /// Place a feature on the board (used by board generation)
    pub(crate) fn put(&mut self, pos: Position, cell: Cell) {
        self.set_cell(pos, cell);
    }

    fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Position::new(row, col)))
    }

    // === Column queries ===

    pub fn is_secured(&self, column: usize) -> bool {
        self.column_winner(column).is_some()
    }

    pub fn all_columns_secured(&self) -> bool {
        self.column_winners.iter().all(Option::is_some)
    }

    /// Number of columns secured by `player`
    pub fn secured_count(&self, player: Player) -> usize {
        self.column_winners
            .iter()
            .filter(|w| **w == Some(player))
            .count()
    }

    /// Whether a new ball may enter this column
    pub fn can_drop_in_column(&self, column: usize) -> bool {
        self.check_drop(column).is_ok()
    }

    /// Columns that currently accept a drop
    pub fn droppable_columns(&self) -> Vec<usize> {
        (0..self.size).filter(|&c| self.can_drop_in_column(c)).collect()
    }

    /// No column accepts another ball
    pub fn is_full(&self) -> bool {
        self.droppable_columns().is_empty()
    }

    fn check_column(&self, column: usize) -> Result<(), MoveError> {
        if column >= self.size {
            return Err(MoveError::ColumnOutOfRange { column, size: self.size });
        }
        Ok(())
    }

    fn check_drop(&self, column: usize) -> Result<(), MoveError> {
        self.check_column(column)?;
        if self.is_secured(column) {
            return Err(MoveError::ColumnSecured { column });
        }
        if self.at(Position::new(0, column)).is_occupied() {
            return Err(MoveError::ColumnFull { column });
        }
        Ok(())
    }

    // === Mutations ===

    /// Drop a ball into `column`, settle it and return its full path
    pub fn drop_ball(&mut self, column: usize, player: Player) -> Result<BallPath, MoveError> {
        self.check_drop(column)?;
        Ok(self.settle_ball(column, player))
    }

    /// Compute the path a drop would take without changing the board
    pub fn preview_path(&self, column: usize, player: Player) -> Result<BallPath, MoveError> {
        self.check_drop(column)?;
        Ok(BallPath {
            player,
            start_column: column,
            steps: self.trace(column),
        })
    }

    /// Put a dormant ball on top of `column`
    pub fn place_dormant_ball(&mut self, column: usize, player: Player) -> Result<(), MoveError> {
        self.check_drop(column)?;
        let top = Position::new(0, column);
        if self.at(top) != Cell::Empty {
            return Err(MoveError::TopCellBlocked { column });
        }
        self.set_cell(top, Cell::DormantBall(player));
        Ok(())
    }

    /// Turn `player`'s dormant ball on top of `column` into a falling ball
    pub fn release_dormant_ball(
        &mut self,
        column: usize,
        player: Player,
    ) -> Result<BallPath, MoveError> {
        self.check_column(column)?;
        match self.at(Position::new(0, column)) {
            Cell::DormantBall(owner) if owner == player => {}
            Cell::DormantBall(_) => return Err(MoveError::NotReservationOwner { column, player }),
            _ => return Err(MoveError::NoDormantBall { column }),
        }
        if self.is_secured(column) {
            return Err(MoveError::ColumnSecured { column });
        }

        self.set_cell(Position::new(0, column), Cell::Empty);
        Ok(self.settle_ball(column, player))
    }

    /// Take a dormant ball off the board, returning its owner
    pub fn remove_dormant_ball(&mut self, column: usize) -> Option<Player> {
        if column >= self.size {
            return None;
        }
        let top = Position::new(0, column);
        match self.at(top) {
            Cell::DormantBall(owner) => {
                self.set_cell(top, Cell::Empty);
                Some(owner)
            }
            _ => None,
        }
    }

    fn settle_ball(&mut self, column: usize, player: Player) -> BallPath {
        let steps = self.trace(column);
        let rest = steps
            .last()
            .map(|s| s.position)
            .unwrap_or(Position::new(0, column));

        self.set_cell(rest, Cell::Ball(player));
        if rest.row == self.size - 1 {
            // First writer wins
            let winner = &mut self.column_winners[rest.col];
            if winner.is_none() {
                *winner = Some(player);
                log::debug!("{} secured column {}", player, rest.col);
            }
        }

        BallPath {
            player,
            start_column: column,
            steps,
        }
    }

    // === Trajectory ===

    /// Follow a ball entering at the top of `column` to its resting cell.
    ///
    /// Rows never decrease: boxes push sideways within a row and portal pairs
    /// share a row. A redirect is always followed by a downward check, so the
    /// feature in the landing cell is not triggered.
    fn trace(&self, column: usize) -> Vec<Step> {
        let mut pos = Position::new(0, column);
        let mut steps = vec![Step::fall(pos)];
        let mut redirected = false;

        loop {
            if !redirected {
                if let Some(target) = self.redirect_target(pos) {
                    steps.push(Step::redirect(target));
                    pos = target;
                    redirected = true;
                    continue;
                }
            }

            let below = pos.below();
            if below.row < self.size && !self.at(below).is_occupied() {
                steps.push(Step::fall(below));
                pos = below;
                redirected = false;
            } else {
                break;
            }
        }

        // The last descent is the settle itself
        let len = steps.len();
        match steps.last_mut() {
            Some(last) if len > 1 && last.action == StepAction::Fall => {
                last.action = StepAction::Settle;
            }
            _ => steps.push(Step::settle(pos)),
        }
        steps
    }

    /// Where the feature at `pos` sends the ball, if anywhere
    fn redirect_target(&self, pos: Position) -> Option<Position> {
        let target = match self.at(pos) {
            Cell::Box(direction) => Position::new(pos.row, direction.apply(pos.col, self.size)?),
            Cell::Portal(id) => self.portal_exit(id, pos)?,
            _ => return None,
        };
        (!self.at(target).is_occupied()).then_some(target)
    }

    /// The other end of a portal, if it is still on the board
    fn portal_exit(&self, id: PortalId, from: Position) -> Option<Position> {
        let row = from.row;
        (0..self.size)
            .map(|col| Position::new(row, col))
            .find(|&p| p != from && self.at(p) == Cell::Portal(id))
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.size) {
            let line: String = row.iter().map(Cell::symbol).collect();
            writeln!(f, "{}", line)?;
        }
        let footer: String = self
            .column_winners
            .iter()
            .map(|w| match w {
                Some(Player::One) => '1',
                Some(Player::Two) => '2',
                None => '-',
            })
            .collect();
        write!(f, "{}", footer)
    }
}

fn check_size(size: usize) -> Result<(), BoardError> {
    if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size) {
        return Err(BoardError::InvalidSize {
            size,
            min: MIN_GRID_SIZE,
            max: MAX_GRID_SIZE,
        });
    }
    Ok(())
}
