//! Secret column reservations for hard mode

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cell::Player;
use super::error::MoveError;
use super::grid::Grid;

/// Columns reserved this round, keyed by column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnReservation {
    reserved_column_owners: BTreeMap<usize, Player>,
}

impl ColumnReservation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `column` for `player`.
    ///
    /// One reservation per column and one column per player per round.
    pub fn reserve(&mut self, column: usize, player: Player, grid: &Grid) -> Result<(), MoveError> {
        self.check_reserve(column, player, grid)?;
        self.reserved_column_owners.insert(column, player);
        Ok(())
    }

    /// Check a reservation without making it
    pub fn check_reserve(&self, column: usize, player: Player, grid: &Grid) -> Result<(), MoveError> {
        if column >= grid.size() {
            return Err(MoveError::ColumnOutOfRange { column, size: grid.size() });
        }
        if grid.is_secured(column) {
            return Err(MoveError::ColumnSecured { column });
        }
        if self.reserved_column_owners.contains_key(&column) {
            return Err(MoveError::ColumnReserved { column });
        }
        if self.column_of(player).is_some() {
            return Err(MoveError::AlreadyReserved { player });
        }
        Ok(())
    }

    /// Remove the reservation on `column`, returning who held it
    pub fn release(&mut self, column: usize) -> Result<Player, MoveError> {
        self.reserved_column_owners
            .remove(&column)
            .ok_or(MoveError::ColumnNotReserved { column })
    }

    /// Drop all reservations (round boundary)
    pub fn clear(&mut self) {
        self.reserved_column_owners.clear();
    }

    pub fn owner(&self, column: usize) -> Option<Player> {
        self.reserved_column_owners.get(&column).copied()
    }

    /// The column `player` holds this round
    pub fn column_of(&self, player: Player) -> Option<usize> {
        self.reserved_column_owners
            .iter()
            .find(|(_, owner)| **owner == player)
            .map(|(column, _)| *column)
    }

    pub fn reserved_column_owners(&self) -> &BTreeMap<usize, Player> {
        &self.reserved_column_owners
    }

    pub fn is_empty(&self) -> bool {
        self.reserved_column_owners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reserved_column_owners.len()
    }

    /// Reservations in release order: the round starter first, then the opponent
    pub fn release_order(&self, starter: Player) -> Vec<(usize, Player)> {
        [starter, starter.other()]
            .into_iter()
            .filter_map(|p| self.column_of(p).map(|c| (c, p)))
            .collect()
    }
}
