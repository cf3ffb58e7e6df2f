//! Seeded board generation
//!
//! Same seed and config always give the same board. The top row is kept free
//! of features so every column can hold a dormant ball in hard mode.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::cell::{Cell, Direction, PortalId, Position};
use super::error::BoardError;
use super::grid::Grid;
use crate::tuning::GameConfig;

/// Build a board with the configured boxes and portal pairs
pub fn generate_board(config: &GameConfig, seed: u64) -> Result<Grid, BoardError> {
    config.validate()?;

    let mut grid = Grid::new(config.grid_size)?;
    let mut rng = Pcg32::seed_from_u64(seed);
    let size = config.grid_size;

    // Portals first: they need two free cells in the same row
    for pair in 0..config.portal_pairs {
        let rows: Vec<usize> = (1..size)
            .filter(|&row| empty_columns(&grid, row).len() >= 2)
            .collect();
        if rows.is_empty() {
            return Err(BoardError::TooManyFeatures {
                features: config.box_count + 2 * config.portal_pairs,
                size,
            });
        }
        let row = rows[rng.random_range(0..rows.len())];
        let mut cols = empty_columns(&grid, row);
        let a = cols.swap_remove(rng.random_range(0..cols.len()));
        let b = cols.swap_remove(rng.random_range(0..cols.len()));

        let id = PortalId(pair as u8);
        grid.put(Position::new(row, a), Cell::Portal(id));
        grid.put(Position::new(row, b), Cell::Portal(id));
        log::debug!("Portal {} at row {} columns {} and {}", id, row, a, b);
    }

    for _ in 0..config.box_count {
        let free: Vec<Position> = (1..size)
            .flat_map(|row| (0..size).map(move |col| Position::new(row, col)))
            .filter(|&p| grid.at(p) == Cell::Empty)
            .collect();
        if free.is_empty() {
            return Err(BoardError::TooManyFeatures {
                features: config.box_count + 2 * config.portal_pairs,
                size,
            });
        }
        let pos = free[rng.random_range(0..free.len())];
        let direction = if rng.random_bool(0.5) {
            Direction::Left
        } else {
            Direction::Right
        };
        grid.put(pos, Cell::Box(direction));
    }

    log::info!(
        "Generated {}x{} board: {} boxes, {} portal pairs (seed {})",
        size,
        size,
        config.box_count,
        config.portal_pairs,
        seed
    );
    Ok(grid)
}

fn empty_columns(grid: &Grid, row: usize) -> Vec<usize> {
    (0..grid.size())
        .filter(|&col| grid.at(Position::new(row, col)) == Cell::Empty)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(grid: &Grid, pred: impl Fn(&Cell) -> bool) -> usize {
        grid.cells().iter().flatten().filter(|c| pred(c)).count()
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = GameConfig::default();
        let a = generate_board(&config, 42).unwrap();
        let b = generate_board(&config, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_feature_counts() {
        let config = GameConfig {
            grid_size: 8,
            box_count: 10,
            portal_pairs: 3,
            ..GameConfig::default()
        };
        let grid = generate_board(&config, 7).unwrap();

        assert_eq!(count(&grid, |c| matches!(c, Cell::Box(_))), 10);
        assert_eq!(count(&grid, |c| matches!(c, Cell::Portal(_))), 6);
        // Top row stays clear
        assert!(grid.cells()[0].iter().all(|c| *c == Cell::Empty));
        // Every column starts open
        assert_eq!(grid.droppable_columns().len(), 8);
    }

    #[test]
    fn test_generated_board_passes_layout_checks() {
        let config = GameConfig {
            grid_size: 5,
            box_count: 4,
            portal_pairs: 2,
            ..GameConfig::default()
        };
        for seed in 0..50 {
            let grid = generate_board(&config, seed).unwrap();
            let reparsed = Grid::from_cells(grid.cells()).unwrap();
            assert_eq!(reparsed, grid);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            box_count: 100,
            ..GameConfig::default()
        };
        assert!(generate_board(&config, 1).is_err());
    }
}
