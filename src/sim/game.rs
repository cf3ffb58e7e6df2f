//! Turn and phase state machine
//!
//! Normal mode is plain alternating drops. Hard mode runs reservation rounds:
//! each player secretly reserves a column, dormant balls are placed on top of
//! the reserved columns, then players release them in turn. Every entry point
//! validates first and mutates only on success.

use serde::{Deserialize, Serialize};

use super::board::generate_board;
use super::cell::{Cell, Player, Position};
use super::error::{BoardError, MoveError};
use super::grid::Grid;
use super::path::BallPath;
use super::reservation::ColumnReservation;
use crate::tuning::GameConfig;

/// Rule set, chosen before the game starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Normal,
    HardMode,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Normal => "normal",
            GameMode::HardMode => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Some(GameMode::Normal),
            "hard" | "hardmode" | "hard_mode" => Some(GameMode::HardMode),
            _ => None,
        }
    }
}

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Hard mode: players pick a column in secret
    ColumnReservationPhase,
    /// Hard mode: dormant balls go on top of reserved columns
    BallPlacementPhase,
    /// Hard mode: players release their dormant balls
    BallReleasePhase,
    /// Plain alternating drops
    Playing,
    GameOver,
}

/// Outcome once the game is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Winner(Player),
    Draw,
}

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    BallDropped { player: Player, column: usize, resting: Position },
    ColumnSecured { column: usize, player: Player },
    ColumnReserved { column: usize, player: Player },
    DormantBallPlaced { column: usize, player: Player },
    ReservationReleased { column: usize, player: Player },
    /// Column got secured before the reservation was released; ball refunded
    ReservationForfeited { column: usize, player: Player },
    PhaseChanged { from: GamePhase, to: GamePhase },
    GameOver { result: GameResult },
}

/// A move in any phase, for move generation and replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Drop(usize),
    Reserve(usize),
    Place { column: usize, player: Player },
    Release(usize),
}

/// One game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    mode: GameMode,
    config: GameConfig,
    grid: Grid,
    phase: GamePhase,
    current_player: Player,
    balls_remaining: [u32; 2],
    reservation: ColumnReservation,
    /// Starts the current reservation round; alternates between rounds
    round_starter: Player,
    rounds_completed: u32,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl Game {
    /// Start a game on a freshly generated board
    pub fn new(mode: GameMode, config: GameConfig, seed: u64) -> Result<Self, BoardError> {
        let grid = generate_board(&config, seed)?;
        Self::with_grid(mode, config, grid)
    }

    /// Start a game on a prepared board. The board size overrides the config.
    pub fn with_grid(mode: GameMode, mut config: GameConfig, grid: Grid) -> Result<Self, BoardError> {
        if config.balls_per_player == 0 {
            return Err(BoardError::NoBalls);
        }
        config.grid_size = grid.size();

        let mut game = Self {
            mode,
            balls_remaining: [config.balls_per_player; 2],
            config,
            grid,
            phase: GamePhase::Playing,
            current_player: Player::One,
            reservation: ColumnReservation::new(),
            round_starter: Player::One,
            rounds_completed: 0,
            events: Vec::new(),
        };

        match mode {
            GameMode::Normal => {
                if game.is_terminal() {
                    game.finish_game();
                }
            }
            GameMode::HardMode => game.begin_reservation_round(),
        }
        game.events.clear();

        log::info!(
            "New {} game on a {}x{} board, phase {:?}",
            mode.as_str(),
            game.grid.size(),
            game.grid.size(),
            game.phase
        );
        Ok(game)
    }

    // === Accessors ===

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn column_reservation(&self) -> &ColumnReservation {
        &self.reservation
    }

    pub fn balls_remaining(&self, player: Player) -> u32 {
        self.balls_remaining[player.index()]
    }

    /// Columns secured by `player`
    pub fn score(&self, player: Player) -> usize {
        self.grid.secured_count(player)
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Winner or draw, once the game is over
    pub fn result(&self) -> Option<GameResult> {
        self.is_over().then(|| {
            let one = self.score(Player::One);
            let two = self.score(Player::Two);
            match one.cmp(&two) {
                std::cmp::Ordering::Greater => GameResult::Winner(Player::One),
                std::cmp::Ordering::Less => GameResult::Winner(Player::Two),
                std::cmp::Ordering::Equal => GameResult::Draw,
            }
        })
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Legality probes (pure) ===

    /// Whether the current player may send a ball down `column` right now
    pub fn can_drop_in_column(&self, column: usize) -> bool {
        match self.phase {
            GamePhase::Playing => self.has_balls(self.current_player) && self.grid.can_drop_in_column(column),
            GamePhase::BallReleasePhase => match self.reservation.owner(column) {
                Some(owner) => owner == self.current_player,
                None => {
                    self.config.open_drops_during_release
                        && self.has_balls(self.current_player)
                        && self.grid.can_drop_in_column(column)
                }
            },
            _ => false,
        }
    }

    /// Whether the current player may reserve `column` right now
    pub fn can_reserve_column(&self, column: usize) -> bool {
        self.phase == GamePhase::ColumnReservationPhase
            && self.check_reserve(column, self.current_player).is_ok()
    }

    /// Every move the acting player(s) could make now
    pub fn legal_moves(&self) -> Vec<Move> {
        let columns = 0..self.grid.size();
        match self.phase {
            GamePhase::ColumnReservationPhase => columns
                .filter(|&c| self.can_reserve_column(c))
                .map(Move::Reserve)
                .collect(),
            GamePhase::BallPlacementPhase => self
                .reservation
                .release_order(self.round_starter)
                .into_iter()
                .filter(|&(column, _)| !self.has_dormant_ball(column))
                .map(|(column, player)| Move::Place { column, player })
                .collect(),
            GamePhase::BallReleasePhase => columns
                .filter(|&c| self.can_drop_in_column(c))
                .map(|c| {
                    if self.reservation.owner(c).is_some() {
                        Move::Release(c)
                    } else {
                        Move::Drop(c)
                    }
                })
                .collect(),
            GamePhase::Playing => columns
                .filter(|&c| self.can_drop_in_column(c))
                .map(Move::Drop)
                .collect(),
            GamePhase::GameOver => Vec::new(),
        }
    }

    // === Moves ===

    /// Apply any move, returning the ball path for drops and releases
    pub fn apply_move(&mut self, mv: Move) -> Result<Option<BallPath>, MoveError> {
        match mv {
            Move::Drop(column) => self.drop_ball(column).map(Some),
            Move::Reserve(column) => self.reserve_column(column, self.current_player).map(|_| None),
            Move::Place { column, player } => self.place_dormant_ball(column, player).map(|_| None),
            Move::Release(column) => self.release_reserved_ball(column).map(Some),
        }
    }

    /// Drop a ball for the current player
    pub fn drop_ball(&mut self, column: usize) -> Result<BallPath, MoveError> {
        match self.phase {
            GamePhase::Playing => {}
            GamePhase::BallReleasePhase if self.config.open_drops_during_release => {
                if self.reservation.owner(column).is_some() {
                    return Err(MoveError::ColumnReserved { column });
                }
            }
            phase => return Err(MoveError::WrongPhase { phase }),
        }

        let player = self.current_player;
        if !self.has_balls(player) {
            return Err(MoveError::NoBallsRemaining { player });
        }

        let path = self.grid.drop_ball(column, player)?;
        self.balls_remaining[player.index()] -= 1;
        self.record_drop(&path);

        if self.phase == GamePhase::BallReleasePhase {
            self.after_release_turn(player);
        } else {
            self.after_play_turn(player);
        }
        Ok(path)
    }

    /// Reserve a column for `player` (hard mode). Commits one of their balls.
    pub fn reserve_column(&mut self, column: usize, player: Player) -> Result<(), MoveError> {
        self.expect_phase(GamePhase::ColumnReservationPhase)?;
        if player != self.current_player {
            return Err(MoveError::NotYourTurn { player });
        }
        self.check_reserve(column, player)?;

        self.reservation.reserve(column, player, &self.grid)?;
        self.balls_remaining[player.index()] -= 1;
        self.events.push(GameEvent::ColumnReserved { column, player });
        log::debug!("{} reserved column {}", player, column);

        let other = player.other();
        if self.can_reserve_any(other) {
            self.current_player = other;
        } else {
            self.current_player = self.round_starter;
            self.set_phase(GamePhase::BallPlacementPhase);
        }
        Ok(())
    }

    /// Put `player`'s dormant ball on top of their reserved column (hard mode)
    pub fn place_dormant_ball(&mut self, column: usize, player: Player) -> Result<(), MoveError> {
        self.expect_phase(GamePhase::BallPlacementPhase)?;
        match self.reservation.owner(column) {
            None => return Err(MoveError::ColumnNotReserved { column }),
            Some(owner) if owner != player => {
                return Err(MoveError::NotReservationOwner { column, player });
            }
            Some(_) => {}
        }
        if self.has_dormant_ball(column) {
            return Err(MoveError::DormantBallPlaced { column });
        }

        self.grid.place_dormant_ball(column, player)?;
        self.events.push(GameEvent::DormantBallPlaced { column, player });
        log::debug!("{} placed a dormant ball on column {}", player, column);

        let all_placed = self
            .reservation
            .reserved_column_owners()
            .keys()
            .all(|&c| self.has_dormant_ball(c));
        if all_placed {
            self.current_player = self
                .reservation
                .release_order(self.round_starter)
                .first()
                .map(|&(_, p)| p)
                .unwrap_or(self.round_starter);
            self.set_phase(GamePhase::BallReleasePhase);
        }
        Ok(())
    }

    /// Release the current player's dormant ball in `column` (hard mode)
    pub fn release_reserved_ball(&mut self, column: usize) -> Result<BallPath, MoveError> {
        self.expect_phase(GamePhase::BallReleasePhase)?;
        let player = self.current_player;
        match self.reservation.owner(column) {
            None => return Err(MoveError::ColumnNotReserved { column }),
            Some(owner) if owner != player => {
                return Err(MoveError::NotReservationOwner { column, player });
            }
            Some(_) => {}
        }

        let path = self.grid.release_dormant_ball(column, player)?;
        self.reservation.release(column)?;
        self.events.push(GameEvent::ReservationReleased { column, player });
        self.record_drop(&path);

        self.after_release_turn(player);
        Ok(path)
    }

    // === Internals ===

    fn expect_phase(&self, expected: GamePhase) -> Result<(), MoveError> {
        if self.phase != expected {
            return Err(MoveError::WrongPhase { phase: self.phase });
        }
        Ok(())
    }

    fn has_balls(&self, player: Player) -> bool {
        self.balls_remaining[player.index()] > 0
    }

    fn has_dormant_ball(&self, column: usize) -> bool {
        column < self.grid.size()
            && matches!(self.grid.at(Position::new(0, column)), Cell::DormantBall(_))
    }

    fn check_reserve(&self, column: usize, player: Player) -> Result<(), MoveError> {
        if !self.has_balls(player) {
            return Err(MoveError::NoBallsRemaining { player });
        }
        self.reservation.check_reserve(column, player, &self.grid)?;
        match self.grid.at(Position::new(0, column)) {
            Cell::Empty => Ok(()),
            cell if cell.is_occupied() => Err(MoveError::ColumnFull { column }),
            _ => Err(MoveError::TopCellBlocked { column }),
        }
    }

    fn can_reserve_any(&self, player: Player) -> bool {
        (0..self.grid.size()).any(|c| self.check_reserve(c, player).is_ok())
    }

    fn record_drop(&mut self, path: &BallPath) {
        let resting = path.resting_position();
        self.events.push(GameEvent::BallDropped {
            player: path.player,
            column: path.start_column,
            resting,
        });
        log::debug!(
            "{} dropped in column {}, rests at ({}, {})",
            path.player,
            path.start_column,
            resting.row,
            resting.col
        );

        // Only an open bottom cell can take a resting ball, so this is always a new claim
        if resting.row == self.grid.size() - 1 {
            self.events.push(GameEvent::ColumnSecured {
                column: resting.col,
                player: path.player,
            });
        }
    }

    fn is_terminal(&self) -> bool {
        if self.grid.all_columns_secured() {
            return true;
        }
        if !self.reservation.is_empty() {
            return false;
        }
        let out_of_balls = Player::ALL.iter().all(|&p| !self.has_balls(p));
        out_of_balls || self.grid.is_full()
    }

    fn after_play_turn(&mut self, player: Player) {
        if self.is_terminal() {
            self.finish_game();
            return;
        }
        let next = player.other();
        self.current_player = if self.has_balls(next) { next } else { player };
    }

    fn after_release_turn(&mut self, player: Player) {
        self.forfeit_secured_reservations();

        if self.is_terminal() {
            self.finish_game();
        } else if self.reservation.is_empty() {
            self.finish_round();
        } else {
            let next = player.other();
            self.current_player = if self.reservation.column_of(next).is_some() {
                next
            } else {
                player
            };
        }
    }

    /// Reservations on columns that got secured can never be released
    fn forfeit_secured_reservations(&mut self) {
        let lost: Vec<usize> = self
            .reservation
            .reserved_column_owners()
            .keys()
            .copied()
            .filter(|&column| self.grid.is_secured(column))
            .collect();

        for column in lost {
            self.grid.remove_dormant_ball(column);
            if let Ok(player) = self.reservation.release(column) {
                self.balls_remaining[player.index()] += 1;
                self.events.push(GameEvent::ReservationForfeited { column, player });
                log::info!("{} forfeits reservation on secured column {}", player, column);
            }
        }
    }

    fn finish_round(&mut self) {
        self.rounds_completed += 1;
        self.round_starter = self.round_starter.other();
        log::info!("Reservation round {} complete", self.rounds_completed);
        self.begin_reservation_round();
    }

    fn begin_reservation_round(&mut self) {
        self.reservation.clear();
        if self.is_terminal() {
            self.finish_game();
            return;
        }

        let starter = self.round_starter;
        let rounds_left = self
            .config
            .reservation_rounds
            .is_none_or(|max| self.rounds_completed < max);
        if rounds_left {
            for player in [starter, starter.other()] {
                if self.can_reserve_any(player) {
                    self.current_player = player;
                    self.set_phase(GamePhase::ColumnReservationPhase);
                    return;
                }
            }
        }

        self.current_player = if self.has_balls(starter) { starter } else { starter.other() };
        self.set_phase(GamePhase::Playing);
    }

    fn finish_game(&mut self) {
        self.set_phase(GamePhase::GameOver);
        if let Some(result) = self.result() {
            self.events.push(GameEvent::GameOver { result });
            log::info!(
                "Game over: {:?} ({} - {})",
                result,
                self.score(Player::One),
                self.score(Player::Two)
            );
        }
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
        log::info!("Phase {:?} -> {:?}", from, to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::path::{Step, StepAction};
    use proptest::prelude::*;

    fn normal(size: usize, balls: u32) -> Game {
        let config = GameConfig::empty_board(size).with_balls(balls);
        Game::new(GameMode::Normal, config, 1).unwrap()
    }

    fn hard(layout: &str, config: GameConfig) -> Game {
        Game::with_grid(GameMode::HardMode, config, Grid::parse(layout).unwrap()).unwrap()
    }

    fn snapshot(game: &Game) -> String {
        serde_json::to_string(game).unwrap()
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(GameMode::from_str("normal"), Some(GameMode::Normal));
        assert_eq!(GameMode::from_str(" Hard "), Some(GameMode::HardMode));
        assert_eq!(GameMode::from_str("hard_mode"), Some(GameMode::HardMode));
        assert_eq!(GameMode::from_str("nightmare"), None);
        assert_eq!(GameMode::from_str(GameMode::HardMode.as_str()), Some(GameMode::HardMode));
    }

    #[test]
    fn test_normal_game_alternates() {
        let mut game = normal(6, 5);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.current_player(), Player::One);

        let path = game.drop_ball(2).unwrap();
        assert_eq!(path.steps.len(), 6);
        assert_eq!(path.steps.last().unwrap().action, StepAction::Settle);
        assert_eq!(game.grid().column_winners()[2], Some(Player::One));
        assert!(!game.can_drop_in_column(2));
        assert_eq!(game.balls_remaining(Player::One), 4);
        assert_eq!(game.current_player(), Player::Two);
        assert_eq!(game.score(Player::One), 1);

        assert_eq!(game.drop_ball(2), Err(MoveError::ColumnSecured { column: 2 }));
        assert_eq!(game.current_player(), Player::Two);
    }

    #[test]
    fn test_events_for_drop() {
        let mut game = normal(4, 3);
        game.drop_ball(0).unwrap();
        assert_eq!(
            game.drain_events(),
            vec![
                GameEvent::BallDropped { player: Player::One, column: 0, resting: Position::new(3, 0) },
                GameEvent::ColumnSecured { column: 0, player: Player::One },
            ]
        );
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_rejection_leaves_state_untouched() {
        let mut game = normal(4, 3);
        game.drop_ball(1).unwrap();
        let before = snapshot(&game);

        assert!(game.drop_ball(1).is_err());
        assert!(game.drop_ball(9).is_err());
        assert!(game.reserve_column(0, Player::Two).is_err());
        assert!(game.place_dormant_ball(0, Player::Two).is_err());
        assert!(game.release_reserved_ball(0).is_err());
        assert_eq!(snapshot(&game), before);
    }

    #[test]
    fn test_hard_mode_rejections_leave_state_untouched() {
        let mut game = hard(
            "
            ....
            ....
            ....
            ....
            ",
            GameConfig::empty_board(4).with_balls(3).with_reservation_rounds(1),
        );

        // Reservation
        game.reserve_column(1, Player::One).unwrap();
        let before = snapshot(&game);
        assert!(game.reserve_column(1, Player::Two).is_err());
        assert!(game.reserve_column(2, Player::One).is_err());
        assert!(game.reserve_column(9, Player::Two).is_err());
        assert!(game.drop_ball(2).is_err());
        assert_eq!(snapshot(&game), before);

        // Placement
        game.reserve_column(3, Player::Two).unwrap();
        let before = snapshot(&game);
        assert!(game.place_dormant_ball(1, Player::Two).is_err());
        assert!(game.place_dormant_ball(0, Player::One).is_err());
        assert!(game.release_reserved_ball(1).is_err());
        assert_eq!(snapshot(&game), before);

        game.place_dormant_ball(1, Player::One).unwrap();
        let before = snapshot(&game);
        assert!(game.place_dormant_ball(1, Player::One).is_err());
        assert_eq!(snapshot(&game), before);

        // Release
        game.place_dormant_ball(3, Player::Two).unwrap();
        assert_eq!(game.phase(), GamePhase::BallReleasePhase);
        let before = snapshot(&game);
        assert!(game.release_reserved_ball(3).is_err());
        assert!(game.release_reserved_ball(0).is_err());
        assert!(game.reserve_column(0, Player::One).is_err());
        assert!(game.drop_ball(0).is_err());
        assert_eq!(snapshot(&game), before);

        game.release_reserved_ball(1).unwrap();
        assert_eq!(game.current_player(), Player::Two);
    }

    #[test]
    fn test_game_over_when_all_columns_secured() {
        let mut game = normal(2, 5);
        game.drop_ball(0).unwrap();
        game.drop_ball(1).unwrap();

        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(game.result(), Some(GameResult::Draw));
        assert_eq!(game.drop_ball(0), Err(MoveError::WrongPhase { phase: GamePhase::GameOver }));
        assert!(game.legal_moves().is_empty());
    }

    #[test]
    fn test_game_over_when_out_of_balls() {
        let mut game = normal(5, 1);
        game.drop_ball(0).unwrap();
        assert_eq!(game.phase(), GamePhase::Playing);
        game.drop_ball(0).unwrap_err();
        game.drop_ball(3).unwrap();

        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(game.result(), Some(GameResult::Draw));
    }

    #[test]
    fn test_alternation_until_balls_run_out() {
        let config = GameConfig::empty_board(5).with_balls(2);
        let mut game = Game::with_grid(GameMode::Normal, config, Grid::new(5).unwrap()).unwrap();
        game.drop_ball(0).unwrap(); // P1: 1 left
        game.drop_ball(1).unwrap(); // P2: 1 left
        game.drop_ball(2).unwrap(); // P1: 0 left
        assert_eq!(game.current_player(), Player::Two);
        game.drop_ball(3).unwrap(); // P2: 0 left
        assert!(game.is_over());
        assert_eq!(game.result(), Some(GameResult::Draw));
    }

    #[test]
    fn test_winner_by_secured_columns() {
        let layout = "
            ....
            ....
            .>..
            ....
        ";
        let config = GameConfig::empty_board(4).with_balls(4);
        let mut game = Game::with_grid(GameMode::Normal, config, Grid::parse(layout).unwrap()).unwrap();
        game.drop_ball(1).unwrap(); // P1 pushed into 2, secures 2
        game.drop_ball(0).unwrap(); // P2 secures 0
        game.drop_ball(3).unwrap(); // P1 secures 3
        let path = game.drop_ball(1).unwrap(); // P2 pushed into 2, stacks
        assert_eq!(path.resting_position(), Position::new(2, 2));
        let path = game.drop_ball(1).unwrap(); // P1: box blocked, falls straight
        assert_eq!(path.redirect_count(), 0);

        assert_eq!(game.score(Player::One), 3);
        assert_eq!(game.score(Player::Two), 1);
        assert!(game.is_over());
        assert_eq!(game.result(), Some(GameResult::Winner(Player::One)));
    }

    #[test]
    fn test_hard_mode_full_round() {
        let mut game = hard(
            "
            ....
            ....
            ....
            ....
            ",
            GameConfig::empty_board(4).with_balls(3).with_reservation_rounds(1),
        );
        assert_eq!(game.phase(), GamePhase::ColumnReservationPhase);
        assert!(!game.can_drop_in_column(0));

        game.reserve_column(1, Player::One).unwrap();
        assert_eq!(
            game.reserve_column(1, Player::Two),
            Err(MoveError::ColumnReserved { column: 1 })
        );
        assert_eq!(
            game.reserve_column(2, Player::One),
            Err(MoveError::NotYourTurn { player: Player::One })
        );
        game.reserve_column(3, Player::Two).unwrap();
        assert_eq!(game.phase(), GamePhase::BallPlacementPhase);
        assert_eq!(game.balls_remaining(Player::One), 2);

        assert_eq!(
            game.place_dormant_ball(1, Player::Two),
            Err(MoveError::NotReservationOwner { column: 1, player: Player::Two })
        );
        game.place_dormant_ball(1, Player::One).unwrap();
        assert_eq!(
            game.place_dormant_ball(1, Player::One),
            Err(MoveError::DormantBallPlaced { column: 1 })
        );
        game.place_dormant_ball(3, Player::Two).unwrap();
        assert_eq!(game.phase(), GamePhase::BallReleasePhase);
        assert_eq!(game.current_player(), Player::One);

        assert!(game.can_drop_in_column(1));
        assert!(!game.can_drop_in_column(3));
        assert!(!game.can_drop_in_column(0));
        assert_eq!(
            game.release_reserved_ball(3),
            Err(MoveError::NotReservationOwner { column: 3, player: Player::One })
        );
        assert_eq!(game.drop_ball(0), Err(MoveError::WrongPhase { phase: GamePhase::BallReleasePhase }));

        let path = game.release_reserved_ball(1).unwrap();
        assert_eq!(path.steps[0], Step::fall(Position::new(0, 1)));
        assert_eq!(path.resting_position(), Position::new(3, 1));
        assert_eq!(game.current_player(), Player::Two);
        assert_eq!(game.column_reservation().owner(1), None);

        game.release_reserved_ball(3).unwrap();
        assert_eq!(game.rounds_completed(), 1);
        // Round loop exhausted: plain play, next round starter moves first
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.current_player(), Player::Two);
        assert!(game.column_reservation().is_empty());
    }

    #[test]
    fn test_hard_mode_rounds_repeat_with_alternating_starter() {
        let mut game = hard(
            "
            ...
            ...
            ...
            ",
            GameConfig::empty_board(3).with_balls(4),
        );
        game.reserve_column(0, Player::One).unwrap();
        game.reserve_column(1, Player::Two).unwrap();
        game.place_dormant_ball(0, Player::One).unwrap();
        game.place_dormant_ball(1, Player::Two).unwrap();
        game.release_reserved_ball(0).unwrap();
        game.release_reserved_ball(1).unwrap();

        assert_eq!(game.phase(), GamePhase::ColumnReservationPhase);
        assert_eq!(game.current_player(), Player::Two);
        assert!(!game.can_reserve_column(0));
        assert!(game.can_reserve_column(2));
    }

    #[test]
    fn test_forfeit_refunds_ball() {
        // P1's release rides the box into column 2, securing P2's reserved column
        let mut game = hard(
            "
            ...
            .>.
            ...
            ",
            GameConfig::empty_board(3).with_balls(2).with_reservation_rounds(1),
        );
        game.reserve_column(1, Player::One).unwrap();
        game.reserve_column(2, Player::Two).unwrap();
        game.place_dormant_ball(1, Player::One).unwrap();
        game.place_dormant_ball(2, Player::Two).unwrap();
        game.drain_events();

        let path = game.release_reserved_ball(1).unwrap();
        assert_eq!(path.resting_position(), Position::new(2, 2));

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::ReservationForfeited { column: 2, player: Player::Two }));
        assert_eq!(game.balls_remaining(Player::Two), 2);
        assert_eq!(game.grid().cell(Position::new(0, 2)), Some(Cell::Empty));
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.current_player(), Player::Two);
    }

    #[test]
    fn test_open_drops_during_release() {
        let mut game = hard(
            "
            ....
            ....
            ....
            ....
            ",
            GameConfig::empty_board(4).with_balls(3).with_open_drops(),
        );
        game.reserve_column(0, Player::One).unwrap();
        game.reserve_column(1, Player::Two).unwrap();
        game.place_dormant_ball(0, Player::One).unwrap();
        game.place_dormant_ball(1, Player::Two).unwrap();

        assert!(game.can_drop_in_column(3));
        assert!(!game.can_drop_in_column(1));
        assert_eq!(game.drop_ball(1), Err(MoveError::ColumnReserved { column: 1 }));

        game.drop_ball(3).unwrap();
        assert_eq!(game.phase(), GamePhase::BallReleasePhase);
        assert_eq!(game.current_player(), Player::Two);
        assert_eq!(game.column_reservation().len(), 2);
    }

    #[test]
    fn test_hard_mode_without_reservable_columns_plays_plainly() {
        let game = hard(
            "
            <>
            ..
            ",
            GameConfig::empty_board(2),
        );
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(game.can_drop_in_column(0));
    }

    fn play_out(mut game: Game, picks: &[usize]) -> Game {
        let mut i = 0;
        let limit = 10_000;
        while !game.is_over() && i < limit {
            let moves = game.legal_moves();
            assert!(!moves.is_empty(), "no legal move in {:?}", game.phase());
            let mv = moves[picks[i % picks.len()] % moves.len()];
            game.apply_move(mv).unwrap();
            i += 1;
        }
        game
    }

    #[test]
    fn test_seeded_self_play_is_deterministic() {
        let config = GameConfig::default();
        let a = play_out(Game::new(GameMode::HardMode, config.clone(), 99).unwrap(), &[3, 1, 4, 1, 5]);
        let b = play_out(Game::new(GameMode::HardMode, config, 99).unwrap(), &[3, 1, 4, 1, 5]);
        assert!(a.is_over());
        assert_eq!(snapshot(&a), snapshot(&b));
    }

    proptest! {
        #[test]
        fn prop_random_games_finish(
            seed in 0u64..1000,
            hard_mode in any::<bool>(),
            open in any::<bool>(),
            picks in prop::collection::vec(0usize..32, 1..20),
        ) {
            let mut config = GameConfig::default();
            config.open_drops_during_release = open;
            let mode = if hard_mode { GameMode::HardMode } else { GameMode::Normal };
            let game = Game::new(mode, config, seed).unwrap();
            let game = play_out(game, &picks);

            prop_assert!(game.is_over());
            prop_assert!(game.result().is_some());
            prop_assert!(game.column_reservation().is_empty());
            let secured = game.score(Player::One) + game.score(Player::Two);
            prop_assert_eq!(secured, game.grid().column_winners().iter().filter(|w| w.is_some()).count());
        }
    }
}
