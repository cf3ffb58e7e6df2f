//! Column Drop entry point
//!
//! Natively this plays a seeded self-play match and prints the board after
//! every move. The browser build starts from `platform::web` instead.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use column_drop::audio::{AudioManager, NullSink};
    use column_drop::sim::{GameResult, Move};
    use column_drop::{Game, GameConfig, GameMode};

    env_logger::init();

    let mut seed: u64 = 1;
    let mut mode = GameMode::Normal;
    for arg in std::env::args().skip(1) {
        if let Some(parsed) = GameMode::from_str(arg.trim_start_matches("--")) {
            mode = parsed;
        } else if let Ok(parsed) = arg.parse() {
            seed = parsed;
        } else {
            eprintln!("usage: column-drop [--hard|--normal] [seed]");
            std::process::exit(2);
        }
    }

    log::info!("Column Drop (native) starting: {} mode, seed {}", mode.as_str(), seed);

    let mut game = match Game::new(mode, GameConfig::default(), seed) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("failed to start game: {}", e);
            std::process::exit(1);
        }
    };
    let mut audio = AudioManager::new(NullSink);
    let mut rng = Pcg32::seed_from_u64(seed.wrapping_add(1));

    println!("{}\n", game.grid());

    while !game.is_over() {
        let moves = game.legal_moves();
        if moves.is_empty() {
            log::warn!("No legal moves in {:?}", game.phase());
            break;
        }
        let mv = moves[rng.random_range(0..moves.len())];
        let actor = game.current_player();

        match game.apply_move(mv) {
            Ok(Some(path)) => {
                let rest = path.resting_position();
                println!(
                    "{} {:?}: rests at ({}, {}) after {} steps, {} redirects",
                    actor,
                    mv,
                    rest.row,
                    rest.col,
                    path.steps.len(),
                    path.redirect_count()
                );
                println!("{}\n", game.grid());
            }
            // Reservations stay secret, only placements show on the board
            Ok(None) => match mv {
                Move::Reserve(_) => println!("{} reserved a column", actor),
                Move::Place { column, player } => {
                    println!("{} placed a dormant ball in column {}", player, column)
                }
                _ => {}
            },
            Err(e) => {
                log::warn!("Rejected {:?}: {}", mv, e);
                break;
            }
        }
        audio.handle_events(&game.drain_events());
    }

    match game.result() {
        Some(GameResult::Winner(player)) => println!("{} wins", player),
        Some(GameResult::Draw) => println!("Draw"),
        None => println!("Game stopped early"),
    }
    for player in column_drop::Player::ALL {
        println!("{}: {} columns", player, game.score(player));
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
