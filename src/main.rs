use std::sync::Arc;

use anyhow::Result;
use rand::{Rng, SeedableRng, rngs::StdRng};
use sapper::{
    CellPosition, EventKind, GameEvent, GameState, MinesweeperGame, RelocatingSaboteur, Saboteur,
    config::SapperConfig,
};
use tracing::{debug, info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    info!("Starting sapper autoplay");

    let config = SapperConfig::from_env();
    let seed = config.params.seed;

    let saboteur: Option<Box<dyn Saboteur>> = if config.saboteur {
        Some(Box::new(match seed {
            Some(seed) => RelocatingSaboteur::seeded(seed.wrapping_add(1)),
            None => RelocatingSaboteur::new(),
        }))
    } else {
        None
    };

    let mut game = MinesweeperGame::new(config.params.clone(), saboteur)?;
    game.subscribe(Arc::new(|event: &GameEvent| match event.kind {
        EventKind::GameOverWon | EventKind::GameOverLost | EventKind::SaboteurAction => {
            info!("Event: {:?}", event.kind)
        }
        _ => debug!("Event: {:?} at {:?}", event.kind, event.position),
    }));
    game.start_game();

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(2)),
        None => StdRng::from_os_rng(),
    };

    let mut moves = 0;
    while game.state() == GameState::Playing && moves < config.max_moves {
        let candidates: Vec<CellPosition> = game
            .field()
            .cells()
            .filter(|cell| !cell.is_open() && !cell.is_flagged())
            .map(|cell| cell.position())
            .collect();
        if candidates.is_empty() {
            warn!("No closed cells left to open");
            break;
        }

        let pos = candidates[rng.random_range(0..candidates.len())];
        game.open_cell(pos);
        moves += 1;
    }

    info!(
        "Finished after {} moves: {:?}, {} lives left, {} mines remaining",
        moves,
        game.state(),
        game.player().lives(),
        game.mines_remaining()
    );
    info!("Final board:\n{}", game.field());
    println!("{}", serde_json::to_string_pretty(&game.snapshot())?);

    Ok(())
}
