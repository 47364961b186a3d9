use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use sapper_common::{models::GameParams, protocol::GameState};
use tracing::{debug, info, warn};

use crate::data::{MineField, Player};

/// Read-only view of the game handed to a saboteur while it holds the field.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub params: &'a GameParams,
    pub player: &'a Player,
    pub state: GameState,
}

/// A board mutation that runs after every player move that leaves the game
/// in progress. Returns whether the field was changed.
pub trait Saboteur: Send {
    fn perform_action(&mut self, field: &mut MineField, game: &TurnContext<'_>) -> bool;
}

/// Moves one random unopened mine onto a random closed cell bordering the
/// opened region.
#[derive(Debug)]
pub struct RelocatingSaboteur {
    rng: StdRng,
}

impl RelocatingSaboteur {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RelocatingSaboteur {
    fn default() -> Self {
        Self::new()
    }
}

impl Saboteur for RelocatingSaboteur {
    fn perform_action(&mut self, field: &mut MineField, _game: &TurnContext<'_>) -> bool {
        let active_mines = field.active_mines();
        let mut spots = field.boundary_cells_for_relocation();

        if active_mines.is_empty() || spots.is_empty() {
            debug!(
                "Saboteur idle: {} active mines, {} relocation spots",
                active_mines.len(),
                spots.len()
            );
            return false;
        }

        let mine = active_mines[self.rng.random_range(0..active_mines.len())];
        spots.shuffle(&mut self.rng);
        let Some(target) = spots.into_iter().find(|spot| *spot != mine) else {
            debug!("Saboteur idle: no spot other than {} itself", mine);
            return false;
        };

        if field.relocate_mine(mine, target) {
            info!("Saboteur moved a mine from {} to {}", mine, target);
            true
        } else {
            warn!("Saboteur failed to move the mine from {} to {}", mine, target);
            false
        }
    }
}
