use std::sync::Arc;

use anyhow::{Result, ensure};
use rand::{SeedableRng, rngs::StdRng};
use sapper_common::{
    models::{CellPosition, GameParams},
    protocol::{BoardSnapshot, EventKind, GameEvent, GameState},
};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace};
use uuid::Uuid;

use crate::{
    data::{MineField, Player},
    events::{EventBus, GameListener},
    logic::{
        field::validate_dimensions,
        saboteur::{Saboteur, TurnContext},
    },
};

/// Turn controller: owns the field, the player and the optional saboteur,
/// and tells its subscribers about every change.
pub struct MinesweeperGame {
    params: GameParams,
    field: MineField,
    player: Player,
    saboteur: Option<Box<dyn Saboteur>>,
    state: GameState,
    rng: StdRng,
    events: EventBus,
}

impl MinesweeperGame {
    #[instrument(level = "trace", skip(saboteur))]
    pub fn new(params: GameParams, saboteur: Option<Box<dyn Saboteur>>) -> Result<Self> {
        validate_dimensions(params.rows, params.columns, params.mines)?;
        let player = Player::new(params.lives)?;

        info!(
            "Creating new game: {}x{} with {} mines and {} lives{}",
            params.rows,
            params.columns,
            params.mines,
            params.lives,
            if saboteur.is_some() { ", saboteur enabled" } else { "" }
        );

        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            field: MineField::blank(params.rows, params.columns, params.mines),
            player,
            saboteur,
            state: GameState::NotStarted,
            rng,
            events: EventBus::new(),
            params,
        })
    }

    /// Deals a fresh field and restores the player's lives. Works from any
    /// state.
    #[instrument(level = "trace", skip(self))]
    pub fn start_game(&mut self) {
        self.player.reset_lives();
        self.field = MineField::blank(self.params.rows, self.params.columns, self.params.mines);
        self.field.place_mines_on_new_field(&mut self.rng);
        self.state = GameState::Playing;

        info!(
            "Game started on a {}x{} field with {} mines",
            self.params.rows,
            self.params.columns,
            self.field.mine_count()
        );
        self.emit(EventKind::GameStarted);
    }

    /// Starts playing on a prepared field instead of a random one.
    #[instrument(level = "trace", skip(self, field))]
    pub fn start_with_field(&mut self, field: MineField) -> Result<()> {
        ensure!(
            field.rows() == self.params.rows && field.columns() == self.params.columns,
            "field is {}x{} but the game expects {}x{}",
            field.rows(),
            field.columns(),
            self.params.rows,
            self.params.columns
        );

        self.player.reset_lives();
        self.field = field;
        self.state = GameState::Playing;

        info!("Game started on a prepared field");
        self.emit(EventKind::GameStarted);
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn open_cell(&mut self, pos: CellPosition) {
        if self.state != GameState::Playing {
            return;
        }
        match self.field.cell(pos) {
            Some(cell) if !cell.is_open() && !cell.is_flagged() => {}
            _ => {
                trace!("Ignoring open at {}", pos);
                return;
            }
        }

        let hit_mine = self.field.open_cell_recursive(pos);
        self.emit_at(EventKind::CellUpdated, pos);

        if hit_mine {
            self.player.lose_life();
            self.field.decrement_mine_count();
            info!("Mine hit at {}, {} lives left", pos, self.player.lives());
            self.emit(EventKind::LivesChanged);

            if !self.player.has_lives() {
                self.state = GameState::Lost;
                self.reveal_all_mines();
                info!("Game lost");
                self.emit(EventKind::GameOverLost);
                return;
            }
        } else {
            self.check_win_condition();
            if self.state == GameState::Won {
                return;
            }
        }

        self.run_saboteur(hit_mine);
    }

    #[instrument(level = "trace", skip(self))]
    pub fn toggle_flag(&mut self, pos: CellPosition) {
        if self.state != GameState::Playing {
            return;
        }
        let Some(cell) = self.field.cell_mut(pos) else {
            return;
        };
        if cell.is_open() {
            return;
        }

        cell.toggle_flag();
        debug!("Flag at {} is now {}", pos, if cell.is_flagged() { "set" } else { "cleared" });
        self.emit_at(EventKind::CellUpdated, pos);
    }

    fn run_saboteur(&mut self, hit_mine: bool) {
        let Some(saboteur) = self.saboteur.as_mut() else {
            return;
        };

        let context = TurnContext {
            params: &self.params,
            player: &self.player,
            state: self.state,
        };
        if !saboteur.perform_action(&mut self.field, &context) {
            return;
        }

        self.emit(EventKind::SaboteurAction);
        self.emit(EventKind::FieldUpdated);

        if !hit_mine {
            self.check_win_condition();
        }
    }

    /// Winning means every cell that was not a mine at the start is open.
    /// The configured mine count is used, not the live counter.
    fn check_win_condition(&mut self) {
        if self.state != GameState::Playing {
            return;
        }

        let target = self.params.total_cells() - self.params.mines;
        if self.field.number_of_opened_cells() == target {
            self.state = GameState::Won;
            info!("Game won with {} lives left", self.player.lives());
            self.emit(EventKind::GameOverWon);
        }
    }

    fn reveal_all_mines(&mut self) {
        let revealed = self.field.reveal_all_mines();
        debug!("Revealed {} remaining mines", revealed);
        self.emit(EventKind::FieldUpdated);
    }

    fn emit(&self, kind: EventKind) {
        self.events.emit(GameEvent::new(kind));
    }

    fn emit_at(&self, kind: EventKind, pos: CellPosition) {
        self.events.emit(GameEvent::at(kind, pos));
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn field(&self) -> &MineField {
        &self.field
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn params(&self) -> &GameParams {
        &self.params
    }

    /// Live mine counter, lowered by every detonation.
    pub fn mines_remaining(&self) -> usize {
        self.field.mine_count()
    }

    pub fn has_saboteur(&self) -> bool {
        self.saboteur.is_some()
    }

    pub fn subscribe(&self, listener: Arc<dyn GameListener>) -> Uuid {
        self.events.subscribe(listener)
    }

    pub fn subscribe_channel(&self) -> (Uuid, mpsc::UnboundedReceiver<GameEvent>) {
        self.events.subscribe_channel()
    }

    pub fn unsubscribe(&self, id: &Uuid) -> bool {
        self.events.unsubscribe(id)
    }

    /// Handle to the subscriber list, usable from inside a listener.
    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            rows: self.params.rows,
            columns: self.params.columns,
            mines_remaining: self.field.mine_count(),
            lives: self.player.lives(),
            state: self.state,
            field: self.field.snapshot_cells(),
        }
    }
}
