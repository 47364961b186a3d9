use std::sync::{Arc, Mutex};

use sapper::{
    CellPosition, EventBus, EventKind, GameEvent, GameListener, GameParams, GameState, MineField,
    MinesweeperGame, RelocatingSaboteur, Saboteur, TurnContext,
};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

fn drain(receiver: &mut UnboundedReceiver<GameEvent>) -> Vec<EventKind> {
    let mut kinds = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        kinds.push(event.kind);
    }
    kinds
}

fn prepared_field(rows: usize, columns: usize, mines: &[(i32, i32)], open: &[(i32, i32)]) -> MineField {
    let mut field = MineField::new(rows, columns, mines.len()).unwrap();
    for &(row, column) in mines {
        field.set_mine(CellPosition::new(row, column), true);
    }
    field.calculate_all_adjacent_mines();
    for &(row, column) in open {
        field
            .cell_mut(CellPosition::new(row, column))
            .unwrap()
            .set_open(true);
    }
    field
}

fn mine_position(game: &MinesweeperGame) -> CellPosition {
    let mines = game.field().active_mines();
    assert_eq!(mines.len(), 1);
    mines[0]
}

/// Counts invocations and never touches the field.
struct CountingSaboteur {
    calls: Arc<Mutex<usize>>,
}

impl Saboteur for CountingSaboteur {
    fn perform_action(&mut self, _field: &mut MineField, _game: &TurnContext<'_>) -> bool {
        *self.calls.lock().unwrap() += 1;
        false
    }
}

/// Opens one given cell on its first call, which may complete the board.
struct OpeningSaboteur {
    target: Option<CellPosition>,
}

impl Saboteur for OpeningSaboteur {
    fn perform_action(&mut self, field: &mut MineField, _game: &TurnContext<'_>) -> bool {
        match self.target.take() {
            Some(pos) => {
                field.open_cell_recursive(pos);
                true
            }
            None => false,
        }
    }
}

#[test]
fn start_game_emits_game_started() {
    let mut game = MinesweeperGame::new(GameParams::new(3, 3, 1, 1), None).unwrap();
    let (_, mut events) = game.subscribe_channel();
    assert_eq!(game.state(), GameState::NotStarted);

    game.start_game();
    assert_eq!(game.state(), GameState::Playing);
    assert_eq!(game.field().actual_mine_count(), 1);
    assert_eq!(drain(&mut events), vec![EventKind::GameStarted]);
}

#[test]
fn single_safe_cell_wins_immediately() {
    let mut game = MinesweeperGame::new(GameParams::new(1, 1, 0, 1), None).unwrap();
    game.start_game();
    let (_, mut events) = game.subscribe_channel();

    game.open_cell(CellPosition::new(0, 0));

    assert_eq!(game.state(), GameState::Won);
    assert!(game.field().cell_at(0, 0).unwrap().is_open());
    assert_eq!(
        drain(&mut events),
        vec![EventKind::CellUpdated, EventKind::GameOverWon]
    );
}

#[test]
fn single_mine_with_one_life_loses() {
    let mut game = MinesweeperGame::new(GameParams::new(1, 1, 1, 1), None).unwrap();
    game.start_game();
    let (_, mut events) = game.subscribe_channel();

    game.open_cell(CellPosition::new(0, 0));

    assert_eq!(game.state(), GameState::Lost);
    assert_eq!(game.player().lives(), 0);
    assert_eq!(game.mines_remaining(), 0);
    assert!(game.field().cell_at(0, 0).unwrap().is_open());
    assert_eq!(
        drain(&mut events),
        vec![
            EventKind::CellUpdated,
            EventKind::LivesChanged,
            EventKind::FieldUpdated,
            EventKind::GameOverLost,
        ]
    );
}

#[test]
fn surviving_a_mine_keeps_playing() {
    let mut game = MinesweeperGame::new(GameParams::new(2, 1, 1, 2), None).unwrap();
    game.start_game();
    let mine = mine_position(&game);
    let (_, mut events) = game.subscribe_channel();

    game.open_cell(mine);

    assert_eq!(game.state(), GameState::Playing);
    assert_eq!(game.player().lives(), 1);
    assert_eq!(game.mines_remaining(), 0);
    assert_eq!(
        drain(&mut events),
        vec![EventKind::CellUpdated, EventKind::LivesChanged]
    );
}

#[test]
fn losing_reveals_every_mine() {
    let mut game = MinesweeperGame::new(GameParams::new(3, 3, 3, 1), None).unwrap();
    game.start_with_field(prepared_field(3, 3, &[(0, 0), (0, 2), (2, 2)], &[]))
        .unwrap();
    let (_, mut events) = game.subscribe_channel();

    game.open_cell(CellPosition::new(0, 2));

    assert_eq!(game.state(), GameState::Lost);
    assert!(game.field().active_mines().is_empty());
    assert_eq!(game.field().number_of_opened_cells(), 3);
    assert_eq!(
        drain(&mut events),
        vec![
            EventKind::CellUpdated,
            EventKind::LivesChanged,
            EventKind::FieldUpdated,
            EventKind::GameOverLost,
        ]
    );

    // finished games ignore further input
    game.open_cell(CellPosition::new(1, 1));
    game.toggle_flag(CellPosition::new(1, 1));
    assert!(drain(&mut events).is_empty());
    assert!(!game.field().cell_at(1, 1).unwrap().is_open());
}

#[test]
fn saboteur_moves_mine_to_the_only_target() {
    // Everything but the mine, (0, 1) and (1, 0) is already open.
    let field = prepared_field(
        3,
        3,
        &[(0, 0)],
        &[(0, 2), (1, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
    );
    let mut game = MinesweeperGame::new(
        GameParams::new(3, 3, 1, 1),
        Some(Box::new(RelocatingSaboteur::seeded(17))),
    )
    .unwrap();
    game.start_with_field(field).unwrap();
    let (_, mut events) = game.subscribe_channel();

    game.open_cell(CellPosition::new(1, 0));

    assert_eq!(game.state(), GameState::Playing);
    assert!(!game.field().cell_at(0, 0).unwrap().is_mine());
    assert!(game.field().cell_at(0, 1).unwrap().is_mine());
    assert_eq!(game.field().cell_at(0, 0).unwrap().adjacent_mines(), 1);
    assert_eq!(
        drain(&mut events),
        vec![
            EventKind::CellUpdated,
            EventKind::SaboteurAction,
            EventKind::FieldUpdated,
        ]
    );

    // the vacated corner is now the last safe cell
    game.open_cell(CellPosition::new(0, 0));
    assert_eq!(game.state(), GameState::Won);
    assert_eq!(
        drain(&mut events),
        vec![EventKind::CellUpdated, EventKind::GameOverWon]
    );
}

#[test]
fn saboteur_runs_after_a_survived_detonation() {
    let calls = Arc::new(Mutex::new(0));
    let mut game = MinesweeperGame::new(
        GameParams::new(2, 2, 2, 2),
        Some(Box::new(CountingSaboteur {
            calls: calls.clone(),
        })),
    )
    .unwrap();
    game.start_with_field(prepared_field(2, 2, &[(0, 0), (1, 1)], &[]))
        .unwrap();

    game.open_cell(CellPosition::new(0, 0));
    assert_eq!(*calls.lock().unwrap(), 1);

    game.open_cell(CellPosition::new(1, 1));
    assert_eq!(game.state(), GameState::Lost);
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn saboteur_skipped_on_winning_move_and_idle_saboteur_is_silent() {
    let calls = Arc::new(Mutex::new(0));
    let mut game = MinesweeperGame::new(
        GameParams::new(1, 3, 1, 1),
        Some(Box::new(CountingSaboteur {
            calls: calls.clone(),
        })),
    )
    .unwrap();
    game.start_with_field(prepared_field(1, 3, &[(0, 0)], &[])).unwrap();
    let (_, mut events) = game.subscribe_channel();

    game.open_cell(CellPosition::new(0, 1));
    assert_eq!(*calls.lock().unwrap(), 1);
    assert_eq!(drain(&mut events), vec![EventKind::CellUpdated]);

    game.open_cell(CellPosition::new(0, 2));
    assert_eq!(game.state(), GameState::Won);
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn saboteur_action_can_complete_the_win() {
    let mut game = MinesweeperGame::new(
        GameParams::new(1, 3, 1, 1),
        Some(Box::new(OpeningSaboteur {
            target: Some(CellPosition::new(0, 2)),
        })),
    )
    .unwrap();
    game.start_with_field(prepared_field(1, 3, &[(0, 0)], &[])).unwrap();
    let (_, mut events) = game.subscribe_channel();

    game.open_cell(CellPosition::new(0, 1));

    assert_eq!(game.state(), GameState::Won);
    assert_eq!(
        drain(&mut events),
        vec![
            EventKind::CellUpdated,
            EventKind::SaboteurAction,
            EventKind::FieldUpdated,
            EventKind::GameOverWon,
        ]
    );
}

#[test]
fn win_target_ignores_the_live_mine_counter() {
    // The target stays rows * columns - 2 after a detonation lowers the live
    // counter to 1, and the detonated mine counts as an opened cell.
    let mut game = MinesweeperGame::new(GameParams::new(1, 4, 2, 2), None).unwrap();
    game.start_with_field(prepared_field(1, 4, &[(0, 0), (0, 3)], &[]))
        .unwrap();

    game.open_cell(CellPosition::new(0, 0));
    assert_eq!(game.mines_remaining(), 1);
    assert_eq!(game.state(), GameState::Playing);

    game.open_cell(CellPosition::new(0, 1));
    assert_eq!(game.field().number_of_opened_cells(), 2);
    assert_eq!(game.state(), GameState::Won);
}

#[test]
fn win_fires_only_on_exact_open_count() {
    let mut game = MinesweeperGame::new(GameParams::new(2, 2, 1, 1), None).unwrap();
    game.start_with_field(prepared_field(2, 2, &[(0, 0)], &[])).unwrap();

    for (step, pos) in [(0, 1), (1, 0)].into_iter().enumerate() {
        game.open_cell(CellPosition::new(pos.0, pos.1));
        assert_eq!(game.field().number_of_opened_cells(), step + 1);
        assert_eq!(game.state(), GameState::Playing);
    }

    game.open_cell(CellPosition::new(1, 1));
    assert_eq!(game.field().number_of_opened_cells(), 3);
    assert_eq!(game.state(), GameState::Won);
}

#[test]
fn invalid_opens_are_ignored_silently() {
    let mut game = MinesweeperGame::new(GameParams::new(3, 3, 1, 1), None).unwrap();
    game.start_with_field(prepared_field(3, 3, &[(0, 0)], &[])).unwrap();
    game.toggle_flag(CellPosition::new(2, 2));
    game.open_cell(CellPosition::new(1, 1));
    let (_, mut events) = game.subscribe_channel();

    game.open_cell(CellPosition::new(3, 3));
    game.open_cell(CellPosition::new(-1, 0));
    game.open_cell(CellPosition::new(1, 1));
    game.open_cell(CellPosition::new(2, 2));

    assert!(drain(&mut events).is_empty());
    assert_eq!(game.field().number_of_opened_cells(), 1);
    assert!(game.field().cell_at(2, 2).unwrap().is_flagged());
}

#[test]
fn toggle_flag_only_on_closed_cells() {
    let mut game = MinesweeperGame::new(GameParams::new(3, 3, 1, 1), None).unwrap();
    game.start_with_field(prepared_field(3, 3, &[(0, 0)], &[(2, 2)]))
        .unwrap();
    let (_, mut events) = game.subscribe_channel();
    let pos = CellPosition::new(1, 1);

    game.toggle_flag(pos);
    assert!(game.field().cell(pos).unwrap().is_flagged());
    let event = events.try_recv().unwrap();
    assert_eq!(event, GameEvent::at(EventKind::CellUpdated, pos));

    game.toggle_flag(pos);
    assert!(!game.field().cell(pos).unwrap().is_flagged());
    assert_eq!(drain(&mut events), vec![EventKind::CellUpdated]);

    game.toggle_flag(CellPosition::new(2, 2));
    game.toggle_flag(CellPosition::new(5, 5));
    assert!(drain(&mut events).is_empty());
    assert!(!game.field().cell_at(2, 2).unwrap().is_flagged());
}

#[test]
fn restart_resets_lives_and_field() {
    let mut game = MinesweeperGame::new(GameParams::new(2, 1, 1, 1).with_seed(8), None).unwrap();
    game.start_game();
    let mine = mine_position(&game);
    game.open_cell(mine);
    assert_eq!(game.state(), GameState::Lost);

    game.start_game();
    assert_eq!(game.state(), GameState::Playing);
    assert_eq!(game.player().lives(), 1);
    assert_eq!(game.mines_remaining(), 1);
    assert_eq!(game.field().number_of_opened_cells(), 0);
    assert_eq!(game.field().actual_mine_count(), 1);
}

#[test]
fn listeners_receive_events_in_order() {
    struct Log(Mutex<Vec<GameEvent>>);

    impl GameListener for Log {
        fn game_changed(&self, event: &GameEvent) {
            self.0.lock().unwrap().push(*event);
        }
    }

    let mut game = MinesweeperGame::new(GameParams::new(1, 1, 0, 1), None).unwrap();
    let log = Arc::new(Log(Mutex::new(Vec::new())));
    let id = game.subscribe(log.clone());

    game.start_game();
    game.open_cell(CellPosition::new(0, 0));

    assert_eq!(
        *log.0.lock().unwrap(),
        vec![
            GameEvent::new(EventKind::GameStarted),
            GameEvent::at(EventKind::CellUpdated, CellPosition::new(0, 0)),
            GameEvent::new(EventKind::GameOverWon),
        ]
    );

    assert!(game.unsubscribe(&id));
    game.start_game();
    assert_eq!(log.0.lock().unwrap().len(), 3);
}

#[test]
fn listener_can_unsubscribe_itself_through_the_game_handle() {
    struct OneShot {
        bus: EventBus,
        id: Mutex<Option<Uuid>>,
        seen: Mutex<Vec<EventKind>>,
    }

    impl GameListener for OneShot {
        fn game_changed(&self, event: &GameEvent) {
            self.seen.lock().unwrap().push(event.kind);
            if let Some(id) = self.id.lock().unwrap().take() {
                assert!(self.bus.unsubscribe(&id));
            }
        }
    }

    let mut game = MinesweeperGame::new(GameParams::new(1, 1, 0, 1), None).unwrap();
    let (_, mut events) = game.subscribe_channel();
    let one_shot = Arc::new(OneShot {
        bus: game.events(),
        id: Mutex::new(None),
        seen: Mutex::new(Vec::new()),
    });
    let id = game.subscribe(one_shot.clone());
    *one_shot.id.lock().unwrap() = Some(id);

    game.start_game();
    game.open_cell(CellPosition::new(0, 0));

    assert_eq!(*one_shot.seen.lock().unwrap(), vec![EventKind::GameStarted]);
    assert!(!game.unsubscribe(&id));
    assert_eq!(
        drain(&mut events),
        vec![
            EventKind::GameStarted,
            EventKind::CellUpdated,
            EventKind::GameOverWon,
        ]
    );
}

#[test]
fn snapshot_serializes_for_views() {
    let mut game = MinesweeperGame::new(GameParams::new(1, 2, 1, 1), None).unwrap();
    game.start_with_field(prepared_field(1, 2, &[(0, 0)], &[])).unwrap();
    game.toggle_flag(CellPosition::new(0, 0));

    let json = serde_json::to_value(game.snapshot()).unwrap();
    assert_eq!(json["state"], "PLAYING");
    assert_eq!(json["mines_remaining"], 1);
    assert_eq!(json["field"][0][0]["state"], "flagged");
    assert_eq!(json["field"][0][1]["state"], "hidden");
}
