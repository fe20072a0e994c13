//! State machine tests - completion, game over, pause and notices

use std::path::Path;
use std::sync::{Arc, Mutex};

use tile_grid::core::{Game, GridError, LevelData, ScriptedSource, SeededSource};
use tile_grid::types::{Direction, Notice, NoticeDuration, PlayState};

fn challenge(text: &str) -> Game {
    let level = LevelData::parse(text).unwrap();
    Game::challenge(&level, Box::new(ScriptedSource::default())).unwrap()
}

fn recorder() -> (Arc<Mutex<Vec<Notice>>>, impl FnMut(Notice) + Send + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |n: Notice| sink.lock().unwrap().push(n))
}

#[test]
fn test_scenario_level_one_completes_in_one_move() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("levels/1.lvl");
    let level = LevelData::from_path(path).unwrap();
    let (seen, notifier) = recorder();
    let mut game = Game::challenge(&level, Box::new(SeededSource::new(1)))
        .unwrap()
        .with_notifier(notifier);

    assert_eq!(game.apply_move(Direction::Up), Ok(true));
    assert_eq!(game.grid().spawned_count(), 0);
    assert_eq!(game.pending_group_count(), 0);
    assert_eq!(game.moves_left(), 4);
    assert_eq!(game.state(), PlayState::Complete);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].duration, NoticeDuration::Long);
    assert_eq!(seen[0].message, "Level complete!");
}

#[test]
fn test_game_over_requires_no_pending_groups() {
    // One move left. A swap lines up three reds but they are only pending.
    let mut game = challenge("3,2,1,1,1,-1,1\nr,r,b,x,x,r");
    game.apply_swap(tile_grid::types::CellId::new(3), tile_grid::types::CellId::new(6))
        .unwrap();
    assert_eq!(game.moves_left(), 0);
    assert_eq!(game.pending_group_count(), 1);
    assert_eq!(game.state(), PlayState::Playing);

    // A move is still allowed with zero moves; it clears the reds and the
    // last blue remains, so the game is over.
    assert_eq!(game.apply_move(Direction::Left), Ok(true));
    assert_eq!(game.grid().spawned_count(), 1);
    assert_eq!(game.state(), PlayState::GameOver);
}

#[test]
fn test_terminal_states_reject_commands() {
    let mut game = challenge("2,1,1,1,1,-1,0\nx,r");
    game.apply_move(Direction::Left).unwrap();
    assert_eq!(game.state(), PlayState::GameOver);

    assert!(matches!(
        game.apply_move(Direction::Right),
        Err(GridError::IllegalStateTransition { .. })
    ));
    assert!(game.consume_undo().is_err());
    assert!(game.set_state(PlayState::Paused).is_err());
    assert_eq!(game.undo_credits(), 9);
}

#[test]
fn test_pause_preserves_grid() {
    let mut game = challenge("3,1,5,1,1,-1,0\nx,r,b");
    let before = game.snapshot();
    game.set_state(PlayState::Paused).unwrap();
    assert!(game.apply_move(Direction::Left).is_err());
    game.set_state(PlayState::Playing).unwrap();

    let mut after = game.snapshot();
    assert_eq!(after.state, PlayState::Playing);
    after.state = before.state;
    assert_eq!(after, before);
}

#[test]
fn test_timeout_is_never_entered() {
    let mut game = challenge("2,1,5,1,1,1,0\nx,r");
    assert_eq!(game.tick_time(5.0), 0.0);
    assert_eq!(game.state(), PlayState::Playing);
}

#[test]
fn test_rejection_notices() {
    let (seen, notifier) = recorder();
    let level = LevelData::parse("2,1,5,1,1,-1,0\nr,b").unwrap();
    let mut game = Game::challenge(&level, Box::new(ScriptedSource::default()))
        .unwrap()
        .with_notifier(notifier);

    assert!(game
        .apply_swap(tile_grid::types::CellId::new(1), tile_grid::types::CellId::new(2))
        .is_err());
    for _ in 0..9 {
        game.consume_undo().unwrap();
    }
    assert!(game.consume_undo().is_err());

    let messages: Vec<String> = seen.lock().unwrap().iter().map(|n| n.message.clone()).collect();
    assert_eq!(messages, vec!["No more swaps left", "No more undos left"]);
}

#[test]
fn test_classic_mode_has_no_terminal_transitions() {
    let mut game = Game::classic(4, 4, Box::new(SeededSource::new(3))).unwrap();
    for i in 0..40 {
        let direction = Direction::ALL[i % 4];
        game.apply_move(direction).unwrap();
        assert_eq!(game.state(), PlayState::Playing);
    }
    assert!(game.grid().spawned_count() <= 16);
}

#[test]
fn test_classic_swap_is_unmetered_and_spawns() {
    use tile_grid::types::{CellId, Color};

    let mut game = Game::classic(4, 4, Box::new(ScriptedSource::new([0, 0, 0, 1]))).unwrap();
    game.apply_move(Direction::Left).unwrap();
    assert_eq!(game.swaps_left(), 0);

    let tiles: Vec<(CellId, Color)> = game
        .grid()
        .cells()
        .iter()
        .filter(|c| c.color().is_solid())
        .map(|c| (c.id(), c.color()))
        .collect();
    assert_eq!(tiles.len(), 2);
    let ((a, color_a), (b, color_b)) = (tiles[0], tiles[1]);
    assert_ne!(color_a, color_b);

    assert_eq!(game.apply_swap(a, b), Ok(()));
    assert_eq!(game.grid().cell(a).unwrap().color(), color_b);
    assert_eq!(game.grid().cell(b).unwrap().color(), color_a);
    assert_eq!(game.grid().spawned_count(), 3);
    assert_eq!(game.swaps_left(), 0);
    assert_eq!(game.state(), PlayState::Playing);
}
