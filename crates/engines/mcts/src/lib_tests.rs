use super::*;

fn engine() -> MctsEngine {
    MctsEngine::new(MctsConfig::for_testing()).with_seed(5)
}

#[test]
fn mcts_engine_returns_legal_move() {
    let mut engine = engine();
    let pos = Position::from_fen("8/8/8/8/8/7R/3K4/k7 w - - 0 1").unwrap();

    let result = engine.search(&pos, SearchLimits::millis(100));

    let mv = result.best_move.unwrap();
    assert!(pos.legal_moves().contains(&mv));
    assert!(result.iterations > 0);
    assert!((-1.0..=1.0).contains(&result.value));

    let stats = engine.last_stats().unwrap();
    assert_eq!(stats.iterations, result.iterations);
    assert_eq!(stats.best_move.as_deref(), Some(pos.move_to_uci(mv).as_str()));
}

#[test]
fn mcts_engine_finds_mate_in_one() {
    let mut engine = engine();
    let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 w - - 0 1").unwrap();

    let result = engine.search(&pos, SearchLimits::millis(100));

    assert!(result.mate_found);
    assert_eq!(result.iterations, 0);
    assert_eq!(result.value, 1.0);
    assert!(pos.apply(result.best_move.unwrap()).is_checkmate());
}

#[test]
fn mcts_engine_handles_checkmate() {
    let mut engine = engine();
    let pos = Position::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();

    let result = engine.search(&pos, SearchLimits::millis(50));

    assert!(result.best_move.is_none());
    assert_eq!(result.iterations, 0);
}

#[test]
fn mcts_engine_handles_stalemate() {
    let mut engine = engine();
    let pos = Position::from_fen("k7/8/1Q6/8/8/8/8/1K6 b - - 0 1").unwrap();

    let result = engine.search(&pos, SearchLimits::millis(50));

    assert!(result.best_move.is_none());
}

#[test]
fn mcts_engine_options() {
    let mut engine = engine();
    assert!(engine.set_option("Exploration", "1.4"));
    assert!((engine.config().exploration - 1.4).abs() < 1e-9);
    assert!(engine.set_option("RolloutPlies", "20"));
    assert_eq!(engine.config().rollout_max_plies, 20);
    assert!(engine.set_option("Seed", "99"));

    assert!(!engine.set_option("Exploration", "-3"));
    assert!(!engine.set_option("Seed", "lots"));
    assert!(!engine.set_option("Hash", "64"));
    assert!(!engine.set_option("TablebaseFile", "/nonexistent/tb.json"));
    assert!(!engine.has_tablebase());
}

#[test]
fn mcts_engine_new_game_clears_stats() {
    let mut engine = engine();
    let pos = Position::from_fen("8/8/8/8/8/7R/3K4/k7 w - - 0 1").unwrap();
    engine.search(&pos, SearchLimits::millis(20));
    assert!(engine.last_stats().is_some());

    engine.new_game();
    assert!(engine.last_stats().is_none());
}
