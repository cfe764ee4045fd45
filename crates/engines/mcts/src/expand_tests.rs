use super::*;
use endgame_core::{MemoryTablebase, Wdl};

const MATE_IN_ONE: &str = "7k/5Q2/6K1/8/8/8/8/8 w - - 0 1";
const ROOK_ENDGAME: &str = "8/8/8/8/8/7R/3K4/k7 w - - 0 1";
const STALEMATE: &str = "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1";

fn store(fen: &str) -> NodeStore {
    NodeStore::create_root(Position::from_fen(fen).unwrap())
}

#[test]
fn test_terminal_node_is_returned_unchanged() {
    let mut store = store(STALEMATE);
    let root = store.root();
    let expansion = expand(&mut store, root, &MctsConfig::default(), None, Color::Black);

    assert_eq!(expansion.target, root);
    assert!(!expansion.created);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_every_mate_gets_a_child() {
    let mut store = store(MATE_IN_ONE);
    let root = store.root();
    let config = MctsConfig::default();
    let expansion = expand(&mut store, root, &config, None, Color::White);

    // Qe8, Qf8, Qg7 and Qh7 all mate.
    assert_eq!(expansion.mates_created, 4);
    assert_eq!(store.len(), 5);
    assert_eq!(expansion.target, store.children(root).next().unwrap());
    assert_eq!(expansion.prior_mean, Some(config.mate_value));

    for child in store.children(root) {
        let node = store.get(child);
        assert!(node.is_forced_mate);
        assert!(node.position.is_checkmate());
        assert_eq!(node.total_visits(), config.mate_prior_visits);
        assert_eq!(node.visits, 0);
    }
}

#[test]
fn test_heuristic_expansion_creates_one_child() {
    let mut store = store(ROOK_ENDGAME);
    let root = store.root();
    let config = MctsConfig::default();
    let expansion = expand(&mut store, root, &config, None, Color::White);

    // Ra3+ both checks and closes in on the cornered king.
    assert_eq!(expansion.mv.as_deref(), Some("h3a3"));
    assert_eq!(expansion.mates_created, 0);
    assert_eq!(expansion.depth, 1);
    assert_eq!(store.len(), 2);

    let child = store.get(expansion.target);
    assert!(child.position.is_check());
    assert_eq!(child.total_visits(), config.prior_visits);
    assert_eq!(expansion.prior_mean, Some(config.check_prior_value));
}

#[test]
fn test_quiet_child_has_no_prior() {
    let mut store = store(ROOK_ENDGAME);
    let root = store.root();
    let config = MctsConfig::default();

    let mut quiet = None;
    for _ in 0..store.get(root).legal_moves().len() {
        let expansion = expand(&mut store, root, &config, None, Color::White);
        if !store.get(expansion.target).position.is_check() {
            quiet = Some(expansion);
            break;
        }
    }

    let expansion = quiet.expect("some root move is quiet");
    assert_eq!(expansion.prior_mean, None);
    assert_eq!(store.get(expansion.target).total_visits(), 0);
}

#[test]
fn test_repeated_expansion_tries_new_moves() {
    let mut store = store(ROOK_ENDGAME);
    let root = store.root();
    let config = MctsConfig::default();
    let total = store.get(root).legal_moves().len();

    let mut seen = Vec::new();
    for _ in 0..total {
        let expansion = expand(&mut store, root, &config, None, Color::White);
        assert!(expansion.created);
        assert!(!seen.contains(&expansion.mv));
        seen.push(expansion.mv);
    }
    assert!(store.is_fully_expanded(root));

    let guard = expand(&mut store, root, &config, None, Color::White);
    assert!(!guard.created);
    assert_eq!(guard.target, root);
    assert_eq!(store.len(), total + 1);
}

#[test]
fn test_tablebase_prior_overrides_check_prior() {
    let root_pos = Position::from_fen(ROOK_ENDGAME).unwrap();
    let after = root_pos.apply(root_pos.parse_uci_move("h3a3").unwrap());
    let mut tb = MemoryTablebase::new();
    tb.insert(&after, Wdl::Loss, Some(20));

    let mut store = NodeStore::create_root(root_pos);
    let root = store.root();
    let config = MctsConfig::default();
    let expansion = expand(&mut store, root, &config, Some(&tb), Color::White);

    // Black to move and lost: a win for the root side, seen from White's move.
    let prior = store.get(expansion.target).prior;
    assert_eq!(prior.visits, config.prior_visits);
    assert_eq!(prior.mean(), Some(config.tablebase_prior_scale));
    assert!((prior.value_sum - config.tablebase_prior_scale * f64::from(config.prior_visits)).abs() < 1e-9);
}

#[test]
fn test_tablebase_prior_sign_follows_depth() {
    let pos = Position::from_fen("8/8/8/8/8/R7/3K4/k7 b - - 1 1").unwrap();
    let mut tb = MemoryTablebase::new();
    tb.insert(&pos, Wdl::Loss, None);
    let config = MctsConfig::default();

    let odd = tablebase_prior(&pos, 1, &tb, Color::White, &config).unwrap();
    let even = tablebase_prior(&pos, 2, &tb, Color::White, &config).unwrap();
    assert!(odd.value_sum > 0.0);
    assert_eq!(even.value_sum, -odd.value_sum);

    let drawn = {
        let mut tb = MemoryTablebase::new();
        tb.insert(&pos, Wdl::Draw, None);
        tablebase_prior(&pos, 1, &tb, Color::White, &config).unwrap()
    };
    assert_eq!(drawn.value_sum, 0.0);
    assert_eq!(drawn.visits, config.prior_visits);

    assert!(tablebase_prior(&pos, 1, &MemoryTablebase::new(), Color::White, &config).is_none());
}
