use super::*;
use crate::tree::Prior;
use endgame_core::Position;

const MATE_IN_ONE: &str = "7k/5Q2/6K1/8/8/8/8/8 w - - 0 1";
const ROOK_ENDGAME: &str = "8/8/8/8/8/7R/3K4/k7 w - - 0 1";

fn store(fen: &str) -> NodeStore {
    NodeStore::create_root(Position::from_fen(fen).unwrap())
}

fn play(store: &mut NodeStore, parent: NodeId, uci: &str, prior: Option<Prior>) -> NodeId {
    let pos = store.get(parent).position.clone();
    let mv = pos.parse_uci_move(uci).unwrap();
    store.add_child(parent, mv, pos.apply(mv), prior)
}

fn expand_all(store: &mut NodeStore, parent: NodeId) -> Vec<NodeId> {
    let pos = store.get(parent).position.clone();
    store
        .untried_moves(parent)
        .into_iter()
        .map(|mv| store.add_child(parent, mv, pos.apply(mv), None))
        .collect()
}

#[test]
fn test_depth_penalty_is_monotonic_and_bounded() {
    assert_eq!(depth_penalty(0, 0.1), 0.0);
    let mut last = 0.0;
    for d in 1..50 {
        let p = depth_penalty(d, 0.1);
        assert!(p > last);
        assert!(p < 0.1);
        last = p;
    }
}

#[test]
fn test_fresh_root_is_the_frontier() {
    let store = store(ROOK_ENDGAME);
    let selection = select(&store, &MctsConfig::default());
    assert_eq!(selection.leaf, store.root());
    assert_eq!(selection.path.len(), 1);
    assert_eq!(selection.path[0].priority, None);
}

#[test]
fn test_stops_at_partially_expanded_node() {
    let mut store = store(ROOK_ENDGAME);
    let root = store.root();
    let child = play(&mut store, root, "h3h4", None);
    store.update(root, 0.0);
    store.update(child, 0.0);

    assert_eq!(select(&store, &MctsConfig::default()).leaf, root);
}

#[test]
fn test_unvisited_child_is_tried_first() {
    let mut store = store(ROOK_ENDGAME);
    let root = store.root();
    let children = expand_all(&mut store, root);
    for &c in &children[..children.len() - 1] {
        store.update(c, 1.0);
        store.update(root, -1.0);
    }
    let unvisited = *children.last().unwrap();

    let selection = select(&store, &MctsConfig::default());
    assert_eq!(selection.leaf, unvisited);
    assert_eq!(selection.path[1].priority, Some(f64::INFINITY));
}

#[test]
fn test_best_child_prefers_higher_value() {
    let mut store = store(ROOK_ENDGAME);
    let root = store.root();
    let children = expand_all(&mut store, root);
    for &c in &children {
        store.update(c, 0.0);
        store.update(root, 0.0);
    }
    let favourite = children[children.len() / 2];
    store.update(favourite, 1.0);
    store.update(favourite, 1.0);
    store.update(root, -1.0);
    store.update(root, -1.0);

    let config = MctsConfig::default().with_exploration(0.0);
    assert_eq!(best_child(&store, root, &config).map(|(c, _)| c), Some(favourite));
}

#[test]
fn test_ties_go_to_first_child() {
    let mut store = store(ROOK_ENDGAME);
    let root = store.root();
    let children = expand_all(&mut store, root);
    for &c in &children {
        store.update(c, 0.5);
        store.update(root, -0.5);
    }

    assert_eq!(
        best_child(&store, root, &MctsConfig::default()).map(|(c, _)| c),
        Some(children[0])
    );
}

#[test]
fn test_forced_mate_short_circuits_selection() {
    let mut store = store(MATE_IN_ONE);
    let root = store.root();
    let quiet = play(&mut store, root, "f7f6", Some(Prior::with_mean(10, 0.9)));
    let mate = play(&mut store, root, "f7g7", Some(Prior::with_mean(50, 1000.0)));
    store.update(quiet, 1.0);
    store.update(root, -1.0);

    let selection = select(&store, &MctsConfig::default());
    assert_eq!(selection.leaf, mate);
    assert_eq!(
        selection.path[1].priority,
        Some(MATE_PRIORITY - 1.0)
    );
}

#[test]
fn test_shallower_mate_has_higher_priority() {
    let mut store = store(MATE_IN_ONE);
    let root = store.root();
    let mate_prior = Some(Prior::with_mean(50, 1000.0));

    let shallow = play(&mut store, root, "f7g7", mate_prior);
    let quiet = play(&mut store, root, "f7f6", None);
    let reply = play(&mut store, quiet, "h8g8", None);
    let deep = play(&mut store, reply, "f6g7", mate_prior);

    assert!(store.get(deep).is_forced_mate);
    assert_eq!(store.get(deep).depth, 3);

    let config = MctsConfig::default();
    let shallow_priority = child_priority(store.get(shallow), 100, &config);
    let deep_priority = child_priority(store.get(deep), 100, &config);
    assert!(shallow_priority > deep_priority);
    assert!(deep_priority > 1e11);
}

#[test]
fn test_terminal_leaf_ends_the_walk() {
    let mut store = store(MATE_IN_ONE);
    let root = store.root();
    let mate = play(&mut store, root, "f7g7", Some(Prior::with_mean(50, 1000.0)));
    store.update(mate, 1.0);
    store.update(root, -1.0);

    let selection = select(&store, &MctsConfig::default());
    assert_eq!(selection.leaf, mate);
    assert!(store.get(selection.leaf).is_terminal());
    assert_eq!(selection.path.len(), 2);
}
