use super::*;

const ROOK_ENDGAME: &str = "8/8/8/8/8/7R/3K4/k7 w - - 0 1";

fn store(fen: &str) -> NodeStore {
    NodeStore::create_root(Position::from_fen(fen).unwrap())
}

fn expand_first(store: &mut NodeStore, parent: NodeId) -> NodeId {
    let mv = store.untried_moves(parent)[0];
    let position = store.get(parent).position.apply(mv);
    store.add_child(parent, mv, position, None)
}

#[test]
fn test_root_node() {
    let store = store(ROOK_ENDGAME);
    let root = store.get(store.root());

    assert_eq!(store.len(), 1);
    assert!(root.parent.is_none());
    assert!(root.incoming_move.is_none());
    assert_eq!(root.depth, 0);
    assert!(root.is_leaf());
    assert!(!root.is_terminal());
    assert!(root.mean_value().is_none());
    assert!(!root.is_fully_expanded());
}

#[test]
fn test_add_child_links_both_ways() {
    let mut store = store(ROOK_ENDGAME);
    let root = store.root();
    let child = expand_first(&mut store, root);

    assert_eq!(child, NodeId(1));
    assert_eq!(store.get(child).parent, Some(root));
    assert_eq!(store.get(child).depth, 1);
    let mv = store.get(child).incoming_move.unwrap();
    assert_eq!(store.child(root, mv), Some(child));
    assert_eq!(store.children(root).collect::<Vec<_>>(), vec![child]);
    assert!(!store.untried_moves(root).contains(&mv));
}

#[test]
fn test_fully_expanded_after_every_move() {
    let mut store = store(ROOK_ENDGAME);
    let root = store.root();
    let total = store.get(root).legal_moves().len();

    for _ in 0..total {
        assert!(!store.is_fully_expanded(root));
        expand_first(&mut store, root);
    }

    assert!(store.is_fully_expanded(root));
    assert!(store.untried_moves(root).is_empty());
    assert_eq!(store.len(), total + 1);
}

#[test]
fn test_ancestors_walk_to_root() {
    let mut store = store(ROOK_ENDGAME);
    let root = store.root();
    let a = expand_first(&mut store, root);
    let b = expand_first(&mut store, a);
    let c = expand_first(&mut store, b);

    assert_eq!(store.ancestors(c).collect::<Vec<_>>(), vec![c, b, a, root]);
    assert_eq!(store.get(c).depth, 3);
}

#[test]
fn test_prior_is_kept_apart_from_simulations() {
    let mut store = store(ROOK_ENDGAME);
    let root = store.root();
    let mv = store.untried_moves(root)[0];
    let position = store.get(root).position.apply(mv);
    let child = store.add_child(root, mv, position, Some(Prior::with_mean(10, 0.5)));

    let node = store.get(child);
    assert_eq!(node.visits, 0);
    assert_eq!(node.total_visits(), 10);
    assert!((node.mean_value().unwrap() - 0.5).abs() < 1e-9);

    store.update(child, 1.0);
    let node = store.get(child);
    assert_eq!(node.visits, 1);
    assert_eq!(node.total_visits(), 11);
    assert!((node.mean_value().unwrap() - 6.0 / 11.0).abs() < 1e-9);
}

#[test]
fn test_forced_mate_flag() {
    let mut store = store("7k/5Q2/6K1/8/8/8/8/8 w - - 0 1");
    let root = store.root();
    let root_pos = store.get(root).position.clone();

    let mate = root_pos.parse_uci_move("f7g7").unwrap();
    let quiet = root_pos.parse_uci_move("f7f6").unwrap();
    let mate_id = store.add_child(root, mate, root_pos.apply(mate), None);
    let quiet_id = store.add_child(root, quiet, root_pos.apply(quiet), None);

    assert!(store.get(mate_id).is_forced_mate);
    assert!(store.get(mate_id).is_terminal());
    assert!(!store.get(quiet_id).is_forced_mate);
    assert!(!store.get(root).is_forced_mate);
}

#[test]
fn test_positions_are_not_aliased() {
    // Shuffling the rook out and back reaches the same placement twice,
    // but every tree node is distinct.
    let mut store = store(ROOK_ENDGAME);
    let root = store.root();
    let mut current = root;
    for uci in ["h3h4", "a1b1", "h4h3", "b1a1"] {
        let pos = store.get(current).position.clone();
        let mv = pos.parse_uci_move(uci).unwrap();
        current = store.add_child(current, mv, pos.apply(mv), None);
    }

    assert_ne!(current, root);
    assert_eq!(
        store.get(current).position.placement_key(),
        store.get(root).position.placement_key()
    );
    assert_eq!(store.len(), 5);
}
