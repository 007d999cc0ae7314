//! Tests for the concurrent DFS vs BFS race
//!
//! Who wins is scheduler dependent, so only invariants are asserted.

use std::thread;

use dungeon::domain::{
    bfs_racing, dfs_racing, race, EscapePlacement, FoundFlag, RandomSpec, Strategy, TreeArena,
    TreeBuilder,
};
use dungeon::util::testing::init_test_setup;

fn random(node_count: usize, seed: u64, placement: EscapePlacement) -> TreeArena {
    TreeBuilder::new()
        .generate(&RandomSpec {
            node_count,
            escape_value: 5,
            seed: Some(seed),
            placement,
        })
        .unwrap()
        .tree
}

#[test]
fn given_forced_escape_when_racing_repeatedly_then_exactly_one_finder() {
    init_test_setup();
    // escape value 5 may also be drawn at random, presence is what matters
    for seed in 0..100 {
        let tree = random(1000, seed, EscapePlacement::Always);

        let outcome = race(&tree, 5);

        let finder = outcome.finder.expect("escape is present, someone must find it");
        assert!(matches!(finder, Strategy::Dfs | Strategy::Bfs));
        assert!(
            (1..=1000).contains(&outcome.dfs_moves),
            "seed {seed}: dfs moves {}",
            outcome.dfs_moves
        );
        assert!(
            (1..=1000).contains(&outcome.bfs_moves),
            "seed {seed}: bfs moves {}",
            outcome.bfs_moves
        );
        assert!(["DFS", "BFS"].contains(&outcome.finder_label().as_str()));
    }
}

#[test]
fn given_many_races_then_losing_leg_always_moves() {
    // the leg that starts second still takes its first step
    let tree = random(1000, 21, EscapePlacement::Always);
    for _ in 0..200 {
        let outcome = race(&tree, 5);
        assert!(outcome.dfs_moves >= 1 && outcome.bfs_moves >= 1, "{outcome:?}");
    }
}

#[test]
fn given_absent_escape_when_racing_then_both_exhaust_the_dungeon() {
    let tree = TreeBuilder::new().parse("1 2 3\n2 4 5").unwrap();

    let outcome = race(&tree, 99);

    assert_eq!(outcome.finder, None);
    assert_eq!(outcome.finder_label(), "None");
    assert_eq!(outcome.bfs_moves, 5);
    assert_eq!(outcome.dfs_moves, 5);
}

#[test]
fn given_race_then_source_tree_is_untouched() {
    let tree = random(200, 3, EscapePlacement::Always);
    let before: Vec<i64> = tree.iter().map(|(_, n)| n.value).collect();

    race(&tree, 5);

    let after: Vec<i64> = tree.iter().map(|(_, n)| n.value).collect();
    assert_eq!(before, after);
}

#[test]
fn given_one_flag_claimed_by_many_threads_then_only_one_wins() {
    let flag = FoundFlag::new();
    let winners = thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| flag.try_claim())).collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count()
    });
    assert_eq!(winners, 1);
    assert!(flag.is_set());
}

#[test]
fn given_racers_sharing_a_flag_on_same_tree_then_never_both_found() {
    // Both legs search dungeons where the escape sits at the root: both match
    // on their first move, only one may claim it.
    for _ in 0..200 {
        let tree = TreeBuilder::new().parse("5 1 2").unwrap();
        let dfs_tree = tree.deep_clone();
        let bfs_tree = tree.deep_clone();
        let flag = FoundFlag::new();

        let (d, b) = thread::scope(|s| {
            let d = s.spawn(|| dfs_racing(&dfs_tree, 5, &flag));
            let b = s.spawn(|| bfs_racing(&bfs_tree, 5, &flag));
            (d.join().unwrap(), b.join().unwrap())
        });

        assert!(d.found ^ b.found, "dfs {d:?}, bfs {b:?}");
    }
}

#[test]
fn given_flag_already_claimed_then_racers_stop_after_first_move() {
    let tree = random(1000, 8, EscapePlacement::Never);
    let flag = FoundFlag::new();
    assert!(flag.try_claim());

    let d = dfs_racing(&tree, 5_000, &flag);
    let b = bfs_racing(&tree, 5_000, &flag);

    assert!(!d.found && !b.found);
    assert_eq!(d.moves, 1);
    assert_eq!(b.moves, 1);
}
