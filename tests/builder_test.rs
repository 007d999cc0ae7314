//! Tests for TreeBuilder: random generation and description parsing

use std::path::Path;

use rstest::rstest;

use dungeon::domain::{DomainError, EscapePlacement, RandomSpec, TreeArena, TreeBuilder};
use dungeon::util::testing::init_test_setup;

fn spec(node_count: usize, seed: u64, placement: EscapePlacement) -> RandomSpec {
    RandomSpec {
        node_count,
        escape_value: 1000,
        seed: Some(seed),
        placement,
    }
}

fn values(tree: &TreeArena) -> Vec<i64> {
    tree.iter().map(|(_, n)| n.value).collect()
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(Path::new("tests/resources/dungeons").join(name)).unwrap()
}

// ============================================================
// Random generation
// ============================================================

#[rstest]
#[case(1)]
#[case(2)]
#[case(17)]
#[case(1000)]
fn given_node_count_when_generating_then_tree_has_n_nodes_and_n_minus_one_edges(
    #[case] n: usize,
) {
    init_test_setup();
    for seed in 0..10 {
        let generated = TreeBuilder::new()
            .generate(&spec(n, seed, EscapePlacement::Coin))
            .unwrap();
        let tree = &generated.tree;

        assert_eq!(tree.len(), n);
        assert_eq!(tree.edge_count(), n - 1);
        assert_eq!(tree.iter().count(), n, "every node reachable from root");
        assert!(tree.is_well_formed());
    }
}

#[test]
fn given_same_seed_when_generating_twice_then_dungeons_are_identical() {
    let builder = TreeBuilder::new();
    let a = builder.generate(&spec(300, 42, EscapePlacement::Coin)).unwrap();
    let b = builder.generate(&spec(300, 42, EscapePlacement::Coin)).unwrap();

    assert_eq!(values(&a.tree), values(&b.tree));
    assert_eq!(a.tree.depth(), b.tree.depth());
    assert_eq!(a.escape_placed, b.escape_placed);
}

#[test]
fn given_different_seeds_when_generating_then_dungeons_differ() {
    let builder = TreeBuilder::new();
    let a = builder.generate(&spec(300, 1, EscapePlacement::Never)).unwrap();
    let b = builder.generate(&spec(300, 2, EscapePlacement::Never)).unwrap();

    assert_ne!(values(&a.tree), values(&b.tree));
}

#[test]
fn given_coin_placement_when_generating_then_reported_presence_matches_tree() {
    let builder = TreeBuilder::new();
    let mut placed = 0;
    for seed in 0..64 {
        let generated = builder.generate(&spec(20, seed, EscapePlacement::Coin)).unwrap();
        assert_eq!(generated.escape_placed, generated.tree.contains(1000));
        if generated.escape_placed {
            placed += 1;
        }
    }
    // both outcomes occur over 64 seeds
    assert!(placed > 0 && placed < 64, "placed {placed} of 64");
}

#[test]
fn given_unseeded_spec_when_generating_then_still_well_formed() {
    let generated = TreeBuilder::new()
        .generate(&RandomSpec {
            node_count: 100,
            escape_value: 5,
            seed: None,
            placement: EscapePlacement::Always,
        })
        .unwrap();
    assert!(generated.tree.is_well_formed());
    assert!(generated.tree.contains(5));
}

// ============================================================
// Description parsing
// ============================================================

#[test]
fn given_sample_description_when_parsing_then_builds_expected_shape() {
    let tree = TreeBuilder::new().parse(&fixture("sample.txt")).unwrap();

    assert_eq!(tree.len(), 5);
    assert_eq!(values(&tree), vec![1, 2, 4, 5, 3]);
    assert_eq!(tree.depth(), 3);
    assert!(tree.is_well_formed());
}

#[test]
fn given_duplicate_values_when_parsing_then_first_created_node_is_parent() {
    // 1 -> [2a, 2b]; "2 3" attaches to 2a; blank line skipped; "3 9" extends it
    let tree = TreeBuilder::new().parse(&fixture("duplicates.txt")).unwrap();
    let root = tree.get_node(tree.root().unwrap()).unwrap();
    let first_two = tree.get_node(root.children[0]).unwrap();
    let second_two = tree.get_node(root.children[1]).unwrap();

    assert_eq!(first_two.children.len(), 1);
    assert!(second_two.children.is_empty());
    assert_eq!(values(&tree), vec![1, 2, 3, 9, 2]);
}

#[test]
fn given_unknown_parent_when_parsing_then_malformed_reference() {
    let result = TreeBuilder::new().parse(&fixture("orphan.txt"));
    match result {
        Err(DomainError::MalformedReference { line, value }) => {
            assert_eq!(line, 2);
            assert_eq!(value, 7);
        }
        other => panic!("expected MalformedReference, got {other:?}"),
    }
}

#[rstest]
#[case("")]
#[case("\n\n")]
#[case("   \n\t\n")]
fn given_blank_description_when_parsing_then_tree_is_empty(#[case] content: &str) {
    let tree = TreeBuilder::new().parse(content).unwrap();
    assert!(tree.is_empty());
    assert!(tree.root().is_none());
}

#[test]
fn given_lines_iterator_when_building_then_matches_string_parse() {
    let builder = TreeBuilder::new();
    let from_lines = builder.from_lines(vec!["1 2 3", "2 4 5"]).unwrap();
    let from_str = builder.parse("1 2 3\n2 4 5").unwrap();
    assert_eq!(values(&from_lines), values(&from_str));
}

#[test]
fn given_negative_values_when_parsing_then_accepted() {
    let tree = TreeBuilder::new().parse("-1 -2 0").unwrap();
    assert_eq!(values(&tree), vec![-1, -2, 0]);
}
