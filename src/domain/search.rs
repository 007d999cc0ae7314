//! Depth-first and breadth-first escape search.
//!
//! Two flavours exist. The single traversals (`dfs`, `bfs`) run alone and
//! record the path to the escape room. The racing traversals (`dfs_racing`,
//! `bfs_racing`) share a [`FoundFlag`] with a competitor and stop as soon as
//! either side has claimed it.
//!
//! Move counting differs between flavours: single DFS pays one move per visited
//! node plus one per child subtree it has to walk back out of, while the
//! racing DFS pays one move per visited node only. BFS always pays one move
//! per dequeued node.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::arena::TreeArena;

/// Search strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Depth-first, pre-order
    #[default]
    Dfs,
    /// Breadth-first, level order
    Bfs,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Dfs => write!(f, "DFS"),
            Strategy::Bfs => write!(f, "BFS"),
        }
    }
}

/// Result of a single traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub found: bool,
    /// Values from the root to the escape room; empty when not found
    pub path: Vec<i64>,
    pub moves: u64,
}

/// Result of one side of a race.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaceLeg {
    pub found: bool,
    pub moves: u64,
}

/// Found signal shared by two racing traversals.
///
/// Only the first traversal to call [`FoundFlag::try_claim`] wins; later
/// claims fail, so at most one side ever reports success.
#[derive(Debug, Default)]
pub struct FoundFlag(AtomicBool);

impl FoundFlag {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Sets the flag. Returns true only for the caller that flipped it.
    pub fn try_claim(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Runs the single traversal of the given strategy.
pub fn search(tree: &TreeArena, escape_value: i64, strategy: Strategy) -> SearchOutcome {
    match strategy {
        Strategy::Dfs => dfs(tree, escape_value),
        Strategy::Bfs => bfs(tree, escape_value),
    }
}

/// Pre-order depth-first search with backtracking path.
///
/// Equivalent to the recursive formulation: visit (push path, +1 move),
/// match check, then each child in order; every child that comes back
/// empty-handed costs the parent one extra move, and a failed node pops
/// itself off the path.
#[instrument(level = "debug", skip(tree), fields(nodes = tree.len()))]
pub fn dfs(tree: &TreeArena, escape_value: i64) -> SearchOutcome {
    let mut outcome = SearchOutcome::default();
    let Some(root) = tree.root() else {
        return outcome;
    };

    // (node, position of the next child to descend into)
    let mut stack: Vec<(Index, usize)> = Vec::new();
    if visit(tree, root, escape_value, &mut outcome) {
        return outcome;
    }
    stack.push((root, 0));

    while let Some(frame) = stack.last_mut() {
        let (idx, next) = *frame;
        let child = tree
            .get_node(idx)
            .and_then(|node| node.children.get(next).copied());
        match child {
            Some(child) => {
                frame.1 += 1;
                if visit(tree, child, escape_value, &mut outcome) {
                    return outcome;
                }
                stack.push((child, 0));
            }
            None => {
                stack.pop();
                outcome.path.pop();
                if !stack.is_empty() {
                    // walking back up to the parent
                    outcome.moves += 1;
                }
            }
        }
    }

    debug!(moves = outcome.moves, "dfs exhausted");
    outcome
}

fn visit(tree: &TreeArena, idx: Index, escape_value: i64, outcome: &mut SearchOutcome) -> bool {
    let Some(node) = tree.get_node(idx) else {
        return false;
    };
    outcome.path.push(node.value);
    outcome.moves += 1;
    if node.value == escape_value {
        debug!(moves = outcome.moves, "escape node found");
        outcome.found = true;
    }
    outcome.found
}

/// Level-order breadth-first search.
///
/// The path to the escape room is rebuilt from parent links once found.
#[instrument(level = "debug", skip(tree), fields(nodes = tree.len()))]
pub fn bfs(tree: &TreeArena, escape_value: i64) -> SearchOutcome {
    let mut outcome = SearchOutcome::default();
    let mut queue: VecDeque<Index> = tree.root().into_iter().collect();

    while let Some(idx) = queue.pop_front() {
        let Some(node) = tree.get_node(idx) else {
            continue;
        };
        outcome.moves += 1;

        if node.value == escape_value {
            debug!(moves = outcome.moves, "escape node found");
            outcome.found = true;
            outcome.path = tree.path_to(idx);
            return outcome;
        }
        queue.extend(node.children.iter().copied());
    }

    debug!(moves = outcome.moves, "bfs exhausted");
    outcome
}

/// Depth-first search that gives up once the competitor has found the exit.
///
/// The root is always visited; the flag is polled before every later step,
/// so a non-empty dungeon costs at least one move.
#[instrument(level = "debug", skip(tree, flag), fields(nodes = tree.len()))]
pub fn dfs_racing(tree: &TreeArena, escape_value: i64, flag: &FoundFlag) -> RaceLeg {
    let mut leg = RaceLeg::default();
    let mut stack: Vec<Index> = tree.root().into_iter().collect();

    while let Some(idx) = stack.pop() {
        if leg.moves > 0 && flag.is_set() {
            trace!(moves = leg.moves, "dfs abandoned");
            return leg;
        }
        let Some(node) = tree.get_node(idx) else {
            continue;
        };
        leg.moves += 1;

        if node.value == escape_value {
            leg.found = flag.try_claim();
            return leg;
        }
        for &child in node.children.iter().rev() {
            stack.push(child);
        }
    }
    leg
}

/// Breadth-first search that gives up once the competitor has found the exit.
///
/// Like [`dfs_racing`], the root visit happens before the first flag poll.
#[instrument(level = "debug", skip(tree, flag), fields(nodes = tree.len()))]
pub fn bfs_racing(tree: &TreeArena, escape_value: i64, flag: &FoundFlag) -> RaceLeg {
    let mut leg = RaceLeg::default();
    let mut queue: VecDeque<Index> = tree.root().into_iter().collect();

    while leg.moves == 0 || !flag.is_set() {
        let Some(idx) = queue.pop_front() else {
            break;
        };
        let Some(node) = tree.get_node(idx) else {
            continue;
        };
        leg.moves += 1;

        if node.value == escape_value {
            leg.found = flag.try_claim();
            return leg;
        }
        queue.extend(node.children.iter().copied());
    }
    trace!(moves = leg.moves, "bfs stopped");
    leg
}
