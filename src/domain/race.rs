//! Concurrent DFS vs BFS race over private copies of one dungeon.

use tracing::{debug, instrument};

use crate::domain::arena::TreeArena;
use crate::domain::search::{bfs_racing, dfs_racing, FoundFlag, Strategy};

/// Outcome of a race.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaceOutcome {
    /// Strategy that claimed the escape room, None if nobody did
    pub finder: Option<Strategy>,
    pub dfs_moves: u64,
    pub bfs_moves: u64,
}

impl RaceOutcome {
    /// `"DFS"`, `"BFS"` or `"None"`.
    pub fn finder_label(&self) -> String {
        self.finder
            .map(|s| s.to_string())
            .unwrap_or_else(|| "None".to_string())
    }
}

/// Races DFS against BFS.
///
/// Each side gets its own deep copy of `tree`; the found flag is the only
/// state they share. Both sides are joined before the outcome is built.
#[instrument(level = "debug", skip(tree), fields(nodes = tree.len()))]
pub fn race(tree: &TreeArena, escape_value: i64) -> RaceOutcome {
    let dfs_tree = tree.deep_clone();
    let bfs_tree = tree.deep_clone();
    let flag = FoundFlag::new();

    let (dfs, bfs) = rayon::join(
        || dfs_racing(&dfs_tree, escape_value, &flag),
        || bfs_racing(&bfs_tree, escape_value, &flag),
    );
    debug_assert!(!(dfs.found && bfs.found), "flag claimed twice");

    let finder = if dfs.found {
        Some(Strategy::Dfs)
    } else if bfs.found {
        Some(Strategy::Bfs)
    } else {
        None
    };
    debug!(?finder, dfs_moves = dfs.moves, bfs_moves = bfs.moves, "race finished");

    RaceOutcome {
        finder,
        dfs_moves: dfs.moves,
        bfs_moves: bfs.moves,
    }
}
