//! Dungeon escape service
//!
//! Produces dungeons (random or from a description file) and runs the
//! single or racing searches over them, timing each run.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use crate::application::ApplicationResult;
use crate::domain::{
    self, DomainError, RaceOutcome, RandomSpec, SearchOutcome, Strategy, TreeArena, TreeBuilder,
};
use crate::infrastructure::traits::FileSystem;

/// A dungeon ready to be searched.
#[derive(Debug)]
pub struct Dungeon {
    pub tree: TreeArena,
    /// Whether a room carries the escape value
    pub escape_present: bool,
}

/// Output of a single traversal.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub strategy: Strategy,
    pub outcome: SearchOutcome,
    pub elapsed: Duration,
}

/// Output of a DFS vs BFS race.
#[derive(Debug, Clone)]
pub struct RaceReport {
    pub outcome: RaceOutcome,
    pub elapsed: Duration,
}

/// Service for building and searching dungeons.
pub struct EscapeService {
    fs: Arc<dyn FileSystem>,
    builder: TreeBuilder,
}

impl EscapeService {
    /// Create a new escape service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            builder: TreeBuilder::new(),
        }
    }

    /// Generate a random dungeon.
    #[instrument(level = "debug", skip(self))]
    pub fn generate(&self, spec: &RandomSpec) -> ApplicationResult<Dungeon> {
        let generated = self.builder.generate(spec)?;
        if generated.escape_placed {
            info!("escape node with value {} added", spec.escape_value);
        } else {
            info!("no escape node selected");
        }
        Ok(Dungeon {
            tree: generated.tree,
            escape_present: generated.escape_placed,
        })
    }

    /// Load a dungeon from a description file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path, escape_value: i64) -> ApplicationResult<Dungeon> {
        let content =
            self.fs
                .read_to_string(path)
                .map_err(|source| DomainError::SourceUnavailable {
                    path: path.to_path_buf(),
                    source,
                })?;
        let tree = self.builder.parse(&content)?;
        let escape_present = tree.contains(escape_value);
        debug!(
            "load: {} nodes from {}, escape present: {}",
            tree.len(),
            path.display(),
            escape_present
        );
        Ok(Dungeon {
            tree,
            escape_present,
        })
    }

    /// Run one traversal and time it.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn search(&self, tree: &TreeArena, escape_value: i64, strategy: Strategy) -> SearchReport {
        let start = Instant::now();
        let outcome = domain::search(tree, escape_value, strategy);
        let elapsed = start.elapsed();
        info!(%strategy, found = outcome.found, moves = outcome.moves, "search finished");
        SearchReport {
            strategy,
            outcome,
            elapsed,
        }
    }

    /// Race DFS against BFS and time the race, copies included.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn race(&self, tree: &TreeArena, escape_value: i64) -> RaceReport {
        let start = Instant::now();
        let outcome = domain::race(tree, escape_value);
        let elapsed = start.elapsed();
        info!(finder = %outcome.finder_label(), "race finished");
        RaceReport { outcome, elapsed }
    }
}
