//! Domain layer: dungeon trees and the search engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod error;
pub mod race;
pub mod search;

pub use arena::{TreeArena, TreeNode};
pub use builder::{EscapePlacement, GeneratedTree, RandomSpec, TreeBuilder};
pub use error::{DomainError, DomainResult};
pub use race::{race, RaceOutcome};
pub use search::{bfs, bfs_racing, dfs, dfs_racing, search, FoundFlag, RaceLeg, SearchOutcome, Strategy};
