//! Dungeon escape search.
//!
//! Builds a dungeon tree (random or from an adjacency-list file) and looks
//! for the escape room with depth-first search, breadth-first search, or a
//! concurrent race between the two.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
