//! Tree builder for random dungeons and adjacency-list descriptions.

use std::collections::HashMap;

use generational_arena::Index;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::TreeArena;
use crate::domain::error::{DomainError, DomainResult};

/// Smallest value a randomly generated room can carry.
pub const MIN_ROOM_VALUE: i64 = 1;
/// Largest value a randomly generated room can carry.
pub const MAX_ROOM_VALUE: i64 = 100;

/// Whether the generator writes the escape value into the dungeon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EscapePlacement {
    /// Place it with probability one half
    #[default]
    Coin,
    /// Always place it
    Always,
    /// Never place it
    Never,
}

/// Parameters for random generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomSpec {
    pub node_count: usize,
    pub escape_value: i64,
    /// Fixed seed for reproducible dungeons; None draws from entropy
    pub seed: Option<u64>,
    pub placement: EscapePlacement,
}

/// A generated dungeon together with whether the escape room exists.
#[derive(Debug)]
pub struct GeneratedTree {
    pub tree: TreeArena,
    pub escape_placed: bool,
}

/// Constructs dungeon trees.
#[derive(Debug, Default)]
pub struct TreeBuilder;

impl TreeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Generates a random tree of exactly `spec.node_count` nodes.
    #[instrument(level = "debug", skip(self))]
    pub fn generate(&self, spec: &RandomSpec) -> DomainResult<GeneratedTree> {
        let mut rng = match spec.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.generate_with_rng(spec, &mut rng)
    }

    /// Generates a random tree drawing from the given RNG.
    ///
    /// Every new node is attached to a uniformly chosen node that is already
    /// placed, so the result is always connected and acyclic.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        spec: &RandomSpec,
        rng: &mut R,
    ) -> DomainResult<GeneratedTree> {
        if spec.node_count == 0 {
            return Err(DomainError::InvalidNodeCount(spec.node_count));
        }

        let mut tree = TreeArena::with_capacity(spec.node_count);
        let mut placed: Vec<Index> = Vec::with_capacity(spec.node_count);
        placed.push(tree.insert_node(random_value(rng), None));

        for _ in 1..spec.node_count {
            let value = random_value(rng);
            let parent = placed[rng.gen_range(0..placed.len())];
            placed.push(tree.insert_node(value, Some(parent)));
        }

        let escape_placed = match spec.placement {
            EscapePlacement::Always => true,
            EscapePlacement::Never => false,
            EscapePlacement::Coin => rng.gen_bool(0.5),
        };
        if escape_placed {
            let target = placed[rng.gen_range(0..placed.len())];
            tree.set_value(target, spec.escape_value);
            debug!("escape value {} placed", spec.escape_value);
        } else {
            debug!("no escape node selected");
        }

        Ok(GeneratedTree {
            tree,
            escape_placed,
        })
    }

    /// Parses an adjacency-list description: one `<parent> <child>*` line
    /// per parent.
    ///
    /// The first parent value becomes the root. Parents are looked up by value;
    /// when several nodes share a value the earliest created one wins.
    #[instrument(level = "debug", skip(self, content))]
    pub fn parse(&self, content: &str) -> DomainResult<TreeArena> {
        self.from_lines(content.lines())
    }

    pub fn from_lines<I, S>(&self, lines: I) -> DomainResult<TreeArena>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = TreeArena::new();
        // First node created for each value
        let mut by_value: HashMap<i64, Index> = HashMap::new();

        for (line_no, line) in lines.into_iter().enumerate() {
            let line_no = line_no + 1;
            let mut tokens = line.as_ref().split_whitespace();
            let Some(first) = tokens.next() else {
                continue;
            };
            let parent_value = parse_value(first, line_no)?;

            if tree.is_empty() {
                let root = tree.insert_node(parent_value, None);
                by_value.insert(parent_value, root);
            }

            let parent = *by_value
                .get(&parent_value)
                .ok_or(DomainError::MalformedReference {
                    line: line_no,
                    value: parent_value,
                })?;

            for token in tokens {
                let value = parse_value(token, line_no)?;
                let child = tree.insert_node(value, Some(parent));
                by_value.entry(value).or_insert(child);
            }
        }

        debug!("parsed {} nodes", tree.len());
        Ok(tree)
    }
}

fn random_value<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    rng.gen_range(MIN_ROOM_VALUE..=MAX_ROOM_VALUE)
}

fn parse_value(token: &str, line: usize) -> DomainResult<i64> {
    token.parse().map_err(|_| DomainError::InvalidToken {
        line,
        token: token.to_string(),
    })
}
