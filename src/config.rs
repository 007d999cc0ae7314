//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dungeon/dungeon.toml`
//! 3. Local config: `<dir>/.dungeon.toml`
//! 4. Environment variables: `DUNGEON_*` prefix
//!
//! Command line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{EscapePlacement, Strategy};

/// Escape value used when nothing else is configured.
pub const DEFAULT_ESCAPE_VALUE: i64 = 1000;
/// Size of a random dungeon when nothing else is configured.
pub const DEFAULT_NODE_COUNT: usize = 1000;

/// Where the dungeon comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Generate a random dungeon
    #[default]
    Random,
    /// Read the dungeon from `tree_file`
    File,
}

/// Unified configuration for dungeon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Value of the escape room
    pub escape_value: i64,
    /// Number of rooms in a random dungeon
    pub node_count: usize,
    /// Fixed RNG seed for reproducible dungeons
    pub seed: Option<u64>,
    /// Whether random dungeons get an escape room
    pub placement: EscapePlacement,
    /// Dungeon source used by `run`
    pub mode: Mode,
    /// Description file used when `mode = "file"`
    pub tree_file: Option<PathBuf>,
    /// Strategy for single searches
    pub strategy: Strategy,
    /// Race DFS against BFS instead of a single search
    pub race: bool,
    /// Print the dungeon before searching
    pub show_tree: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            escape_value: DEFAULT_ESCAPE_VALUE,
            node_count: DEFAULT_NODE_COUNT,
            seed: None,
            placement: EscapePlacement::default(),
            mode: Mode::default(),
            tree_file: None,
            strategy: Strategy::default(),
            race: false,
            show_tree: false,
        }
    }
}

/// Raw settings for intermediate parsing (every field optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub escape_value: Option<i64>,
    pub node_count: Option<usize>,
    pub seed: Option<u64>,
    pub placement: Option<EscapePlacement>,
    pub mode: Option<Mode>,
    pub tree_file: Option<PathBuf>,
    pub strategy: Option<Strategy>,
    pub race: Option<bool>,
    pub show_tree: Option<bool>,
}

/// Get the XDG config directory for dungeon.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dungeon").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dungeon.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".dungeon.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Missing keys are unset; any other lookup failure is reported.
fn optional<T>(value: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match value {
        Ok(v) => Ok(Some(v)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(tree_file) = &self.tree_file {
            let expanded = expand_env_vars(tree_file.to_string_lossy().as_ref());
            self.tree_file = Some(PathBuf::from(expanded));
        }
    }

    /// Merge overlay config onto self (base): overlay wins where specified.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            escape_value: overlay.escape_value.unwrap_or(self.escape_value),
            node_count: overlay.node_count.unwrap_or(self.node_count),
            seed: overlay.seed.or(self.seed),
            placement: overlay.placement.unwrap_or(self.placement),
            mode: overlay.mode.unwrap_or(self.mode),
            tree_file: overlay
                .tree_file
                .clone()
                .or_else(|| self.tree_file.clone()),
            strategy: overlay.strategy.unwrap_or(self.strategy),
            race: overlay.race.unwrap_or(self.race),
            show_tree: overlay.show_tree.unwrap_or(self.show_tree),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.dungeon.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply DUNGEON_* environment variables as explicit overrides.
    ///
    /// Unset variables keep the lower layers; a set but unparsable value is
    /// a config error, same as in the TOML files.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("DUNGEON")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        let raw = RawSettings {
            escape_value: optional(config.get_int("escape_value"))?,
            node_count: optional(config.get::<usize>("node_count"))?,
            seed: optional(config.get::<u64>("seed"))?,
            placement: optional(config.get::<EscapePlacement>("placement"))?,
            mode: optional(config.get::<Mode>("mode"))?,
            tree_file: optional(config.get_string("tree_file"))?.map(PathBuf::from),
            strategy: optional(config.get::<Strategy>("strategy"))?,
            race: optional(config.get_bool("race"))?,
            show_tree: optional(config.get_bool("show_tree"))?,
        };
        Ok(settings.merge_with(&raw))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# dungeon configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/dungeon/dungeon.toml
#   Local:  ./.dungeon.toml
#   Env:    DUNGEON_* environment variables (e.g. DUNGEON_ESCAPE_VALUE=42)
#   Flags:  command line arguments

# Value the search is looking for
# escape_value = 1000

# Number of rooms in a random dungeon
# node_count = 1000

# Fixed seed for reproducible random dungeons
# seed = 42

# Escape room placement for random dungeons: "coin", "always", "never"
# placement = "coin"

# Dungeon source for `dungeon run`: "random" or "file"
# mode = "random"

# Description file (one "<parent> <child>..." line per room)
# tree_file = "~/dungeons/castle.txt"

# Single search strategy: "dfs" or "bfs"
# strategy = "dfs"

# Race DFS against BFS
# race = false

# Print the dungeon before searching
# show_tree = false
"#
        .to_string()
    }
}
