//! Integration tests for the DUNGEON_* environment layer of Settings::load().
//!
//! Kept in their own test binary: they mutate the process environment, and
//! the lock below serializes them against each other.

use std::fs;
use std::sync::Mutex;

use tempfile::TempDir;

use dungeon::application::ApplicationError;
use dungeon::config::{Settings, DEFAULT_NODE_COUNT};
use dungeon::domain::{EscapePlacement, Strategy};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with the given variables set, removing them afterwards.
fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    for (key, value) in vars {
        std::env::set_var(key, value);
    }
    let result = f();
    for (key, _) in vars {
        std::env::remove_var(key);
    }
    result
}

fn local_config(content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".dungeon.toml"), content).unwrap();
    dir
}

#[test]
fn given_env_var_when_load_then_overrides_local_config() {
    let dir = local_config("escape_value = 7\nstrategy = \"dfs\"\n");

    let settings = with_env(
        &[
            ("DUNGEON_ESCAPE_VALUE", "42"),
            ("DUNGEON_STRATEGY", "bfs"),
            ("DUNGEON_PLACEMENT", "always"),
            ("DUNGEON_RACE", "true"),
        ],
        || Settings::load(Some(dir.path())),
    )
    .expect("load settings");

    assert_eq!(settings.escape_value, 42);
    assert_eq!(settings.strategy, Strategy::Bfs);
    assert_eq!(settings.placement, EscapePlacement::Always);
    assert!(settings.race);
    assert_eq!(settings.node_count, DEFAULT_NODE_COUNT);
}

#[test]
fn given_no_env_var_when_load_then_local_config_wins() {
    let dir = local_config("escape_value = 7\n");

    let settings = with_env(&[], || Settings::load(Some(dir.path()))).expect("load settings");

    assert_eq!(settings.escape_value, 7);
}

#[test]
fn given_negative_escape_in_env_when_load_then_parsed() {
    let dir = TempDir::new().unwrap();

    let settings = with_env(&[("DUNGEON_ESCAPE_VALUE", "-3")], || {
        Settings::load(Some(dir.path()))
    })
    .expect("load settings");

    assert_eq!(settings.escape_value, -3);
}

#[test]
fn given_unparsable_node_count_in_env_when_load_then_config_error() {
    let dir = local_config("node_count = 50\n");

    let result = with_env(&[("DUNGEON_NODE_COUNT", "abc")], || {
        Settings::load(Some(dir.path()))
    });

    assert!(
        matches!(result, Err(ApplicationError::Config { .. })),
        "got {result:?}"
    );
}

#[test]
fn given_unknown_placement_in_env_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();

    let result = with_env(&[("DUNGEON_PLACEMENT", "sometimes")], || {
        Settings::load(Some(dir.path()))
    });

    assert!(
        matches!(result, Err(ApplicationError::Config { .. })),
        "got {result:?}"
    );
}
