//! Command dispatch: resolves settings, runs services, prints reports.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::application::services::{Dungeon, RaceReport, SearchReport};
use crate::cli::args::{Cli, Commands, ConfigCommands, SearchArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{self, Mode, Settings};
use crate::domain::{EscapePlacement, RandomSpec, Strategy};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Effective search options after layering CLI flags over settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPlan {
    pub escape_value: i64,
    pub strategy: Strategy,
    pub race: bool,
    pub show_tree: bool,
}

impl SearchPlan {
    pub fn resolve(settings: &Settings, args: &SearchArgs) -> Self {
        Self {
            escape_value: args.escape.unwrap_or(settings.escape_value),
            strategy: args.strategy.unwrap_or(settings.strategy),
            race: args.race || settings.race,
            show_tree: args.show_tree || settings.show_tree,
        }
    }
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Random {
            nodes,
            seed,
            placement,
            search,
        }) => {
            let container = build_container()?;
            cmd_random(&container, *nodes, *seed, *placement, search)
        }
        Some(Commands::File { path, search }) => {
            let container = build_container()?;
            cmd_file(&container, path, search)
        }
        Some(Commands::Run { search }) => {
            let container = build_container()?;
            cmd_run(&container, search)
        }
        Some(Commands::Config { command }) => {
            let container = build_container()?;
            cmd_config(&container, command)
        }
        None => {
            let container = build_container()?;
            cmd_run(&container, &SearchArgs::default())
        }
    }
}

fn current_dir() -> CliResult<PathBuf> {
    std::env::current_dir().map_err(|e| InfraError::io("determine current directory", e).into())
}

fn build_container() -> CliResult<ServiceContainer> {
    let cwd = current_dir()?;
    let settings = Settings::load(Some(&cwd))?;
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings))
}

#[instrument(skip(container))]
pub fn cmd_random(
    container: &ServiceContainer,
    nodes: Option<usize>,
    seed: Option<u64>,
    placement: Option<EscapePlacement>,
    args: &SearchArgs,
) -> CliResult<()> {
    let settings = &container.settings;
    let plan = SearchPlan::resolve(settings, args);
    let spec = RandomSpec {
        node_count: nodes.unwrap_or(settings.node_count),
        escape_value: plan.escape_value,
        seed: seed.or(settings.seed),
        placement: placement.unwrap_or(settings.placement),
    };

    let dungeon = container.escape.generate(&spec)?;
    if dungeon.escape_present {
        output::action("Escape node added", &plan.escape_value);
    } else {
        output::info("No escape node selected.");
    }
    run_search(container, &dungeon, &plan);
    Ok(())
}

#[instrument(skip(container))]
pub fn cmd_file(container: &ServiceContainer, path: &Path, args: &SearchArgs) -> CliResult<()> {
    let plan = SearchPlan::resolve(&container.settings, args);
    let dungeon = container.escape.load(path, plan.escape_value)?;
    if dungeon.escape_present {
        output::action("Escape node found in the custom tree", &plan.escape_value);
    }
    run_search(container, &dungeon, &plan);
    Ok(())
}

#[instrument(skip(container))]
pub fn cmd_run(container: &ServiceContainer, args: &SearchArgs) -> CliResult<()> {
    match container.settings.mode {
        Mode::Random => cmd_random(container, None, None, None, args),
        Mode::File => {
            let path = container.settings.tree_file.clone().ok_or_else(|| {
                CliError::Usage("mode = \"file\" requires tree_file to be set".to_string())
            })?;
            cmd_file(container, &path, args)
        }
    }
}

fn run_search(container: &ServiceContainer, dungeon: &Dungeon, plan: &SearchPlan) {
    if plan.show_tree {
        output::info(&dungeon.tree.to_tree_string());
    }
    if dungeon.tree.is_empty() {
        output::warning("the dungeon has no rooms");
    }

    if plan.race {
        output::header("Starting parallel DFS and BFS...");
        let report = container.escape.race(&dungeon.tree, plan.escape_value);
        print_race(&report);
    } else {
        output::header(&format!("Starting {}...", plan.strategy));
        let report = container
            .escape
            .search(&dungeon.tree, plan.escape_value, plan.strategy);
        print_search(&report);
    }
}

fn print_search(report: &SearchReport) {
    let outcome = &report.outcome;
    if outcome.found {
        output::success("Escape node found!");
        output::action("Path", &outcome.path.iter().join(" -> "));
    } else {
        output::failure("Escape node not found.");
    }
    output::action("Total moves", &outcome.moves);
    output::action(
        "Total time taken",
        &format!("{:.6} seconds", report.elapsed.as_secs_f64()),
    );
}

fn print_race(report: &RaceReport) {
    let outcome = &report.outcome;
    output::action("Escape node found by", &outcome.finder_label());
    output::action("Total moves in DFS", &outcome.dfs_moves);
    output::action("Total moves in BFS", &outcome.bfs_moves);
    output::action(
        "Total time taken",
        &format!("{:.6} seconds", report.elapsed.as_secs_f64()),
    );
}

#[instrument(skip(container))]
fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let cwd = current_dir()?;
            let global = config::global_config_path();
            let local = config::local_config_path(&cwd);
            match global {
                Some(p) => output::action("Global", &describe_path(container, &p)),
                None => output::action("Global", "<no config directory>"),
            }
            output::action("Local", &describe_path(container, &local));
            Ok(())
        }
        ConfigCommands::Init { global, force } => {
            let path = if *global {
                config::global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                config::local_config_path(&current_dir()?)
            };
            init_config(container, &path, *force)?;
            output::success(&format!("Created {}", path.display()));
            Ok(())
        }
    }
}

fn describe_path(container: &ServiceContainer, path: &Path) -> String {
    let marker = if container.fs.exists(path) {
        "exists"
    } else {
        "not found"
    };
    format!("{} ({})", path.display(), marker)
}

/// Writes the config template to `path`, refusing to clobber unless forced.
pub fn init_config(container: &ServiceContainer, path: &Path, force: bool) -> CliResult<()> {
    if container.fs.exists(path) && !force {
        return Err(CliError::Usage(format!(
            "config already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }
    container
        .fs
        .ensure_parent(path)
        .map_err(|e| InfraError::io(format!("create directory for {}", path.display()), e))?;
    container
        .fs
        .write(path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    info!("config template written to {}", path.display());
    Ok(())
}
