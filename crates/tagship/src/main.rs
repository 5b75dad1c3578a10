mod cli;
mod logging;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::process::ExitCode;
use tagship_core::{
    CliOverrides, Executor, NpmClient, Orchestrator, ReleaseConfig, ReleaseMode, ReleaseOutcome,
    RunOutcome, SystemGit,
};
use tracing::info;
use ui::Terminal;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to get current directory: {e}");
            return ExitCode::from(1);
        }
    };

    let (overrides, publish_tag) = overrides_for(&cli);
    let context = if publish_tag.is_some() {
        "Failed to publish package"
    } else {
        "Failed to release package"
    };

    if let Err(e) = run(&cwd, overrides, publish_tag) {
        eprintln!("{context}: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

/// Split the parsed command line into config overrides and the optional CI tag.
fn overrides_for(cli: &Cli) -> (CliOverrides, Option<String>) {
    match &cli.command {
        Some(Commands::Publish(args)) => (
            CliOverrides {
                monorepo: args.monorepo,
                dry_run: args.dry,
                registry: args.registry.clone(),
                packages: Vec::new(),
            },
            Some(args.tag.clone()),
        ),
        None => (
            CliOverrides {
                monorepo: cli.release.monorepo,
                dry_run: cli.release.dry,
                registry: None,
                packages: cli.release.package.clone(),
            },
            None,
        ),
    }
}

fn run(root: &Path, overrides: CliOverrides, publish_tag: Option<String>) -> tagship_core::Result<()> {
    let config = ReleaseConfig::load(root, overrides)?;
    let mode = ReleaseMode::resolve(publish_tag, &config);

    let executor = Executor::from_dry_run(config.dry_run);
    let vcs = SystemGit::new(root, executor);
    let registry = NpmClient::new(executor);
    let terminal = Terminal::new();

    let orchestrator = Orchestrator::new(root, &config, &vcs, &registry, &terminal, &terminal);
    match orchestrator.run(&mode)? {
        RunOutcome::Release(ReleaseOutcome::Released { tag }) => info!(%tag, "released"),
        RunOutcome::Release(ReleaseOutcome::Aborted(reason)) => info!(?reason, "release aborted"),
        RunOutcome::Publish(report) => {
            info!(package = %report.package, version = %report.version, "published")
        }
    }
    Ok(())
}
