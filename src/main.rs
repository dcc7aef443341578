use anyhow::Context;
use clap::Parser;

use git_sync_world::cli::{Cli, Command};
use git_sync_world::config::Config;
use git_sync_world::controller::SessionController;
use git_sync_world::output;
use git_sync_world::vcs::{GitCli, Vcs};

fn main() {
    match try_main() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output::error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

fn try_main() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let base_dir = match &cli.directory {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("failed to determine current directory")?,
    };
    let vcs = GitCli::at(base_dir);

    Ok(run(&cli, &vcs))
}

fn run(cli: &Cli, vcs: &dyn Vcs) -> i32 {
    let outcome = Config::derive(vcs).and_then(|config| {
        let controller = SessionController::new(vcs, config);
        match cli.command() {
            Command::Status => controller.status(),
            Command::Sync => controller.sync(),
            Command::Continue => controller.continue_session(),
            Command::Skip => controller.skip(),
            Command::Abort => controller.abort(),
        }
    });

    match outcome {
        Ok(()) => 0,
        Err(e) => {
            output::error(&e.to_string());
            e.exit_code()
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}
