//! goswap - Go toolchain version switcher
//!
//! Activates a Go version under an installation root by repointing the slot
//! symlink of an installed release line, downloading the release if needed.

use clap::Parser;
use goswap_config::{GlobalConfig, global_config_path, load_global_config};
use goswap_core::{Error, ExitCode, Result};
use goswap_toolchain::{AcquireSettings, Acquirer, HttpClient, Platform};
use goswap_ui::{Output, Verbosity};
use std::time::Duration;
use tracing::debug;

mod cli;
mod styles;

use cli::Cli;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    goswap_telemetry::init(cli.verbose);

    if cli.no_color || goswap_core::env::no_color() {
        goswap_ui::style::disable_colors();
    }

    let output = Output::with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose));

    let code = match run(&cli, &output) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            output.print_error(&e);
            ExitCode::for_error(&e)
        }
    };
    output.flush();

    code.into()
}

fn run(cli: &Cli, output: &Output) -> Result<()> {
    let config = load_config(cli)?;
    let root = cli.dest.clone().unwrap_or_else(|| config.root.clone());
    debug!("Installation root: {}", root.display());

    let client = HttpClient::new(
        config.catalog_url.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;

    let settings = AcquireSettings {
        platform: Platform::new(&config.platform.os, &config.platform.arch),
        download_base_url: config.download_base_url.clone(),
        show_progress: output.shows_progress(),
    };

    let acquirer = Acquirer::new(client.clone(), client, settings);
    let outcome = goswap_telemetry::time!("acquire", acquirer.acquire(&root, &cli.requested))?;

    output.result(&outcome.to_string());
    if outcome.changed() {
        output.info(&format!("Active directory: {}", outcome.path().display()));
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<GlobalConfig> {
    load_global_config(cli.config_file.as_deref()).map_err(|e| Error::Config {
        message: "failed to load configuration".to_string(),
        path: cli.config_file.clone().or_else(global_config_path),
        source: Some(Box::new(e)),
    })
}
