use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tsf_cli::commands::{categories, check, report, save, serve, tokens};
use tsf_cli::{Cli, Commands, Config, Service, util};
use tsf_core::WriteMode;

/// Load and validate config.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    config.rules.validate().context("invalid category configuration")?;
    Ok(config)
}

/// Open the database and wrap it in the service, ensuring the parent directory exists.
fn open_service(config: &Config) -> Result<Service> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    let db = tsf_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok(Service::new(config.rules.clone(), db))
}

fn read_file(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // stdout carries protocol traffic under `serve`
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Check { file, date }) => {
            let config = load_config(cli.config.as_deref())?;
            let day = util::resolve_day(date.as_deref(), Some(file), config.project_root.as_deref())?;
            let text = read_file(file)?;
            let errors = check::run(&mut stdout, &config.rules, file, &text, day)?;
            if errors > 0 {
                stdout.flush()?;
                std::process::exit(1);
            }
        }
        Some(Commands::Save { file, date, draft }) => {
            let config = load_config(cli.config.as_deref())?;
            let day = util::resolve_day(date.as_deref(), Some(file), config.project_root.as_deref())?;
            let text = read_file(file)?;
            let mut service = open_service(&config)?;
            let mode = if *draft { WriteMode::Draft } else { WriteMode::Save };
            let errors = save::run(&mut stdout, &mut service, file, &text, day, mode)?;
            if errors > 0 {
                stdout.flush()?;
                std::process::exit(1);
            }
        }
        Some(Commands::Report { date, write }) => {
            let config = load_config(cli.config.as_deref())?;
            let day = util::resolve_day(date.as_deref(), None, config.project_root.as_deref())?;
            let service = open_service(&config)?;
            let write_to = write.then_some(config.report_dir.as_path());
            report::run(&mut stdout, &service, day, write_to)?;
        }
        Some(Commands::Tokens { file, date, encoded }) => {
            let config = load_config(cli.config.as_deref())?;
            let day = util::resolve_day(date.as_deref(), Some(file), config.project_root.as_deref())?;
            let text = read_file(file)?;
            tokens::run(&mut stdout, &config.rules, &text, day, *encoded)?;
        }
        Some(Commands::Categories) => {
            let config = load_config(cli.config.as_deref())?;
            categories::run(&mut stdout, &config.rules)?;
        }
        Some(Commands::Serve) => {
            let config = load_config(cli.config.as_deref())?;
            let service = open_service(&config)?;
            drop(stdout);
            serve::run(service, &config)?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
