#![allow(non_snake_case)]

use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process;

use chrono::Utc;
use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use offdayCalendar::cli::{self, Cli};
use offdayCalendar::config::{AppConfig, Settings};

fn main() {
    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr so stdout stays valid JSON.
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .or_else(|| env::var("CONFIG_FILE").ok().map(PathBuf::from));
    let config = match config_path {
        Some(path) => AppConfig::from_file(&path)?,
        None => AppConfig::default(),
    };

    let get_prop = |key: &str| -> Option<String> {
        config.get(key).or_else(|| env::var(key).ok())
    };

    let settings = cli.apply_overrides(Settings::resolve(get_prop)?);
    let output = cli::run(&cli, &settings, Utc::now())?;
    println!("{}", output);
    Ok(())
}
