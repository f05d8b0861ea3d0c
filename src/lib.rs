pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::commands::{AppState, CommandError, CommandResult};
use crate::error::AppResult;

/// Deterministic study-schedule planner.
#[derive(Parser, Debug)]
#[command(name = "edusense-planner")]
#[command(version)]
pub struct Cli {
    /// YAML settings file; defaults apply when it does not exist
    #[arg(long, env = "EDUSENSE_SETTINGS", default_value = "edusense-planner.yaml")]
    pub settings: PathBuf,

    /// Also write daily-rolling log files into this directory
    #[arg(long, env = "EDUSENSE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate blocks, timeline and feasibility for a request
    Plan {
        /// Request JSON file, or `-` for stdin
        #[arg(long, default_value = "-")]
        request: PathBuf,
    },
    /// Score a request against available time without allocating
    Feasibility {
        #[arg(long, default_value = "-")]
        request: PathBuf,
    },
    /// Print the effective planner settings
    Settings,
    /// Apply a partial settings update given as JSON
    Configure {
        #[arg(long)]
        payload: String,
    },
}

pub fn run() -> i32 {
    let cli = Cli::parse();
    match try_run(cli) {
        Ok(()) => 0,
        Err(error) => {
            match serde_json::to_string(&error) {
                Ok(rendered) => eprintln!("{rendered}"),
                Err(_) => eprintln!("{}: {}", error.code, error.message),
            }
            1
        }
    }
}

pub fn try_run(cli: Cli) -> CommandResult<()> {
    crate::utils::logger::init_logging(cli.log_dir.as_deref())?;
    let state = AppState::new(&cli.settings);

    match cli.command {
        Command::Plan { request } => {
            let payload = read_payload(&request)?;
            let schedule = commands::planning::plan_generate(&state, &payload)?;
            print_json(&schedule, cli.pretty)
        }
        Command::Feasibility { request } => {
            let payload = read_payload(&request)?;
            let report = commands::planning::plan_feasibility(&state, &payload)?;
            print_json(&report, cli.pretty)
        }
        Command::Settings => {
            let settings = commands::settings::settings_get(&state)?;
            print_json(&settings, cli.pretty)
        }
        Command::Configure { payload } => {
            let update = serde_json::from_str(&payload).map_err(crate::error::AppError::from)?;
            let settings = commands::settings::settings_update(&state, update)?;
            print_json(&settings, cli.pretty)
        }
    }
}

fn read_payload(path: &Path) -> AppResult<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    Ok(std::fs::read_to_string(path)?)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> CommandResult<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|err| CommandError::from(crate::error::AppError::from(err)))?;
    println!("{rendered}");
    Ok(())
}
