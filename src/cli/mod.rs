pub mod focus;
pub mod journal;
pub mod log;
pub mod project;
pub mod strategy;
pub mod week;

use std::{env, path::PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use focus::FocusCommand;
use journal::{LeisureCommand, MemoCommand, ReadingCommand};
use log::LogCommand;
use project::{ProjectCommand, TaskCommand};
use strategy::StrategyCommand;
use tracing::level_filters::LevelFilter;
use week::WeekCommand;

use crate::{
    storage::Stores,
    utils::{clock::DefaultClock, logging::enable_logging},
};

#[derive(Parser, Debug)]
#[command(name = "Stride", version, long_about = None)]
#[command(about = "Command line companion for projects, focus time, and weekly reviews", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Manage projects")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    #[command(about = "Manage tasks within a project")]
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    #[command(about = "Record and inspect time logs")]
    Log {
        #[command(subcommand)]
        command: LogCommand,
    },
    #[command(about = "Run a focus session and log the time it took")]
    Focus {
        #[command(flatten)]
        command: FocusCommand,
    },
    #[command(about = "Keep the reading list")]
    Reading {
        #[command(subcommand)]
        command: ReadingCommand,
    },
    #[command(about = "Keep the leisure list")]
    Leisure {
        #[command(subcommand)]
        command: LeisureCommand,
    },
    #[command(about = "Capture quick memos")]
    Memo {
        #[command(subcommand)]
        command: MemoCommand,
    },
    #[command(about = "Record and review weekly strategy sessions")]
    Strategy {
        #[command(subcommand)]
        command: StrategyCommand,
    },
    #[command(about = "Show this week's per-project time summary")]
    Week {
        #[command(flatten)]
        command: WeekCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let data_dir = match args.dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            dir
        }
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&data_dir, logging_level, args.log)?;

    let stores = Stores::open(&data_dir)?;

    match args.commands {
        Commands::Project { command } => project::process_project_command(command, &stores).await,
        Commands::Task { command } => project::process_task_command(command, &stores).await,
        Commands::Log { command } => log::process_log_command(command, &stores).await,
        Commands::Focus { command } => {
            focus::process_focus_command(command, &stores, &DefaultClock).await
        }
        Commands::Reading { command } => journal::process_reading_command(command, &stores).await,
        Commands::Leisure { command } => journal::process_leisure_command(command, &stores).await,
        Commands::Memo { command } => journal::process_memo_command(command, &stores).await,
        Commands::Strategy { command } => {
            strategy::process_strategy_command(command, &stores).await
        }
        Commands::Week { command } => week::process_week_command(command, &stores).await,
    }
}

pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path =
                PathBuf::from(env::var("APPDATA").expect("APPDATA should be present on Windows"));
            path.push("stride");
            path
        }
        #[cfg(not(windows))]
        {
            let mut path = env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .expect("Couldn't find neither XDG_STATE_HOME nor HOME");
            path.push("stride");
            path
        }
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == std::io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
