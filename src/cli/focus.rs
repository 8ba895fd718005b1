use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::{
    aggregate::summary::minutes_to_hours,
    storage::{
        entities::{LogId, LogType, TimeLogEntry},
        json_store::EntityStore,
        Stores,
    },
    utils::clock::Clock,
};

use super::log;

#[derive(Debug, Parser)]
pub struct FocusCommand {
    #[arg(help = "Task to focus on")]
    task: String,
    #[arg(short, long, default_value_t = 25, help = "Session length in minutes")]
    minutes: u32,
    #[arg(short, long, help = "Project the session belongs to")]
    project: Option<String>,
    #[arg(short, long, value_enum, default_value_t = LogType::Invested)]
    kind: LogType,
}

/// Runs one pomodoro-style session and appends the result to the time log.
/// Ctrl-C ends the session early, logging only the elapsed part.
pub async fn process_focus_command(
    FocusCommand {
        task,
        minutes,
        project,
        kind,
    }: FocusCommand,
    stores: &Stores,
    clock: &impl Clock,
) -> Result<()> {
    let task = task.trim().to_string();
    let started = clock.time();
    println!("Focusing on {task:?} for {minutes}m. Ctrl-C ends the session early.");

    let interrupted = tokio::select! {
        _ = clock.sleep(Duration::from_secs(minutes as u64 * 60)) => false,
        _ = tokio::signal::ctrl_c() => true,
    };

    let elapsed_minutes = if interrupted {
        (clock.time() - started).num_minutes().clamp(0, minutes as i64)
    } else {
        minutes as i64
    };

    if elapsed_minutes == 0 {
        println!("Session ended before the first full minute, nothing logged");
        return Ok(());
    }

    info!("Focus session on {task:?} ran for {elapsed_minutes}m");

    // Same ingestion path as `log add`: resolve the project once and mirror
    // the minutes onto the task's counters when the task is known.
    let mut projects = stores.projects.load_all().await?;
    let resolved = project
        .as_deref()
        .and_then(|name| log::resolve_to_project(name, &projects));
    let task_id = resolved
        .and_then(|id| log::attribute_to_task(&mut projects, id, &task, elapsed_minutes, kind));
    if task_id.is_some() {
        stores.projects.save_all(&projects).await?;
    }

    let entry = TimeLogEntry {
        id: LogId::new(),
        task: task.clone(),
        minutes: elapsed_minutes,
        kind,
        at: clock.time(),
        project,
        task_id,
    };
    stores.time_logs.append(entry).await?;

    let ending = if interrupted { "Stopped early" } else { "Done" };
    println!(
        "{ending}. Logged {:.1}h {kind} on {task:?}",
        minutes_to_hours(elapsed_minutes)
    );
    Ok(())
}
