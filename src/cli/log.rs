use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Subcommand, ValueEnum};
use now::DateTimeNow;
use tracing::debug;

use crate::{
    aggregate::{
        matching::{resolve_project, MatchTarget},
        summary::minutes_to_hours,
    },
    storage::{
        entities::{LogId, LogType, Project, ProjectId, TaskId, TimeLogEntry},
        json_store::EntityStore,
        Stores,
    },
};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum LogCommand {
    #[command(about = "Record time against a task")]
    Add {
        task: String,
        #[arg(short, long, help = "Duration in minutes")]
        minutes: u32,
        #[arg(short, long, value_enum, default_value_t = LogType::Invested)]
        kind: LogType,
        #[arg(short, long, help = "Project the time belongs to")]
        project: Option<String>,
        #[arg(
            long,
            help = "Moment of the entry. Examples are \"yesterday\", \"1 hour ago\", \"15/03/2025\", \"12:00 16/03/2025\""
        )]
        at: Option<String>,
        #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
        date_style: DateStyle,
    },
    #[command(about = "List recorded time")]
    List {
        #[arg(
            long = "start",
            short,
            help = "Start of the range. Defaults to the beginning of this week"
        )]
        start_date: Option<String>,
        #[arg(long = "end", short, help = "End of the range. Defaults to now")]
        end_date: Option<String>,
        #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
        date_style: DateStyle,
    },
}

pub async fn process_log_command(command: LogCommand, stores: &Stores) -> Result<()> {
    match command {
        LogCommand::Add {
            task,
            minutes,
            kind,
            project,
            at,
            date_style,
        } => {
            let at = match at {
                Some(input) => parse_moment(&input, date_style)?,
                None => Local::now(),
            };

            let mut projects = stores.projects.load_all().await?;
            let resolved = project
                .as_deref()
                .and_then(|name| resolve_to_project(name, &projects));

            // Resolution happens once, at ingestion. The entry keeps the free
            // text for display but also the task id when one exists.
            let task_id = resolved
                .and_then(|id| attribute_to_task(&mut projects, id, &task, minutes as i64, kind));
            if task_id.is_some() {
                stores.projects.save_all(&projects).await?;
            } else if let Some(name) = project.as_deref() {
                debug!("Time for {name:?} recorded without a resolved task");
            }

            let entry = TimeLogEntry {
                id: LogId::new(),
                task: task.trim().to_string(),
                minutes: minutes as i64,
                kind,
                at: at.with_timezone(&Utc),
                project,
                task_id,
            };
            stores.time_logs.append(entry).await?;
            println!(
                "Logged {:.1}h {kind} on {:?}",
                minutes_to_hours(minutes as i64),
                task.trim()
            );
            Ok(())
        }
        LogCommand::List {
            start_date,
            end_date,
            date_style,
        } => {
            let start = match start_date {
                Some(input) => parse_moment(&input, date_style)?,
                None => Local::now().beginning_of_week(),
            };
            let end = match end_date {
                Some(input) => parse_moment(&input, date_style)?,
                None => Local::now(),
            };

            let logs = stores.time_logs.load_all().await?;
            for log in logs
                .iter()
                .filter(|l| l.at >= start.with_timezone(&Utc) && l.at <= end.with_timezone(&Utc))
            {
                println!(
                    "{}\t{}m\t{}\t{}\t{}",
                    log.at.with_timezone(&Local).format("%x %H:%M"),
                    log.minutes,
                    log.kind,
                    log.task,
                    log.project.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
    }
}

fn parse_moment(input: &str, date_style: DateStyle) -> Result<DateTime<Local>> {
    let dialect: chrono_english::Dialect = date_style.into();
    match parse_date_string(input, Local::now(), dialect) {
        Ok(v) => Ok(v.with_timezone(&Local)),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {input:?}: {e}"),
            )
            .into()),
    }
}

pub(super) fn resolve_to_project(name: &str, projects: &[Project]) -> Option<ProjectId> {
    let targets: Vec<MatchTarget<'_>> = projects
        .iter()
        .map(|p| MatchTarget {
            id: p.id,
            name: &p.name,
        })
        .collect();
    resolve_project(name, &targets)
}

/// Mirrors the logged minutes onto the task's hour counters when the task
/// exists under the resolved project.
pub(super) fn attribute_to_task(
    projects: &mut [Project],
    project: ProjectId,
    task: &str,
    minutes: i64,
    kind: LogType,
) -> Option<TaskId> {
    let project = projects.iter_mut().find(|p| p.id == project)?;
    let task = project.find_task_mut(task)?;
    let hours = minutes_to_hours(minutes);
    match kind {
        LogType::Invested => task.invested_hours += hours,
        LogType::Spent => task.spent_hours += hours,
    }
    Some(task.id)
}
