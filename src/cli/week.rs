use ansi_term::Style;
use anyhow::Result;
use chrono::Local;

use crate::{
    aggregate::summary::{compute_weekly_summaries, WeeklyReport},
    storage::{
        entities::{Project, ProjectStatus},
        json_store::EntityStore,
        Stores,
    },
};

#[derive(Debug, Clone, Copy, clap::Args)]
pub struct WeekCommand {
    #[arg(long, help = "Include projects still in planning")]
    planning: bool,
}

/// Command to show this week's per-project rollup. The window always starts
/// on Monday 00:00 local time.
pub async fn process_week_command(command: WeekCommand, stores: &Stores) -> Result<()> {
    let projects = stores.projects.load_all().await?;
    let logs = stores.time_logs.load_all().await?;

    let included: Vec<Project> = projects
        .into_iter()
        .filter(|p| match p.status {
            ProjectStatus::Active => true,
            ProjectStatus::Planning => command.planning,
            ProjectStatus::Completed => false,
        })
        .collect();

    let report = compute_weekly_summaries(&included, &logs, Local::now());
    print_report(&report);
    Ok(())
}

fn print_report(report: &WeeklyReport) {
    println!(
        "Week of {}\n",
        report.week_start.format("%x")
    );

    for summary in &report.summaries {
        println!(
            "{}\ttotal {}\tinvested {}\tspent {}",
            Style::new().bold().paint(summary.name.as_str()),
            format_hours(summary.total_hours),
            format_hours(summary.invested_hours),
            format_hours(summary.spent_hours),
        );
        for entry in &summary.entries {
            println!(
                "    {}\t{}\t{}",
                entry.kind,
                format_hours(entry.hours()),
                entry.task
            );
        }
    }

    if !report.unmatched.is_empty() {
        println!(
            "\n{} time logs matched no project this week and are left out of the totals.",
            report.unmatched.len()
        );
        for log in &report.unmatched {
            println!(
                "    {}\t{}m\t{}\t{}",
                log.at.with_timezone(&Local).format("%x %H:%M"),
                log.minutes,
                log.task,
                log.project.as_deref().unwrap_or("(no project)")
            );
        }
    }
}

fn format_hours(hours: f64) -> String {
    format!("{hours:.1}h")
}
