use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use now::DateTimeNow;
use tracing::warn;

use crate::storage::entities::{LogType, Project, ProjectId, TimeLogEntry};

use super::matching::{resolve_project, MatchTarget};

/// Time logged against one (task name, type) pair within a project's week.
/// The same task shows up twice when it was logged under both types.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEntry {
    pub task: String,
    pub kind: LogType,
    pub minutes: i64,
}

impl TaskEntry {
    pub fn hours(&self) -> f64 {
        minutes_to_hours(self.minutes)
    }
}

/// Derived weekly rollup for one project. Never persisted, recomputed on
/// every view.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyProjectSummary {
    pub project: ProjectId,
    pub name: String,
    pub total_hours: f64,
    pub invested_hours: f64,
    pub spent_hours: f64,
    pub entries: Vec<TaskEntry>,
}

impl WeeklyProjectSummary {
    fn empty(project: &Project) -> Self {
        Self {
            project: project.id,
            name: project.name.clone(),
            total_hours: 0.,
            invested_hours: 0.,
            spent_hours: 0.,
            entries: Vec::new(),
        }
    }

    fn add(&mut self, log: &TimeLogEntry) {
        let hours = minutes_to_hours(log.minutes);
        self.total_hours += hours;
        match log.kind {
            LogType::Invested => self.invested_hours += hours,
            LogType::Spent => self.spent_hours += hours,
        }

        let task = log.task.trim();
        match self
            .entries
            .iter_mut()
            .find(|e| e.kind == log.kind && e.task == task)
        {
            Some(entry) => entry.minutes += log.minutes,
            None => self.entries.push(TaskEntry {
                task: task.to_string(),
                kind: log.kind,
                minutes: log.minutes,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyReport {
    pub week_start: DateTime<Local>,
    /// One summary per input project, in input order, zeroed when nothing was
    /// logged.
    pub summaries: Vec<WeeklyProjectSummary>,
    /// Logs inside the window that carried no project name or resolved to no
    /// project. Excluded from every total.
    pub unmatched: Vec<TimeLogEntry>,
}

/// Rolls this week's time logs up into per-project summaries.
///
/// The window runs from Monday 00:00:00 local time through `now`; entries at
/// exactly the boundary count. `now` is injected so that views and tests pin
/// the window themselves. Pure over its inputs.
pub fn compute_weekly_summaries(
    projects: &[Project],
    logs: &[TimeLogEntry],
    now: DateTime<Local>,
) -> WeeklyReport {
    let week_start = now.beginning_of_week();
    let cutoff = week_start.with_timezone(&Utc);

    let mut summaries: Vec<WeeklyProjectSummary> = projects
        .iter()
        .map(WeeklyProjectSummary::empty)
        .collect();
    let index_of: HashMap<ProjectId, usize> = summaries
        .iter()
        .enumerate()
        .map(|(index, s)| (s.project, index))
        .collect();
    let targets: Vec<MatchTarget<'_>> = projects
        .iter()
        .map(|p| MatchTarget {
            id: p.id,
            name: &p.name,
        })
        .collect();

    let mut unmatched = Vec::new();

    for log in logs.iter().filter(|l| l.at >= cutoff) {
        if log.minutes <= 0 {
            if log.minutes < 0 {
                warn!("Skipping time log {:?} with negative duration", log.id);
            }
            continue;
        }

        let resolved = log
            .project
            .as_deref()
            .and_then(|name| resolve_project(name, &targets));

        let Some(project) = resolved else {
            unmatched.push(log.clone());
            continue;
        };

        // Ids in `targets` come from the same projects the summaries were
        // built from, so the lookup always succeeds.
        if let Some(&index) = index_of.get(&project) {
            summaries[index].add(log);
        }
    }

    if !unmatched.is_empty() {
        warn!(
            "{} time logs this week matched no project and were left out of the totals",
            unmatched.len()
        );
    }

    WeeklyReport {
        week_start,
        summaries,
        unmatched,
    }
}

pub fn minutes_to_hours(minutes: i64) -> f64 {
    minutes as f64 / 60.
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Local, TimeZone, Utc};

    use crate::{
        storage::entities::{LifeArea, LogId, LogType, Project, ProjectStatus, TimeLogEntry},
        utils::logging::TEST_LOGGING,
    };

    use super::{compute_weekly_summaries, minutes_to_hours};

    // 2024-04-01 is a Monday, so the week of this instant starts at
    // 2024-04-01 00:00:00 local time.
    fn test_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 4, 3, 12, 0, 0).unwrap()
    }

    fn monday() -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2024, 4, 1, 0, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn project(name: &str) -> Project {
        Project::new(name, LifeArea::WorkCareer, ProjectStatus::Active)
    }

    fn log(project: Option<&str>, task: &str, minutes: i64, kind: LogType, at: DateTime<Utc>) -> TimeLogEntry {
        TimeLogEntry {
            id: LogId::new(),
            task: task.into(),
            minutes,
            kind,
            at,
            project: project.map(Into::into),
            task_id: None,
        }
    }

    #[test]
    fn test_projects_without_logs_come_out_zeroed() {
        let projects = vec![project("Alpha"), project("Beta")];
        let report = compute_weekly_summaries(&projects, &[], test_now());

        assert_eq!(report.summaries.len(), 2);
        for (summary, project) in report.summaries.iter().zip(&projects) {
            assert_eq!(summary.project, project.id);
            assert_eq!(summary.name, project.name);
            assert_eq!(summary.total_hours, 0.);
            assert_eq!(summary.invested_hours, 0.);
            assert_eq!(summary.spent_hours, 0.);
            assert!(summary.entries.is_empty());
        }
    }

    #[test]
    fn test_week_boundary_is_inclusive() {
        let projects = vec![project("Alpha")];
        let logs = vec![
            log(Some("Alpha"), "on the line", 60, LogType::Invested, monday()),
            log(
                Some("Alpha"),
                "just before",
                60,
                LogType::Invested,
                monday() - Duration::seconds(1),
            ),
        ];

        let report = compute_weekly_summaries(&projects, &logs, test_now());

        assert_eq!(report.summaries[0].total_hours, 1.);
        assert_eq!(report.summaries[0].entries.len(), 1);
        assert_eq!(report.summaries[0].entries[0].task, "on the line");
    }

    #[test]
    fn test_parenthesized_project_scenario() {
        let projects = vec![project("Writing (Book)")];
        let logs = vec![log(
            Some("Book"),
            "Draft chapter",
            60,
            LogType::Invested,
            monday() + Duration::hours(1),
        )];

        let report = compute_weekly_summaries(&projects, &logs, test_now());
        let summary = &report.summaries[0];

        assert_eq!(summary.invested_hours, 1.);
        assert_eq!(summary.total_hours, 1.);
        assert_eq!(summary.spent_hours, 0.);
        assert_eq!(summary.entries.len(), 1);
        assert!(report.unmatched.is_empty());
    }

    #[test]
    fn test_exact_match_takes_priority_over_substring() {
        let projects = vec![project("Alpha Beta"), project("Alpha")];
        let logs = vec![log(
            Some("Alpha"),
            "task",
            30,
            LogType::Invested,
            monday() + Duration::hours(2),
        )];

        let report = compute_weekly_summaries(&projects, &logs, test_now());

        assert_eq!(report.summaries[0].total_hours, 0.);
        assert_eq!(report.summaries[1].total_hours, 0.5);
    }

    #[test]
    fn test_entries_split_by_type_and_sum_to_counters() {
        let projects = vec![project("Alpha")];
        let at = monday() + Duration::hours(3);
        let logs = vec![
            log(Some("Alpha"), "research", 30, LogType::Invested, at),
            log(Some("Alpha"), "research", 45, LogType::Invested, at),
            log(Some("Alpha"), "research", 20, LogType::Spent, at),
            log(Some("Alpha"), "email", 10, LogType::Spent, at),
        ];

        let report = compute_weekly_summaries(&projects, &logs, test_now());
        let summary = &report.summaries[0];

        // "research" appears once per type, accumulated.
        assert_eq!(summary.entries.len(), 3);

        let invested_minutes: i64 = summary
            .entries
            .iter()
            .filter(|e| e.kind == LogType::Invested)
            .map(|e| e.minutes)
            .sum();
        let spent_minutes: i64 = summary
            .entries
            .iter()
            .filter(|e| e.kind == LogType::Spent)
            .map(|e| e.minutes)
            .sum();

        assert_eq!(minutes_to_hours(invested_minutes), summary.invested_hours);
        assert_eq!(minutes_to_hours(spent_minutes), summary.spent_hours);
        assert_eq!(summary.total_hours, summary.invested_hours + summary.spent_hours);
    }

    #[test]
    fn test_unmatched_and_projectless_logs_are_reported_not_totaled() {
        *TEST_LOGGING;
        let projects = vec![project("Alpha")];
        let at = monday() + Duration::hours(1);
        let logs = vec![
            log(None, "floating", 60, LogType::Invested, at),
            log(Some("Nothing Like It"), "elsewhere", 60, LogType::Spent, at),
            log(Some("Alpha"), "counted", 60, LogType::Invested, at),
        ];

        let report = compute_weekly_summaries(&projects, &logs, test_now());

        assert_eq!(report.summaries[0].total_hours, 1.);
        assert_eq!(report.unmatched.len(), 2);
    }

    #[test]
    fn test_non_positive_durations_are_skipped() {
        let projects = vec![project("Alpha")];
        let at = monday() + Duration::hours(1);
        let logs = vec![
            log(Some("Alpha"), "empty", 0, LogType::Invested, at),
            log(Some("Alpha"), "negative", -30, LogType::Invested, at),
        ];

        let report = compute_weekly_summaries(&projects, &logs, test_now());

        assert_eq!(report.summaries[0].total_hours, 0.);
        assert!(report.summaries[0].entries.is_empty());
        assert!(report.unmatched.is_empty());
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let projects = vec![project("Alpha"), project("Writing (Book)")];
        let logs = vec![
            log(Some("Alpha"), "a", 15, LogType::Invested, monday() + Duration::hours(1)),
            log(Some("Book"), "b", 90, LogType::Spent, monday() + Duration::hours(2)),
            log(Some("Lost"), "c", 5, LogType::Spent, monday() + Duration::hours(3)),
        ];

        let first = compute_weekly_summaries(&projects, &logs, test_now());
        let second = compute_weekly_summaries(&projects, &logs, test_now());

        assert_eq!(first, second);
    }
}
