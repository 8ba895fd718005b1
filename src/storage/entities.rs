use std::fmt::Display;

use chrono::DateTime;
use chrono::Utc;
use clap::ValueEnum;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Identity of a [Project]. Time logs resolved against a project carry this
/// instead of re-deriving a fuzzy name match on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogId(Uuid);

impl LogId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Fixed categorical tag grouping projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifeArea {
    WorkCareer,
    HealthRoutines,
    Relationships,
    LearningGrowth,
    LeisurePlay,
    FinanceAdmin,
}

impl Display for LifeArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifeArea::WorkCareer => write!(f, "Work / Career"),
            LifeArea::HealthRoutines => write!(f, "Health & Routines"),
            LifeArea::Relationships => write!(f, "Relationships"),
            LifeArea::LearningGrowth => write!(f, "Learning & Growth"),
            LifeArea::LeisurePlay => write!(f, "Leisure & Play"),
            LifeArea::FinanceAdmin => write!(f, "Finance & Admin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Planning,
    Active,
    Completed,
}

impl Default for ProjectStatus {
    // Records written before statuses existed count as active.
    fn default() -> Self {
        ProjectStatus::Active
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Planning => write!(f, "planning"),
            ProjectStatus::Active => write!(f, "active"),
            ProjectStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A project with its ordered tasks. The name doubles as the join key for time
/// logs written without a task id, so it should stay unique among active
/// projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub area: LifeArea,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Project {
    pub fn new(name: impl Into<String>, area: LifeArea, status: ProjectStatus) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            area,
            status,
            tasks: Vec::new(),
        }
    }

    pub fn find_task_mut(&mut self, name: &str) -> Option<&mut Task> {
        let name = name.trim();
        self.tasks
            .iter_mut()
            .find(|t| t.name.trim().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub invested_hours: f64,
    #[serde(default)]
    pub spent_hours: f64,
}

impl Task {
    pub fn new(name: impl Into<String>, estimated_hours: f64) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            completed: false,
            estimated_hours,
            invested_hours: 0.,
            spent_hours: 0.,
        }
    }
}

/// Whether logged time counts as deliberate effort or as consumed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Invested,
    Spent,
}

impl Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogType::Invested => write!(f, "invested"),
            LogType::Spent => write!(f, "spent"),
        }
    }
}

/// One logged slice of time. Immutable once created; the collection is
/// append-only. `project` stays free text because entries may predate the
/// project they belong to, resolution happens at aggregation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeLogEntry {
    pub id: LogId,
    pub task: String,
    pub minutes: i64,
    pub kind: LogType,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub task_id: Option<TaskId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    Queued,
    Reading,
    Finished,
}

impl Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadingStatus::Queued => write!(f, "queued"),
            ReadingStatus::Reading => write!(f, "reading"),
            ReadingStatus::Finished => write!(f, "finished"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingItem {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    pub status: ReadingStatus,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeisureItem {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub done: bool,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceMemo {
    pub id: Uuid,
    pub note: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Record of the weekly reflection ritual. Projects spawned during the session
/// are referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySession {
    pub id: Uuid,
    pub held_at: DateTime<Utc>,
    pub dissatisfactions: Vec<String>,
    pub hypotheses: Vec<String>,
    #[serde(default)]
    pub spawned_projects: Vec<ProjectId>,
}
