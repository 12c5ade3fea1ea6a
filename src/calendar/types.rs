//! Care calendar domain types.
//!
//! Defines the [`Recurrence`] rule union, the [`CareTask`] occurrence record,
//! and the [`TaskSchedule`] / [`GenerationWindow`] inputs to the generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of care action a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Water,
    Prune,
    Repot,
    Mist,
    Custom,
}

impl TaskType {
    /// Stable lowercase identifier, used in task ids and payload data.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Prune => "prune",
            Self::Repot => "repot",
            Self::Mist => "mist",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "water" => Ok(Self::Water),
            "prune" => Ok(Self::Prune),
            "repot" => Ok(Self::Repot),
            "mist" => Ok(Self::Mist),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown task type: {other}")),
        }
    }
}

/// Lifecycle status of a single task occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
    Skipped,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Day of the week as used by weekly recurrence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Mon,
            chrono::Weekday::Tue => Self::Tue,
            chrono::Weekday::Wed => Self::Wed,
            chrono::Weekday::Thu => Self::Thu,
            chrono::Weekday::Fri => Self::Fri,
            chrono::Weekday::Sat => Self::Sat,
            chrono::Weekday::Sun => Self::Sun,
        }
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mon" | "monday" => Ok(Self::Mon),
            "tue" | "tuesday" => Ok(Self::Tue),
            "wed" | "wednesday" => Ok(Self::Wed),
            "thu" | "thursday" => Ok(Self::Thu),
            "fri" | "friday" => Ok(Self::Fri),
            "sat" | "saturday" => Ok(Self::Sat),
            "sun" | "sunday" => Ok(Self::Sun),
            other => Err(format!("unknown weekday: {other}")),
        }
    }
}

/// A repeating occurrence pattern. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frequency", rename_all = "snake_case")]
pub enum Recurrence {
    /// Every `interval` days.
    Daily {
        interval: u32,
    },
    /// On the listed weekdays of every `interval`-th week, counted from the
    /// schedule start.
    Weekly {
        interval: u32,
        weekdays: Vec<Weekday>,
    },
    /// On the listed days of every `interval`-th month.
    Monthly {
        interval: u32,
        #[serde(rename = "monthDays")]
        month_days: Vec<u32>,
    },
}

impl Recurrence {
    /// The step between active periods, in the rule's own unit.
    pub fn interval(&self) -> u32 {
        match self {
            Self::Daily { interval }
            | Self::Weekly { interval, .. }
            | Self::Monthly { interval, .. } => *interval,
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily { interval: 1 } => write!(f, "daily"),
            Self::Daily { interval } => write!(f, "every {interval} days"),
            Self::Weekly { interval, weekdays } => {
                let days: Vec<String> = weekdays
                    .iter()
                    .map(|d| format!("{d:?}").to_lowercase())
                    .collect();
                if *interval == 1 {
                    write!(f, "weekly on {}", days.join(","))
                } else {
                    write!(f, "every {interval} weeks on {}", days.join(","))
                }
            }
            Self::Monthly { interval, month_days } => {
                let days: Vec<String> = month_days.iter().map(u32::to_string).collect();
                if *interval == 1 {
                    write!(f, "monthly on day {}", days.join(","))
                } else {
                    write!(f, "every {interval} months on day {}", days.join(","))
                }
            }
        }
    }
}

/// One concrete care-task occurrence.
///
/// `id` is derived from `(plant_id, task_type, due_date)`, so regenerating the
/// same schedule over the same window reproduces identical ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareTask {
    pub id: String,
    pub plant_id: String,
    pub plant_name: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub title: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub due_date: String,
    pub status: TaskStatus,
    pub recurrence: Option<Recurrence>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl CareTask {
    /// Deterministic task id for an occurrence.
    pub fn occurrence_id(plant_id: &str, task_type: TaskType, due_date: &str) -> String {
        format!("{plant_id}-{task_type}-{due_date}")
    }

    /// Returns `true` if the task is still waiting to be done.
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Mark the task done at `at`.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.status = TaskStatus::Done;
        self.completed_at = Some(at);
    }

    /// Mark the task skipped. Clears any completion timestamp.
    pub fn skip(&mut self) {
        self.status = TaskStatus::Skipped;
        self.completed_at = None;
    }
}

/// Declarative schedule for one plant's recurring care action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSchedule {
    pub plant_id: String,
    pub plant_name: String,
    pub task_type: TaskType,
    pub title: String,
    /// First eligible date, `YYYY-MM-DD`.
    pub start_date: String,
    pub recurrence: Recurrence,
}

/// Generation bounds paired with a schedule's start date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationWindow {
    /// Last eligible date (inclusive), `YYYY-MM-DD`.
    pub end_date: String,
    /// Stop after this many occurrences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tasks: Option<usize>,
    /// Status assigned to every generated task. Defaults to pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl GenerationWindow {
    /// Window ending on `end_date` with no cap and pending status.
    pub fn until(end_date: impl Into<String>) -> Self {
        Self {
            end_date: end_date.into(),
            max_tasks: None,
            status: None,
        }
    }

    /// Cap the number of generated tasks.
    pub fn with_max_tasks(mut self, max_tasks: usize) -> Self {
        self.max_tasks = Some(max_tasks);
        self
    }

    /// Override the status of generated tasks.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}
