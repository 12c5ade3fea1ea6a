//! Recurring care-task calendar.
//!
//! Turns declarative repeating schedules into concrete, deterministically
//! identified task occurrences.

pub mod dates;
pub mod repository;
pub mod rules;
pub mod types;

pub use repository::{MemoryTaskRepository, TaskRepository};
pub use rules::{generate_tasks, merge_generated, normalize_recurrence};
pub use types::{
    CareTask, GenerationWindow, Recurrence, TaskSchedule, TaskStatus, TaskType, Weekday,
};
