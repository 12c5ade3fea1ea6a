//! Verdant: recurring plant-care tasks and their reminder notifications.
//!
//! This crate provides the scheduling core of a plant-care app:
//! Schedule + Rule → tasks → reminder payloads → notification store
//!
//! # Architecture
//!
//! - **Rules**: validates and canonicalizes daily/weekly/monthly recurrence
//! - **Generator**: expands a schedule over a date window into task occurrences
//!   with deterministic ids
//! - **Builder**: turns one task into a reminder payload at a fixed UTC hour
//! - **Reconciler**: diffs the scheduled notifications against the pending
//!   tasks and issues the cancel/schedule calls that close the gap
//!
//! All dates are UTC calendar dates. Storage and the notification transport
//! are collaborators behind [`calendar::TaskRepository`] and
//! [`notifications::NotificationClient`].

pub mod calendar;
pub mod config;
pub mod error;
pub mod notifications;

pub use calendar::{CareTask, GenerationWindow, Recurrence, TaskSchedule, TaskStatus, TaskType};
pub use config::CareConfig;
pub use error::{CareError, Result};
pub use notifications::{NotificationReconciler, NotificationScheduler, SyncReport};
