//! Care reminder notifications.
//!
//! Builds reminder payloads from care tasks and reconciles them against the
//! platform notification scheduler.

pub mod builder;
pub mod scheduler;
pub mod sync;
pub mod types;

pub use builder::{DEFAULT_REMINDER_HOUR_UTC, ReminderOptions, build_task_notification};
pub use scheduler::{MemoryNotificationClient, NotificationClient, NotificationScheduler};
pub use sync::{NotificationReconciler, SyncEvent, SyncEventCallback, SyncGuard, SyncReport};
pub use types::{
    NotificationChannel, NotificationPayload, PermissionStatus, ScheduleOptions, ScheduledRecord,
};
