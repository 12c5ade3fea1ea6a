//! Notification payload and scheduler record types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery channel a notification is posted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    /// Plant-care reminders.
    #[default]
    Care,
    /// Weather alerts.
    Weather,
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Care => f.write_str("care"),
            Self::Weather => f.write_str("weather"),
        }
    }
}

/// OS-level notification authorization state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

impl PermissionStatus {
    /// Returns `true` only for [`PermissionStatus::Granted`].
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Undetermined => "undetermined",
        };
        f.write_str(s)
    }
}

/// A notification ready to hand to the scheduler.
///
/// `id` equals the source task id, giving a stable 1:1 link between a task
/// occurrence and its reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Serialized as an ISO-8601 UTC instant.
    pub scheduled_at: DateTime<Utc>,
    pub channel: NotificationChannel,
    /// Deep-link data: `taskId`, `plantId`, `type`.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// The scheduler's view of one notification it currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledRecord {
    pub id: String,
    pub scheduled_at: DateTime<Utc>,
}

impl From<&NotificationPayload> for ScheduledRecord {
    fn from(payload: &NotificationPayload) -> Self {
        Self {
            id: payload.id.clone(),
            scheduled_at: payload.scheduled_at,
        }
    }
}

/// Per-call options for [`schedule_notification`].
///
/// [`schedule_notification`]: crate::notifications::NotificationScheduler::schedule_notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOptions {
    /// Request permission (once) before scheduling when not yet granted.
    pub require_permission: bool,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            require_permission: true,
        }
    }
}
