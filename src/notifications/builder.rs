//! Maps a care task onto a scheduled-notification payload.

use std::collections::BTreeMap;

use chrono::{NaiveTime, TimeZone, Utc};

use crate::calendar::dates::parse_date_only;
use crate::calendar::types::CareTask;
use crate::error::{CareError, Result};
use crate::notifications::types::{NotificationChannel, NotificationPayload};

/// Hour of day (UTC) reminders fire when no override is given.
pub const DEFAULT_REMINDER_HOUR_UTC: u8 = 8;

/// Options for [`build_task_notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderOptions {
    /// Hour of day (0-23, UTC) on the due date.
    pub reminder_hour: u8,
    /// Channel the reminder is posted to.
    pub channel: NotificationChannel,
}

impl Default for ReminderOptions {
    fn default() -> Self {
        Self {
            reminder_hour: DEFAULT_REMINDER_HOUR_UTC,
            channel: NotificationChannel::Care,
        }
    }
}

impl ReminderOptions {
    /// Options firing at `hour` UTC on the default channel.
    pub fn at_hour(hour: u8) -> Self {
        Self {
            reminder_hour: hour,
            ..Self::default()
        }
    }
}

/// Build the reminder notification for `task`.
///
/// The payload fires at `reminder_hour:00:00` UTC on the task's due date and
/// reuses the task id.
///
/// # Errors
///
/// Returns [`CareError::Build`] if the due date does not parse or the
/// reminder hour is outside `0..=23`.
pub fn build_task_notification(
    task: &CareTask,
    options: ReminderOptions,
) -> Result<NotificationPayload> {
    let due = parse_date_only(&task.due_date).ok_or_else(|| {
        CareError::Build(format!(
            "invalid task due date for notification: {:?} (task {})",
            task.due_date, task.id
        ))
    })?;
    let time = NaiveTime::from_hms_opt(u32::from(options.reminder_hour), 0, 0).ok_or_else(|| {
        CareError::Build(format!(
            "reminder hour must be 0-23 (got {})",
            options.reminder_hour
        ))
    })?;
    let scheduled_at = Utc.from_utc_datetime(&due.and_time(time));

    let mut data = BTreeMap::new();
    data.insert("taskId".to_owned(), task.id.clone());
    data.insert("plantId".to_owned(), task.plant_id.clone());
    data.insert("type".to_owned(), task.task_type.as_str().to_owned());

    Ok(NotificationPayload {
        id: task.id.clone(),
        title: task.title.clone(),
        body: format!("Care reminder for {}.", task.plant_name),
        scheduled_at,
        channel: options.channel,
        data,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::calendar::types::{TaskStatus, TaskType};

    fn task(id: &str, due: &str) -> CareTask {
        CareTask {
            id: id.to_owned(),
            plant_id: "p1".to_owned(),
            plant_name: "Aloe".to_owned(),
            task_type: TaskType::Water,
            title: "Water Aloe".to_owned(),
            due_date: due.to_owned(),
            status: TaskStatus::Pending,
            recurrence: None,
            completed_at: None,
            notes: None,
        }
    }

    #[test]
    fn builds_payload_at_default_hour() {
        let payload =
            build_task_notification(&task("task-1", "2024-01-10"), ReminderOptions::default())
                .unwrap();
        assert_eq!(payload.id, "task-1");
        assert_eq!(payload.title, "Water Aloe");
        assert_eq!(payload.body, "Care reminder for Aloe.");
        assert_eq!(payload.channel, NotificationChannel::Care);
        assert_eq!(payload.scheduled_at.to_rfc3339(), "2024-01-10T08:00:00+00:00");
        assert_eq!(payload.data["taskId"], "task-1");
        assert_eq!(payload.data["plantId"], "p1");
        assert_eq!(payload.data["type"], "water");
    }

    #[test]
    fn uses_custom_reminder_hour() {
        let payload =
            build_task_notification(&task("task-3", "2024-01-10"), ReminderOptions::at_hour(14))
                .unwrap();
        assert_eq!(payload.scheduled_at.to_rfc3339(), "2024-01-10T14:00:00+00:00");
    }

    #[test]
    fn scheduled_at_serializes_as_utc_instant() {
        let payload = build_task_notification(&task("t", "2024-01-10"), ReminderOptions::default())
            .unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["scheduledAt"], "2024-01-10T08:00:00Z");
    }

    #[test]
    fn rejects_invalid_due_date() {
        let err =
            build_task_notification(&task("task-2", "invalid-date"), ReminderOptions::default())
                .unwrap_err();
        assert!(matches!(err, CareError::Build(_)));
        assert!(err.to_string().contains("invalid task due date"));
    }

    #[test]
    fn rejects_loosely_formatted_due_date() {
        for due in ["+2024-1-10", "2024-01-10 ", " 2024-01-10", "2024- 1-10"] {
            let err = build_task_notification(&task("t", due), ReminderOptions::default())
                .unwrap_err();
            assert!(matches!(err, CareError::Build(_)), "accepted {due:?}");
        }
    }

    #[test]
    fn rejects_out_of_range_hour() {
        let err = build_task_notification(&task("t", "2024-01-10"), ReminderOptions::at_hour(24))
            .unwrap_err();
        assert!(matches!(err, CareError::Build(_)));
    }
}
