//! Shared fixtures for integration tests.

use std::sync::Arc;

use chrono::NaiveDate;
use verdant::calendar::{Recurrence, TaskSchedule, TaskType};
use verdant::notifications::{
    MemoryNotificationClient, NotificationReconciler, NotificationScheduler,
};

pub fn date(value: &str) -> NaiveDate {
    verdant::calendar::dates::parse_date_only(value).expect("valid fixture date")
}

pub fn schedule(plant_id: &str, start: &str, recurrence: Recurrence) -> TaskSchedule {
    TaskSchedule {
        plant_id: plant_id.to_owned(),
        plant_name: format!("Plant {plant_id}"),
        task_type: TaskType::Water,
        title: format!("Water {plant_id}"),
        start_date: start.to_owned(),
        recurrence,
    }
}

pub fn memory_reconciler() -> (Arc<MemoryNotificationClient>, NotificationReconciler) {
    let client = Arc::new(MemoryNotificationClient::granted());
    let reconciler = NotificationReconciler::new(NotificationScheduler::new(client.clone()));
    (client, reconciler)
}
