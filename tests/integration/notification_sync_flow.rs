use verdant::calendar::{
    GenerationWindow, MemoryTaskRepository, Recurrence, TaskRepository, TaskStatus, Weekday,
    generate_tasks,
};
use verdant::notifications::scheduler::ClientCall;
use verdant::notifications::{SyncGuard, SyncReport};
use verdant::{CareConfig, CareTask};

use crate::helpers::{date, memory_reconciler, schedule};

fn weekly_tasks() -> Vec<CareTask> {
    let s = schedule(
        "fern",
        "2024-01-01",
        Recurrence::Weekly {
            interval: 1,
            weekdays: vec![Weekday::Mon, Weekday::Thu],
        },
    );
    generate_tasks(&s, &GenerationWindow::until("2024-01-31")).unwrap()
}

fn mutations(calls: &[ClientCall]) -> usize {
    calls.iter().filter(|c| !matches!(c, ClientCall::List)).count()
}

#[tokio::test]
async fn generated_schedule_converges_and_stays_converged() {
    let (client, reconciler) = memory_reconciler();
    let tasks = weekly_tasks();
    let today = date("2024-01-10");

    let first = reconciler.reconcile(&tasks, today).await.unwrap();
    // Jan 11, 15, 18, 22, 25, 29 are on or after the 10th.
    assert_eq!(first.scheduled.len(), 6);
    assert!(first.is_clean());

    client.clear_calls();
    let second = reconciler.reconcile(&tasks, today).await.unwrap();
    assert_eq!(second.operations(), 0);
    assert_eq!(mutations(&client.calls()), 0);
}

#[tokio::test]
async fn completing_and_removing_tasks_cancels_their_reminders() {
    let (client, reconciler) = memory_reconciler();
    let repo = MemoryTaskRepository::new(weekly_tasks());
    let today = date("2024-01-10");
    reconciler.sync_from_repository(&repo, today).await.unwrap();

    let mut done = repo.get_by_id("fern-water-2024-01-11").await.unwrap().unwrap();
    done.status = TaskStatus::Done;
    repo.update(done).await.unwrap();
    let mut skipped = repo.get_by_id("fern-water-2024-01-15").await.unwrap().unwrap();
    skipped.skip();
    repo.update(skipped).await.unwrap();
    repo.remove("fern-water-2024-01-18").await.unwrap();

    let report = reconciler.sync_from_repository(&repo, today).await.unwrap();
    assert_eq!(
        report.canceled,
        vec![
            "fern-water-2024-01-11",
            "fern-water-2024-01-15",
            "fern-water-2024-01-18"
        ]
    );
    assert_eq!(report.unchanged, 3);
    assert_eq!(client.records().len(), 3);
}

#[tokio::test]
async fn tasks_falling_into_the_past_are_pruned() {
    let (client, reconciler) = memory_reconciler();
    let tasks = weekly_tasks();
    reconciler.reconcile(&tasks, date("2024-01-10")).await.unwrap();

    let report = reconciler.reconcile(&tasks, date("2024-01-20")).await.unwrap();
    assert_eq!(
        report.canceled,
        vec!["fern-water-2024-01-11", "fern-water-2024-01-15", "fern-water-2024-01-18"]
    );
    assert!(client.records().iter().all(|r| r.id.as_str() > "fern-water-2024-01-20"));
}

#[tokio::test]
async fn moved_due_date_cancels_old_and_schedules_new() {
    let (client, reconciler) = memory_reconciler();
    let mut task = weekly_tasks().remove(3);
    let today = date("2024-01-01");
    reconciler.reconcile(std::slice::from_ref(&task), today).await.unwrap();
    let old_at = client.records()[0].scheduled_at;

    // Same id, new date: the reminder moves.
    task.due_date = "2024-01-13".to_owned();
    client.clear_calls();
    let report = reconciler.reconcile(std::slice::from_ref(&task), today).await.unwrap();

    assert_eq!(report.rescheduled, vec![task.id.clone()]);
    assert_eq!(
        client.calls(),
        vec![
            ClientCall::List,
            ClientCall::Cancel(task.id.clone()),
            ClientCall::Schedule(task.id.clone()),
        ]
    );
    assert_ne!(client.records()[0].scheduled_at, old_at);
}

#[tokio::test]
async fn denied_permission_is_reported_per_item() {
    let (client, reconciler) = memory_reconciler();
    client.deny_permission();
    let report = reconciler
        .reconcile(&weekly_tasks(), date("2024-01-28"))
        .await
        .unwrap();
    assert!(report.scheduled.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].error.code(), "PERMISSION_DENIED");
    assert!(client.records().is_empty());
}

#[tokio::test]
async fn settings_toggle_clears_then_restores() {
    let (client, reconciler) = memory_reconciler();
    let guard = SyncGuard::new(reconciler);
    let tasks = weekly_tasks();
    let today = date("2024-01-10");

    let enabled = CareConfig::default();
    guard.sync_with_config(&tasks, &enabled, today).await.unwrap();
    assert_eq!(client.records().len(), 6);

    let disabled = CareConfig {
        notifications_enabled: false,
        ..CareConfig::default()
    };
    let cleared: SyncReport = guard.sync_with_config(&tasks, &disabled, today).await.unwrap();
    assert!(cleared.cleared_all);
    assert!(client.records().is_empty());

    let evening = CareConfig {
        reminder_hour: 19,
        ..CareConfig::default()
    };
    let restored = guard.sync_with_config(&tasks, &evening, today).await.unwrap();
    assert_eq!(restored.scheduled.len(), 6);
    assert!(
        client
            .records()
            .iter()
            .all(|r| r.scheduled_at.format("%H:%M").to_string() == "19:00")
    );
}
