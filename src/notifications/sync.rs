//! Notification reconciliation.
//!
//! [`NotificationReconciler`] keeps the external notification store in step
//! with the pending, not-yet-past tasks of the current task list:
//!
//! ```text
//! tasks ─filter(pending, due >= today)─▶ build ─▶ target {id: payload}
//! scheduler.scheduled() ─────────────────────────▶ actual {id: record}
//!
//! actual \ target            ─▶ cancel            (concurrently)
//! target \ actual            ─▶ schedule
//! both, scheduled_at differs ─▶ cancel, then schedule
//! ```
//!
//! The reconciler keeps no state between passes. Ids are derived from task
//! content, so repeating a pass over an unchanged task list issues no
//! operations. Failures are collected per item; the next pass re-attempts
//! whatever was left inconsistent.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::join_all;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::calendar::dates::{parse_date_only, today_utc};
use crate::calendar::repository::TaskRepository;
use crate::calendar::types::CareTask;
use crate::config::CareConfig;
use crate::error::{CareError, Result};
use crate::notifications::builder::{ReminderOptions, build_task_notification};
use crate::notifications::scheduler::NotificationScheduler;
use crate::notifications::types::{NotificationPayload, ScheduleOptions, ScheduledRecord};

/// Scheduler operation kinds reported by a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
    /// Building the payload for a task.
    Build,
    Schedule,
    Cancel,
}

impl fmt::Display for SyncOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => f.write_str("build"),
            Self::Schedule => f.write_str("schedule"),
            Self::Cancel => f.write_str("cancel"),
        }
    }
}

/// One operation that failed during a pass.
#[derive(Debug)]
pub struct SyncFailure {
    pub id: String,
    pub op: SyncOp,
    pub error: CareError,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Ids newly scheduled.
    pub scheduled: Vec<String>,
    /// Ids canceled and scheduled again at a new instant.
    pub rescheduled: Vec<String>,
    /// Ids canceled because they left the target set.
    pub canceled: Vec<String>,
    /// Target entries already scheduled at the right instant.
    pub unchanged: usize,
    /// Operations that failed; the pass continued past them.
    pub failures: Vec<SyncFailure>,
    /// Set when notifications are disabled and everything was cleared.
    pub cleared_all: bool,
}

impl SyncReport {
    /// Returns `true` if every operation succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of scheduler mutations that succeeded.
    pub fn operations(&self) -> usize {
        self.scheduled.len() + self.rescheduled.len() + self.canceled.len()
    }
}

/// Event emitted to the injected observer for each sync operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Scheduled {
        id: String,
        at: DateTime<Utc>,
    },
    Rescheduled {
        id: String,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    Canceled {
        id: String,
    },
    Failed {
        id: String,
        op: SyncOp,
        message: String,
    },
    ClearedAll,
}

/// Observer for sync events.
pub type SyncEventCallback = Box<dyn Fn(&SyncEvent) + Send + Sync>;

/// Stateless reconciler between a task list and a [`NotificationScheduler`].
///
/// Callers must not run two passes concurrently over the same scheduler;
/// wrap the reconciler in a [`SyncGuard`] when passes can be triggered from
/// several places.
pub struct NotificationReconciler {
    scheduler: NotificationScheduler,
    options: ReminderOptions,
    on_event: Option<SyncEventCallback>,
}

impl NotificationReconciler {
    /// Create a reconciler with default reminder options.
    pub fn new(scheduler: NotificationScheduler) -> Self {
        Self {
            scheduler,
            options: ReminderOptions::default(),
            on_event: None,
        }
    }

    /// Override reminder hour and channel.
    pub fn with_options(mut self, options: ReminderOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach an event observer.
    pub fn with_events(mut self, on_event: SyncEventCallback) -> Self {
        self.on_event = Some(on_event);
        self
    }

    /// The scheduler this reconciler drives.
    pub fn scheduler(&self) -> &NotificationScheduler {
        &self.scheduler
    }

    /// Payloads that should exist for `tasks` as of `today`, keyed by id.
    ///
    /// Only pending tasks due today or later are included. Tasks whose
    /// payload cannot be built are returned as failures.
    pub fn target_set(
        &self,
        tasks: &[CareTask],
        today: NaiveDate,
        options: ReminderOptions,
    ) -> (BTreeMap<String, NotificationPayload>, Vec<SyncFailure>) {
        let mut target = BTreeMap::new();
        let mut failures = Vec::new();
        for task in tasks.iter().filter(|t| t.is_pending()) {
            if parse_date_only(&task.due_date).is_some_and(|due| due < today) {
                continue;
            }
            match build_task_notification(task, options) {
                Ok(payload) => {
                    target.insert(payload.id.clone(), payload);
                }
                Err(error) => failures.push(SyncFailure {
                    id: task.id.clone(),
                    op: SyncOp::Build,
                    error,
                }),
            }
        }
        (target, failures)
    }

    /// Run one pass using today's UTC date.
    pub async fn reconcile_now(&self, tasks: &[CareTask]) -> Result<SyncReport> {
        self.reconcile(tasks, today_utc()).await
    }

    /// Run one reconciliation pass.
    ///
    /// # Errors
    ///
    /// Returns [`CareError::Scheduler`] only when the currently scheduled set
    /// cannot be read. Individual operation failures are reported in
    /// [`SyncReport::failures`].
    pub async fn reconcile(&self, tasks: &[CareTask], today: NaiveDate) -> Result<SyncReport> {
        self.reconcile_with(tasks, today, self.options).await
    }

    /// Apply `config`: clear everything when notifications are disabled,
    /// otherwise reconcile at the configured reminder hour.
    pub async fn sync_with_config(
        &self,
        tasks: &[CareTask],
        config: &CareConfig,
        today: NaiveDate,
    ) -> Result<SyncReport> {
        if !config.notifications_enabled {
            self.scheduler.cancel_all().await?;
            self.emit(&SyncEvent::ClearedAll);
            info!("notifications disabled, cleared all scheduled reminders");
            return Ok(SyncReport {
                cleared_all: true,
                ..SyncReport::default()
            });
        }
        self.reconcile_with(tasks, today, config.reminder_options())
            .await
    }

    /// Load the task list from `repository` and reconcile against it.
    pub async fn sync_from_repository(
        &self,
        repository: &dyn TaskRepository,
        today: NaiveDate,
    ) -> Result<SyncReport> {
        let tasks = repository.get_all().await?;
        self.reconcile(&tasks, today).await
    }

    async fn reconcile_with(
        &self,
        tasks: &[CareTask],
        today: NaiveDate,
        options: ReminderOptions,
    ) -> Result<SyncReport> {
        let (target, build_failures) = self.target_set(tasks, today, options);
        let actual: HashMap<String, ScheduledRecord> = self
            .scheduler
            .scheduled_notifications()
            .await?
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();

        let mut report = SyncReport::default();
        for failure in build_failures {
            self.record_failure(&mut report, failure);
        }

        // Prune: independent cancellations, issued together.
        let mut stale: Vec<&String> = actual
            .keys()
            .filter(|id| !target.contains_key(*id))
            .collect();
        stale.sort();
        let results = join_all(
            stale
                .iter()
                .map(|id| self.scheduler.cancel_notification(id.as_str())),
        )
        .await;
        for (id, result) in stale.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    self.emit(&SyncEvent::Canceled { id: id.clone() });
                    report.canceled.push(id.clone());
                }
                Err(error) => self.record_failure(
                    &mut report,
                    SyncFailure {
                        id: id.clone(),
                        op: SyncOp::Cancel,
                        error,
                    },
                ),
            }
        }

        // Converge: per id, a cancel completes before its reschedule starts.
        for (id, payload) in &target {
            match actual.get(id) {
                None => match self.schedule(payload).await {
                    Ok(()) => {
                        self.emit(&SyncEvent::Scheduled {
                            id: id.clone(),
                            at: payload.scheduled_at,
                        });
                        report.scheduled.push(id.clone());
                    }
                    Err(failure) => self.record_failure(&mut report, failure),
                },
                Some(existing) if existing.scheduled_at != payload.scheduled_at => {
                    if let Err(error) = self.scheduler.cancel_notification(id).await {
                        self.record_failure(
                            &mut report,
                            SyncFailure {
                                id: id.clone(),
                                op: SyncOp::Cancel,
                                error,
                            },
                        );
                        continue;
                    }
                    match self.schedule(payload).await {
                        Ok(()) => {
                            self.emit(&SyncEvent::Rescheduled {
                                id: id.clone(),
                                from: existing.scheduled_at,
                                to: payload.scheduled_at,
                            });
                            report.rescheduled.push(id.clone());
                        }
                        Err(failure) => self.record_failure(&mut report, failure),
                    }
                }
                Some(_) => report.unchanged += 1,
            }
        }

        info!(
            scheduled = report.scheduled.len(),
            rescheduled = report.rescheduled.len(),
            canceled = report.canceled.len(),
            unchanged = report.unchanged,
            failed = report.failures.len(),
            "notification sync complete"
        );
        Ok(report)
    }

    async fn schedule(
        &self,
        payload: &NotificationPayload,
    ) -> std::result::Result<(), SyncFailure> {
        self.scheduler
            .schedule_notification(payload, ScheduleOptions::default())
            .await
            .map(|_| ())
            .map_err(|error| SyncFailure {
                id: payload.id.clone(),
                op: SyncOp::Schedule,
                error,
            })
    }

    fn record_failure(&self, report: &mut SyncReport, failure: SyncFailure) {
        warn!(
            id = %failure.id,
            op = %failure.op,
            "notification sync operation failed: {}",
            failure.error
        );
        self.emit(&SyncEvent::Failed {
            id: failure.id.clone(),
            op: failure.op,
            message: failure.error.to_string(),
        });
        report.failures.push(failure);
    }

    fn emit(&self, event: &SyncEvent) {
        if let Some(on_event) = &self.on_event {
            on_event(event);
        }
    }
}

/// Serializes reconciliation passes so at most one is in flight.
///
/// Two overlapping passes over the same id-space can both decide to
/// schedule the same new id; the guard queues them instead.
pub struct SyncGuard {
    reconciler: Mutex<NotificationReconciler>,
}

impl SyncGuard {
    /// Guard `reconciler`.
    pub fn new(reconciler: NotificationReconciler) -> Self {
        Self {
            reconciler: Mutex::new(reconciler),
        }
    }

    /// Run one pass once any in-flight pass has finished.
    pub async fn reconcile(&self, tasks: &[CareTask], today: NaiveDate) -> Result<SyncReport> {
        let reconciler = self.reconciler.lock().await;
        reconciler.reconcile(tasks, today).await
    }

    /// Serialized [`NotificationReconciler::reconcile_now`].
    pub async fn reconcile_now(&self, tasks: &[CareTask]) -> Result<SyncReport> {
        let reconciler = self.reconciler.lock().await;
        reconciler.reconcile_now(tasks).await
    }

    /// Serialized [`NotificationReconciler::sync_from_repository`].
    pub async fn sync_from_repository(
        &self,
        repository: &dyn TaskRepository,
        today: NaiveDate,
    ) -> Result<SyncReport> {
        let reconciler = self.reconciler.lock().await;
        reconciler.sync_from_repository(repository, today).await
    }

    /// Serialized [`NotificationReconciler::sync_with_config`].
    pub async fn sync_with_config(
        &self,
        tasks: &[CareTask],
        config: &CareConfig,
        today: NaiveDate,
    ) -> Result<SyncReport> {
        let reconciler = self.reconciler.lock().await;
        reconciler.sync_with_config(tasks, config, today).await
    }
}
