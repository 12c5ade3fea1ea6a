//! Notification scheduler facade and transport contract.
//!
//! [`NotificationClient`] is implemented by the platform push/local
//! notification transport. [`NotificationScheduler`] wraps a client with
//! permission gating and error classification; it is what the reconciler
//! talks to. [`MemoryNotificationClient`] is the in-process transport used by
//! tests and the CLI.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CareError, Result};
use crate::notifications::types::{
    NotificationPayload, PermissionStatus, ScheduleOptions, ScheduledRecord,
};

/// Platform notification transport.
///
/// Timeouts are the implementor's responsibility; callers never retry.
#[async_trait]
pub trait NotificationClient: Send + Sync {
    /// Current authorization state.
    async fn permission_status(&self) -> Result<PermissionStatus>;

    /// Prompt for authorization and return the resulting state.
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// Schedule `payload`, replacing nothing. Returns what the transport holds.
    async fn schedule(&self, payload: &NotificationPayload) -> Result<ScheduledRecord>;

    /// Cancel the notification with `id`. Unknown ids are not an error.
    async fn cancel(&self, id: &str) -> Result<()>;

    /// Cancel every pending notification.
    async fn cancel_all(&self) -> Result<()>;

    /// Everything currently scheduled.
    async fn scheduled(&self) -> Result<Vec<ScheduledRecord>>;
}

/// Permission-aware wrapper around a [`NotificationClient`].
///
/// Transport failures surface as [`CareError::Scheduler`] with context;
/// [`CareError::Permission`] passes through unchanged.
#[derive(Clone)]
pub struct NotificationScheduler {
    client: Arc<dyn NotificationClient>,
}

impl std::fmt::Debug for NotificationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationScheduler").finish_non_exhaustive()
    }
}

impl NotificationScheduler {
    /// Wrap `client`.
    pub fn new(client: Arc<dyn NotificationClient>) -> Self {
        Self { client }
    }

    /// Current authorization state.
    pub async fn permission_status(&self) -> Result<PermissionStatus> {
        self.client
            .permission_status()
            .await
            .map_err(|e| classify("failed to read notification permission", e))
    }

    /// Prompt for authorization.
    pub async fn request_permission(&self) -> Result<PermissionStatus> {
        self.client
            .request_permission()
            .await
            .map_err(|e| classify("failed to request notification permission", e))
    }

    /// Schedule `payload`.
    ///
    /// With `options.require_permission` set and permission not yet granted,
    /// permission is requested once.
    ///
    /// # Errors
    ///
    /// [`CareError::Permission`] if authorization is still missing after the
    /// request; [`CareError::Scheduler`] for transport failures.
    pub async fn schedule_notification(
        &self,
        payload: &NotificationPayload,
        options: ScheduleOptions,
    ) -> Result<ScheduledRecord> {
        if options.require_permission {
            let status = self.permission_status().await?;
            if !status.is_granted() {
                let requested = self.request_permission().await?;
                if !requested.is_granted() {
                    return Err(CareError::Permission(requested));
                }
            }
        }
        let record = self
            .client
            .schedule(payload)
            .await
            .map_err(|e| classify("failed to schedule notification", e))?;
        debug!(id = %record.id, at = %record.scheduled_at, "notification scheduled");
        Ok(record)
    }

    /// Cancel the notification with `id`.
    pub async fn cancel_notification(&self, id: &str) -> Result<()> {
        self.client
            .cancel(id)
            .await
            .map_err(|e| classify("failed to cancel notification", e))
    }

    /// Cancel every scheduled notification.
    pub async fn cancel_all(&self) -> Result<()> {
        self.client
            .cancel_all()
            .await
            .map_err(|e| classify("failed to clear notifications", e))
    }

    /// Everything the transport currently holds.
    pub async fn scheduled_notifications(&self) -> Result<Vec<ScheduledRecord>> {
        self.client
            .scheduled()
            .await
            .map_err(|e| classify("failed to load scheduled notifications", e))
    }
}

fn classify(context: &str, err: CareError) -> CareError {
    match err {
        CareError::Permission(_) => err,
        CareError::Scheduler(msg) => CareError::Scheduler(format!("{context}: {msg}")),
        other => CareError::Scheduler(format!("{context}: {other}")),
    }
}

// ─── MemoryNotificationClient ────────────────────────────────────────────────

/// A transport call observed by [`MemoryNotificationClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    Schedule(String),
    Cancel(String),
    CancelAll,
    List,
}

#[derive(Default)]
struct MemoryState {
    permission: PermissionStatus,
    deny_on_request: bool,
    scheduled: BTreeMap<String, ScheduledRecord>,
    fail_schedule: HashSet<String>,
    fail_cancel: HashSet<String>,
    fail_listing: bool,
    calls: Vec<ClientCall>,
}

/// An in-memory notification transport.
///
/// Permission starts `undetermined` and is granted on request unless
/// [`deny_permission`](Self::deny_permission) was called. Failure hooks make
/// individual ids fail so partial-failure paths can be exercised.
#[derive(Default)]
pub struct MemoryNotificationClient {
    state: Mutex<MemoryState>,
}

impl MemoryNotificationClient {
    /// Create an empty client with undetermined permission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client that already holds permission.
    pub fn granted() -> Self {
        let client = Self::default();
        client.with_state(|s| s.permission = PermissionStatus::Granted);
        client
    }

    /// Make permission requests resolve to `denied`.
    pub fn deny_permission(&self) {
        self.with_state(|s| {
            s.permission = PermissionStatus::Denied;
            s.deny_on_request = true;
        });
    }

    /// Make `schedule` fail for `id`.
    pub fn fail_schedule_for(&self, id: impl Into<String>) {
        let id = id.into();
        self.with_state(|s| {
            s.fail_schedule.insert(id);
        });
    }

    /// Make `cancel` fail for `id`.
    pub fn fail_cancel_for(&self, id: impl Into<String>) {
        let id = id.into();
        self.with_state(|s| {
            s.fail_cancel.insert(id);
        });
    }

    /// Make listing scheduled notifications fail.
    pub fn fail_listing(&self, fail: bool) {
        self.with_state(|s| s.fail_listing = fail);
    }

    /// Clear all failure hooks.
    pub fn heal(&self) {
        self.with_state(|s| {
            s.fail_schedule.clear();
            s.fail_cancel.clear();
            s.fail_listing = false;
        });
    }

    /// Seed a record directly, bypassing the call log.
    pub fn insert(&self, record: ScheduledRecord) {
        self.with_state(|s| {
            s.scheduled.insert(record.id.clone(), record);
        });
    }

    /// Snapshot of held records, ordered by id.
    pub fn records(&self) -> Vec<ScheduledRecord> {
        self.with_state(|s| s.scheduled.values().cloned().collect())
    }

    /// Mutating calls (schedule/cancel/cancel-all) and listings so far.
    pub fn calls(&self) -> Vec<ClientCall> {
        self.with_state(|s| s.calls.clone())
    }

    /// Forget the call log.
    pub fn clear_calls(&self) {
        self.with_state(|s| s.calls.clear());
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> T {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

#[async_trait]
impl NotificationClient for MemoryNotificationClient {
    async fn permission_status(&self) -> Result<PermissionStatus> {
        Ok(self.with_state(|s| s.permission))
    }

    async fn request_permission(&self) -> Result<PermissionStatus> {
        Ok(self.with_state(|s| {
            s.permission = if s.deny_on_request {
                PermissionStatus::Denied
            } else {
                PermissionStatus::Granted
            };
            s.permission
        }))
    }

    async fn schedule(&self, payload: &NotificationPayload) -> Result<ScheduledRecord> {
        self.with_state(|s| {
            s.calls.push(ClientCall::Schedule(payload.id.clone()));
            if s.fail_schedule.contains(&payload.id) {
                return Err(CareError::Scheduler(format!("transport rejected {}", payload.id)));
            }
            let record = ScheduledRecord::from(payload);
            s.scheduled.insert(record.id.clone(), record.clone());
            Ok(record)
        })
    }

    async fn cancel(&self, id: &str) -> Result<()> {
        self.with_state(|s| {
            s.calls.push(ClientCall::Cancel(id.to_owned()));
            if s.fail_cancel.contains(id) {
                return Err(CareError::Scheduler(format!("transport could not cancel {id}")));
            }
            s.scheduled.remove(id);
            Ok(())
        })
    }

    async fn cancel_all(&self) -> Result<()> {
        self.with_state(|s| {
            s.calls.push(ClientCall::CancelAll);
            s.scheduled.clear();
        });
        Ok(())
    }

    async fn scheduled(&self) -> Result<Vec<ScheduledRecord>> {
        self.with_state(|s| {
            s.calls.push(ClientCall::List);
            if s.fail_listing {
                return Err(CareError::Scheduler("transport unavailable".to_owned()));
            }
            Ok(s.scheduled.values().cloned().collect())
        })
    }
}
