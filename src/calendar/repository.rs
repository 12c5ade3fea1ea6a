//! Task repository collaborator.
//!
//! Persistence of care tasks lives outside this crate. [`TaskRepository`] is
//! the contract the rest of the app implements; [`MemoryTaskRepository`] is
//! the in-process implementation used by tests and the CLI.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::calendar::types::CareTask;
use crate::error::{CareError, Result};

/// CRUD access to the persisted care-task list, the source of truth for
/// notification reconciliation.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All stored tasks in stored order.
    async fn get_all(&self) -> Result<Vec<CareTask>>;

    /// Insert a task at the front of the list.
    async fn add(&self, task: CareTask) -> Result<()>;

    /// Replace the task with the same id. Unknown ids are ignored.
    async fn update(&self, task: CareTask) -> Result<()>;

    /// Remove the task with `id`, if present.
    async fn remove(&self, id: &str) -> Result<()>;

    /// Look up a single task.
    async fn get_by_id(&self, id: &str) -> Result<Option<CareTask>>;
}

/// An in-memory task repository.
#[derive(Default)]
pub struct MemoryTaskRepository {
    tasks: Mutex<Vec<CareTask>>,
}

impl MemoryTaskRepository {
    /// Create a repository seeded with `tasks`.
    pub fn new(tasks: Vec<CareTask>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<CareTask>>> {
        self.tasks
            .lock()
            .map_err(|_| CareError::Storage("task repository lock poisoned".to_owned()))
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn get_all(&self) -> Result<Vec<CareTask>> {
        Ok(self.lock()?.clone())
    }

    async fn add(&self, task: CareTask) -> Result<()> {
        self.lock()?.insert(0, task);
        Ok(())
    }

    async fn update(&self, task: CareTask) -> Result<()> {
        let mut tasks = self.lock()?;
        if let Some(existing) = tasks.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.lock()?.retain(|t| t.id != id);
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<CareTask>> {
        Ok(self.lock()?.iter().find(|t| t.id == id).cloned())
    }
}
