use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Barrier;
use uuid::Uuid;

use crate::models::notification::{MessageType, Notification};
use crate::models::task::{Task, TaskStatus};
use crate::repositories::{NotificationStore, TaskStore};
use crate::utils::errors::ServiceError;

/// Both stores backed by vectors, with optional injected failures.
#[derive(Default)]
pub struct MemoryStore {
    tasks: Mutex<Vec<Task>>,
    messages: Mutex<Vec<Notification>>,
    inserts_before_failure: Mutex<Option<usize>>,
    fail_flag_writes: Mutex<bool>,
    flag_writes: AtomicUsize,
    listing_barrier: Mutex<Option<Arc<Barrier>>>,
}

impl MemoryStore {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let store = Self::default();
        *store.tasks.lock().unwrap() = tasks;
        store
    }

    /// Allow `n` more notification inserts, then fail every insert.
    pub fn fail_inserts_after(&self, n: usize) {
        *self.inserts_before_failure.lock().unwrap() = Some(n);
    }

    /// Hold every `list_pending` call until `callers` of them have taken
    /// their snapshot, so racing sweeps all start from the same stale view.
    pub fn sync_listings(&self, callers: usize) {
        *self.listing_barrier.lock().unwrap() = Some(Arc::new(Barrier::new(callers)));
    }

    pub fn allow_all_inserts(&self) {
        *self.inserts_before_failure.lock().unwrap() = None;
    }

    pub fn fail_flag_writes(&self, fail: bool) {
        *self.fail_flag_writes.lock().unwrap() = fail;
    }

    pub fn task(&self, id: Uuid) -> Task {
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .expect("task exists")
    }

    pub fn messages(&self) -> Vec<Notification> {
        self.messages.lock().unwrap().clone()
    }

    pub fn flag_writes(&self) -> usize {
        self.flag_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_pending(&self) -> Result<Vec<Task>, ServiceError> {
        let snapshot: Vec<Task> = self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .cloned()
            .collect();

        let barrier = self.listing_barrier.lock().unwrap().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
        Ok(snapshot)
    }

    async fn mark_warning_sent(&self, task_id: Uuid) -> Result<bool, ServiceError> {
        if *self.fail_flag_writes.lock().unwrap() {
            return Err(ServiceError::DatabaseError("injected flag failure".to_string()));
        }
        self.flag_writes.fetch_add(1, Ordering::SeqCst);

        let mut tasks = self.tasks.lock().unwrap();
        match tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) if !task.warning_sent => {
                task.warning_sent = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert(
        &self,
        recipient_id: Uuid,
        content: &str,
        message_type: MessageType,
    ) -> Result<Notification, ServiceError> {
        {
            let mut budget = self.inserts_before_failure.lock().unwrap();
            match *budget {
                Some(0) => {
                    return Err(ServiceError::DatabaseError("injected insert failure".to_string()))
                }
                Some(ref mut left) => *left -= 1,
                None => {}
            }
        }

        let mut messages = self.messages.lock().unwrap();
        // Strictly increasing timestamps keep the newest-first ordering stable.
        let created_at = Utc::now() + Duration::microseconds(messages.len() as i64);
        let notification = Notification {
            id: Uuid::new_v4(),
            recipient_id,
            content: content.to_string(),
            message_type,
            created_at,
        };
        messages.push(notification.clone());
        Ok(notification)
    }

    async fn list_for_recipient(&self, recipient_id: Uuid) -> Result<Vec<Notification>, ServiceError> {
        let mut found: Vec<Notification> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.recipient_id == recipient_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}
