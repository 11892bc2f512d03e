//! Deadline escalation sweep.
//!
//! One pass over every pending task. A task escalates the first time its due
//! date falls strictly inside `(now, now + 24h)` while progress is below 100:
//! its `warning_sent` flag is claimed with a conditional update and both the
//! assignee and the assigner receive a warning. The flag never reverts, so a
//! task escalates at most once in its lifetime.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::notification::MessageType;
use crate::models::task::Task;
use crate::repositories::{NotificationStore, TaskStore};
use crate::services::notifier::{self, notify};
use crate::utils::errors::ServiceError;
use crate::utils::time::{current_instant, in_warning_window, parse_due, Clock};
use chrono::{DateTime, FixedOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    AlreadyWarned,
    NoDeadline,
    UnparseableDeadline,
    OutsideWindow,
    ProgressComplete,
    Escalate,
}

/// Per-invocation counters.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SweepReport {
    pub scanned: usize,
    pub escalated: usize,
    pub already_warned: usize,
    pub no_deadline: usize,
    pub unparseable: usize,
    pub outside_window: usize,
    pub progress_complete: usize,
    /// Another sweep flipped the flag between our read and our update.
    pub lost_race: usize,
}

impl SweepReport {
    fn record(&mut self, decision: Decision) {
        match decision {
            Decision::AlreadyWarned => self.already_warned += 1,
            Decision::NoDeadline => self.no_deadline += 1,
            Decision::UnparseableDeadline => self.unparseable += 1,
            Decision::OutsideWindow => self.outside_window += 1,
            Decision::ProgressComplete => self.progress_complete += 1,
            Decision::Escalate => self.escalated += 1,
        }
    }
}

pub fn evaluate(task: &Task, now: DateTime<FixedOffset>) -> Decision {
    if task.warning_sent {
        return Decision::AlreadyWarned;
    }
    let Some(raw) = task.due_date.as_deref() else {
        return Decision::NoDeadline;
    };
    let Some(due) = parse_due(Some(raw)) else {
        return Decision::UnparseableDeadline;
    };
    if !in_warning_window(due, now) {
        return Decision::OutsideWindow;
    }
    if task.progress >= 100 {
        return Decision::ProgressComplete;
    }
    Decision::Escalate
}

/// Runs one sweep. The first store failure aborts the rest of the scan;
/// tasks not yet flagged are picked up again by the next invocation.
///
/// The flag is claimed before the two warnings are written. If a notification
/// insert fails after a successful claim, that task is not retried by later
/// sweeps and its warning pair is lost.
pub async fn run_deadline_sweep<S>(store: &S, clock: &dyn Clock) -> Result<SweepReport, ServiceError>
where
    S: TaskStore + NotificationStore + ?Sized,
{
    let now = current_instant(clock);
    let tasks = store.list_pending().await?;
    log::info!("⏰ Deadline sweep at {}: {} pending tasks", now.to_rfc3339(), tasks.len());

    let mut report = SweepReport::default();

    for task in &tasks {
        report.scanned += 1;

        let decision = evaluate(task, now);
        if decision == Decision::UnparseableDeadline {
            log::warn!(
                "Task {} has an unparseable due date {:?}, skipping",
                task.id,
                task.due_date
            );
        }
        if decision != Decision::Escalate {
            report.record(decision);
            continue;
        }

        if !store.mark_warning_sent(task.id).await? {
            log::info!("Task {} was escalated by a concurrent sweep", task.id);
            report.lost_race += 1;
            continue;
        }

        let content = notifier::deadline_warning(&task.title);
        notify(store, task.assigned_to, &content, MessageType::Warning).await?;
        notify(store, task.assigned_by, &content, MessageType::Warning).await?;

        log::info!("🚨 Escalated task {} ('{}')", task.id, task.title);
        report.record(Decision::Escalate);
    }

    log::info!(
        "✅ Deadline sweep done: {} scanned, {} escalated, {} already warned",
        report.scanned,
        report.escalated,
        report.already_warned
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;
    use crate::repositories::memory::MemoryStore;
    use crate::utils::time::FixedClock;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    // 2026-01-10T09:00:00+05:30
    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 10, 3, 30, 0).unwrap())
    }

    fn task(title: &str, due_date: Option<&str>, progress: i32) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            assigned_to: Uuid::new_v4(),
            assigned_by: Uuid::new_v4(),
            due_date: due_date.map(str::to_string),
            progress,
            status: TaskStatus::Pending,
            warning_sent: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn imminent_task_escalates_to_both_parties() {
        let a = task("Task A", Some("2026-01-10T20:00:00+05:30"), 40);
        let store = MemoryStore::with_tasks(vec![a.clone()]);

        let report = run_deadline_sweep(&store, &clock()).await.unwrap();

        assert_eq!(report.escalated, 1);
        assert!(store.task(a.id).warning_sent);

        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].recipient_id, a.assigned_to);
        assert_eq!(messages[1].recipient_id, a.assigned_by);
        for m in &messages {
            assert_eq!(m.message_type, MessageType::Warning);
            assert!(m.content.contains("Task A"));
        }
        assert_eq!(messages[0].content, messages[1].content);
    }

    #[tokio::test]
    async fn tasks_outside_the_window_are_left_alone() {
        let b = task("Task B", Some("2026-01-12T09:00:00+05:30"), 40);
        let c = task("Task C", Some("2026-01-09T09:00:00+05:30"), 50);
        let d = task("Task D", Some("2026-01-10T15:00:00+05:30"), 100);
        let e = task("Task E", None, 0);
        let store = MemoryStore::with_tasks(vec![b.clone(), c.clone(), d.clone(), e.clone()]);

        let report = run_deadline_sweep(&store, &clock()).await.unwrap();

        assert_eq!(report.scanned, 4);
        assert_eq!(report.escalated, 0);
        assert_eq!(report.outside_window, 2);
        assert_eq!(report.progress_complete, 1);
        assert_eq!(report.no_deadline, 1);
        assert!(store.messages().is_empty());
        for t in [b, c, d, e] {
            assert!(!store.task(t.id).warning_sent);
        }
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let a = task("Task A", Some("2026-01-10T20:00:00+05:30"), 40);
        let store = MemoryStore::with_tasks(vec![a.clone()]);

        run_deadline_sweep(&store, &clock()).await.unwrap();
        let second = run_deadline_sweep(&store, &clock()).await.unwrap();

        assert_eq!(second.escalated, 0);
        assert_eq!(second.already_warned, 1);
        assert_eq!(store.messages().len(), 2);
        assert!(store.task(a.id).warning_sent);
    }

    #[tokio::test]
    async fn already_warned_task_is_never_touched() {
        let mut warned = task("Warned", Some("2026-01-10T12:00:00+05:30"), 10);
        warned.warning_sent = true;
        let store = MemoryStore::with_tasks(vec![warned.clone()]);

        for _ in 0..3 {
            run_deadline_sweep(&store, &clock()).await.unwrap();
        }

        assert!(store.messages().is_empty());
        assert_eq!(store.flag_writes(), 0);
        assert!(store.task(warned.id).warning_sent);
    }

    #[tokio::test]
    async fn window_boundaries_do_not_escalate() {
        let at_now = task("Now", Some("2026-01-10T09:00:00+05:30"), 0);
        let at_end = task("End", Some("2026-01-11T09:00:00+05:30"), 0);
        let inside = task("Inside", Some("2026-01-11T08:59:59+05:30"), 0);
        let store = MemoryStore::with_tasks(vec![at_now.clone(), at_end.clone(), inside.clone()]);

        let report = run_deadline_sweep(&store, &clock()).await.unwrap();

        assert_eq!(report.escalated, 1);
        assert!(!store.task(at_now.id).warning_sent);
        assert!(!store.task(at_end.id).warning_sent);
        assert!(store.task(inside.id).warning_sent);
    }

    #[tokio::test]
    async fn offsets_are_compared_as_instants() {
        // 14:30Z is 20:00 at +05:30, 11h ahead.
        let utc_due = task("UTC", Some("2026-01-10T14:30:00Z"), 0);
        let store = MemoryStore::with_tasks(vec![utc_due.clone()]);

        let report = run_deadline_sweep(&store, &clock()).await.unwrap();

        assert_eq!(report.escalated, 1);
    }

    #[tokio::test]
    async fn malformed_due_date_skips_only_that_task() {
        let broken = task("Broken", Some("tomorrow-ish"), 0);
        let a = task("Task A", Some("2026-01-10T20:00:00+05:30"), 40);
        let store = MemoryStore::with_tasks(vec![broken.clone(), a.clone()]);

        let report = run_deadline_sweep(&store, &clock()).await.unwrap();

        assert_eq!(report.unparseable, 1);
        assert_eq!(report.escalated, 1);
        assert!(!store.task(broken.id).warning_sent);
        assert!(store.task(a.id).warning_sent);
    }

    #[tokio::test]
    async fn non_pending_tasks_are_outside_the_sweep() {
        let mut started = task("Started", Some("2026-01-10T20:00:00+05:30"), 30);
        started.status = TaskStatus::InProgress;
        let store = MemoryStore::with_tasks(vec![started.clone()]);

        let report = run_deadline_sweep(&store, &clock()).await.unwrap();

        assert_eq!(report.scanned, 0);
        assert!(!store.task(started.id).warning_sent);
    }

    #[tokio::test]
    async fn insert_failure_aborts_remaining_scan() {
        let first = task("First", Some("2026-01-10T20:00:00+05:30"), 0);
        let second = task("Second", Some("2026-01-10T21:00:00+05:30"), 0);
        let store = MemoryStore::with_tasks(vec![first.clone(), second.clone()]);
        store.fail_inserts_after(1);

        let result = run_deadline_sweep(&store, &clock()).await;

        assert!(matches!(result, Err(ServiceError::DatabaseError(_))));
        assert_eq!(store.messages().len(), 1);
        assert!(store.task(first.id).warning_sent);
        assert!(!store.task(second.id).warning_sent);

        // The claimed task keeps its flag, so only the second one is retried.
        store.allow_all_inserts();
        let report = run_deadline_sweep(&store, &clock()).await.unwrap();
        assert_eq!(report.already_warned, 1);
        assert_eq!(report.escalated, 1);

        let messages = store.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages.iter().filter(|m| m.content.contains("First")).count(), 1);
        assert_eq!(messages.iter().filter(|m| m.content.contains("Second")).count(), 2);
    }

    #[tokio::test]
    async fn flag_failure_sends_nothing() {
        let a = task("Task A", Some("2026-01-10T20:00:00+05:30"), 40);
        let store = MemoryStore::with_tasks(vec![a.clone()]);
        store.fail_flag_writes(true);

        assert!(run_deadline_sweep(&store, &clock()).await.is_err());
        assert!(store.messages().is_empty());
        assert!(!store.task(a.id).warning_sent);

        // The next invocation is a full retry.
        store.fail_flag_writes(false);
        let report = run_deadline_sweep(&store, &clock()).await.unwrap();
        assert_eq!(report.escalated, 1);
        assert_eq!(store.messages().len(), 2);
    }

    #[tokio::test]
    async fn racing_sweeps_claim_the_flag_once() {
        let a = task("Task A", Some("2026-01-10T20:00:00+05:30"), 40);
        let store = MemoryStore::with_tasks(vec![a.clone()]);
        // Both sweeps list the task as unwarned before either claims it.
        store.sync_listings(2);
        let clock = clock();

        let (left, right) = tokio::join!(
            run_deadline_sweep(&store, &clock),
            run_deadline_sweep(&store, &clock)
        );
        let left = left.unwrap();
        let right = right.unwrap();

        assert_eq!(left.escalated + right.escalated, 1);
        assert_eq!(left.lost_race + right.lost_race, 1);
        assert_eq!(left.already_warned + right.already_warned, 0);
        assert_eq!(store.flag_writes(), 2);
        assert_eq!(store.messages().len(), 2);
        assert!(store.task(a.id).warning_sent);
    }

    #[tokio::test]
    async fn date_only_due_date_is_midnight_local() {
        // Midnight of the 11th at +05:30 is 15h after the fixed clock.
        let a = task("Task A", Some("2026-01-11"), 0);
        let later = task("Later", Some("2026-01-12"), 0);
        let store = MemoryStore::with_tasks(vec![a.clone(), later.clone()]);

        let report = run_deadline_sweep(&store, &clock()).await.unwrap();

        assert_eq!(report.escalated, 1);
        assert_eq!(report.outside_window, 1);
        assert_eq!(report.unparseable, 0);
        assert!(store.task(a.id).warning_sent);
    }

    #[test]
    fn evaluate_orders_guards() {
        let now = chrono::DateTime::parse_from_rfc3339("2026-01-10T09:00:00+05:30").unwrap();

        let mut t = task("T", Some("2026-01-10T10:00:00+05:30"), 100);
        assert_eq!(evaluate(&t, now), Decision::ProgressComplete);

        t.progress = 99;
        assert_eq!(evaluate(&t, now), Decision::Escalate);

        t.warning_sent = true;
        assert_eq!(evaluate(&t, now), Decision::AlreadyWarned);
    }
}
