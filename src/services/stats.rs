use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::task::{Task, TaskStatus};

#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    /// Percentage, 0..=100
    pub completion_rate: f64,
    pub avg_progress: f64,
    pub on_time: usize,
    pub delayed: usize,
}

/// A completed task counts as on time when its due date is not yet behind `now`.
/// Completed tasks without a readable due date are in neither bucket.
pub fn employee_stats(tasks: &[Task], now: DateTime<FixedOffset>) -> EmployeeStats {
    let mut stats = EmployeeStats {
        total_tasks: tasks.len(),
        ..Default::default()
    };

    for task in tasks {
        match task.status {
            TaskStatus::Completed => {
                stats.completed_tasks += 1;
                match task.due() {
                    Some(due) if due >= now => stats.on_time += 1,
                    Some(_) => stats.delayed += 1,
                    None => {}
                }
            }
            TaskStatus::Pending => stats.pending_tasks += 1,
            TaskStatus::InProgress => {}
        }
    }

    if stats.total_tasks > 0 {
        let total = stats.total_tasks as f64;
        stats.completion_rate = stats.completed_tasks as f64 / total * 100.0;
        stats.avg_progress = tasks.iter().map(|t| t.progress as f64).sum::<f64>() / total;
    }

    stats
}

pub fn performance_prompt(employee_name: &str, stats: &EmployeeStats) -> String {
    format!(
        "Analyze this employee's performance and provide insights:\n\n\
         Employee: {}\n\
         Total Tasks: {}\n\
         Completed Tasks: {}\n\
         Completion Rate: {:.1}%\n\
         On-Time Completions: {}\n\
         Delayed Completions: {}\n\n\
         Provide a brief, professional performance analysis with:\n\
         1. Productivity assessment\n\
         2. Timeliness evaluation (pressure handling score)\n\
         3. Consistency remarks\n\
         4. Specific recommendation for improvement\n\n\
         Keep it concise and actionable.",
        employee_name,
        stats.total_tasks,
        stats.completed_tasks,
        stats.completion_rate,
        stats.on_time,
        stats.delayed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn task(status: TaskStatus, progress: i32, due: Option<&str>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: None,
            assigned_to: Uuid::new_v4(),
            assigned_by: Uuid::new_v4(),
            due_date: due.map(str::to_string),
            progress,
            status,
            warning_sent: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_task_list_is_all_zero() {
        let now = DateTime::parse_from_rfc3339("2026-01-10T09:00:00+05:30").unwrap();
        assert_eq!(employee_stats(&[], now), EmployeeStats::default());
    }

    #[test]
    fn counts_rates_and_timeliness() {
        let now = DateTime::parse_from_rfc3339("2026-01-10T09:00:00+05:30").unwrap();
        let tasks = vec![
            task(TaskStatus::Completed, 100, Some("2026-01-11T09:00:00+05:30")),
            task(TaskStatus::Completed, 100, Some("2026-01-09T09:00:00+05:30")),
            task(TaskStatus::Completed, 100, None),
            task(TaskStatus::Pending, 20, Some("2026-01-12T09:00:00+05:30")),
            task(TaskStatus::InProgress, 30, None),
        ];

        let stats = employee_stats(&tasks, now);

        assert_eq!(stats.total_tasks, 5);
        assert_eq!(stats.completed_tasks, 3);
        assert_eq!(stats.pending_tasks, 1);
        assert_eq!(stats.on_time, 1);
        assert_eq!(stats.delayed, 1);
        assert!((stats.completion_rate - 60.0).abs() < 1e-9);
        assert!((stats.avg_progress - 70.0).abs() < 1e-9);
    }

    #[test]
    fn prompt_includes_numbers() {
        let stats = EmployeeStats {
            total_tasks: 4,
            completed_tasks: 3,
            completion_rate: 75.0,
            ..Default::default()
        };
        let prompt = performance_prompt("Kiran", &stats);
        assert!(prompt.contains("Employee: Kiran"));
        assert!(prompt.contains("Completion Rate: 75.0%"));
    }
}
