//! State machine of a task.
//!
//! ```text
//!   create ──> OPEN | PENDING | COMPLETED
//!   OPEN / PENDING ──complete──> COMPLETED
//!   OPEN / COMPLETED ──reopen_as_pending──> PENDING
//! ```
//!
//! A plain update never moves a task between states; it may only restate the
//! current one.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{TaskError, TaskResult};
use crate::models::{CreateTask, Task, TaskStatus, UpdateTask};

pub fn create(input: CreateTask, owner_id: Uuid, today: NaiveDate) -> TaskResult<Task> {
    Task::new(input, owner_id, today)
}

/// Merge `input` into `task`.
///
/// Checks run in a fixed order: due date against `today`, then the status
/// guard, then the remaining field rules. On error `task` is unchanged.
pub fn update(task: &mut Task, input: UpdateTask, today: NaiveDate) -> TaskResult<()> {
    if let Some(due_date) = input.due_date {
        if due_date < today {
            return Err(TaskError::InvalidDueDate { due_date, today });
        }
    }

    if let Some(requested) = input.status {
        if requested != task.status() {
            return Err(TaskError::IllegalStatusChange {
                current: task.status(),
                requested,
            });
        }
    }

    task.apply_changes(input.changes(), today)
}

pub fn complete(task: &mut Task) -> TaskResult<()> {
    if task.status() == TaskStatus::Completed {
        return Err(TaskError::AlreadyInState(TaskStatus::Completed));
    }
    task.set_status(TaskStatus::Completed);
    Ok(())
}

/// Move an OPEN or COMPLETED task to PENDING.
pub fn reopen_as_pending(task: &mut Task) -> TaskResult<()> {
    if task.status() == TaskStatus::Pending {
        return Err(TaskError::AlreadyInState(TaskStatus::Pending));
    }
    task.set_status(TaskStatus::Pending);
    Ok(())
}

pub fn ensure_owner(task: &Task, caller: Uuid) -> TaskResult<()> {
    if task.owner_id() != caller {
        return Err(TaskError::Forbidden(task.id()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskPriority;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn task_with_status(status: TaskStatus) -> Task {
        let input = CreateTask {
            name: Some("Tarefa".into()),
            status: Some(status),
            due_date: Some(today()),
            ..Default::default()
        };
        create(input, Uuid::now_v7(), today()).unwrap()
    }

    #[test]
    fn test_complete_from_open_and_pending() {
        for status in [TaskStatus::Open, TaskStatus::Pending] {
            let mut task = task_with_status(status);
            complete(&mut task).unwrap();
            assert_eq!(task.status(), TaskStatus::Completed);
        }
    }

    #[test]
    fn test_complete_twice_fails() {
        let mut task = task_with_status(TaskStatus::Completed);
        let err = complete(&mut task).unwrap_err();
        assert!(matches!(err, TaskError::AlreadyInState(TaskStatus::Completed)));
        assert_eq!(task.status(), TaskStatus::Completed);
    }

    #[test]
    fn test_reopen_as_pending_from_open_and_completed() {
        for status in [TaskStatus::Open, TaskStatus::Completed] {
            let mut task = task_with_status(status);
            reopen_as_pending(&mut task).unwrap();
            assert_eq!(task.status(), TaskStatus::Pending);
        }
    }

    #[test]
    fn test_reopen_pending_fails() {
        let mut task = task_with_status(TaskStatus::Pending);
        assert!(matches!(
            reopen_as_pending(&mut task),
            Err(TaskError::AlreadyInState(TaskStatus::Pending))
        ));
    }

    #[test]
    fn test_update_rejects_status_change() {
        let mut task = task_with_status(TaskStatus::Open);
        let input = UpdateTask {
            name: Some("Renamed".into()),
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };

        let err = update(&mut task, input, today()).unwrap_err();
        assert!(matches!(
            err,
            TaskError::IllegalStatusChange {
                current: TaskStatus::Open,
                requested: TaskStatus::Completed
            }
        ));
        assert_eq!(task.name(), "Tarefa");
    }

    #[test]
    fn test_update_accepts_same_status() {
        let mut task = task_with_status(TaskStatus::Pending);
        let input = UpdateTask {
            priority: Some(TaskPriority::High),
            status: Some(TaskStatus::Pending),
            ..Default::default()
        };

        update(&mut task, input, today()).unwrap();
        assert_eq!(task.priority(), TaskPriority::High);
        assert_eq!(task.status(), TaskStatus::Pending);
    }

    #[test]
    fn test_update_checks_due_date_before_status() {
        let mut task = task_with_status(TaskStatus::Open);
        let input = UpdateTask {
            status: Some(TaskStatus::Completed),
            due_date: today().pred_opt(),
            ..Default::default()
        };

        assert!(matches!(
            update(&mut task, input, today()),
            Err(TaskError::InvalidDueDate { .. })
        ));
    }

    #[test]
    fn test_update_rejects_blank_name() {
        let mut task = task_with_status(TaskStatus::Open);
        let input = UpdateTask {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(update(&mut task, input, today()), Err(TaskError::Validation(_))));
    }

    #[test]
    fn test_ensure_owner() {
        let task = task_with_status(TaskStatus::Open);
        assert!(ensure_owner(&task, task.owner_id()).is_ok());

        let err = ensure_owner(&task, Uuid::now_v7()).unwrap_err();
        assert!(matches!(err, TaskError::Forbidden(id) if id == task.id()));
    }
}
