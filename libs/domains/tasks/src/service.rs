use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{TaskError, TaskResult};
use crate::lifecycle;
use crate::models::{CreateTask, Task, UpdateTask};
use crate::query::{TaskPage, TaskQuery};
use crate::repository::TaskRepository;

/// Task use cases on behalf of an authenticated owner
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> Clone for TaskService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a task owned by `owner_id`
    #[instrument(skip(self, input), fields(owner_id = %owner_id))]
    pub async fn create_task(&self, owner_id: Uuid, input: CreateTask) -> TaskResult<Task> {
        input
            .validate()
            .map_err(|e| TaskError::Validation(e.to_string()))?;

        let task = lifecycle::create(input, owner_id, today())?;
        self.repository.insert(task).await
    }

    #[instrument(skip(self), fields(task_id = %id, owner_id = %owner_id))]
    pub async fn get_task(&self, owner_id: Uuid, id: Uuid) -> TaskResult<Task> {
        self.owned_task(owner_id, id).await
    }

    #[instrument(skip(self, query), fields(owner_id = %query.owner_id))]
    pub async fn list_tasks(&self, query: TaskQuery) -> TaskResult<TaskPage> {
        query.validate()?;
        self.repository.query(query).await
    }

    /// Partial update. Checked in order: existence, ownership, due date,
    /// status guard, field rules.
    #[instrument(skip(self, input), fields(task_id = %id, owner_id = %owner_id))]
    pub async fn update_task(&self, owner_id: Uuid, id: Uuid, input: UpdateTask) -> TaskResult<Task> {
        let mut task = self.owned_task(owner_id, id).await?;
        lifecycle::update(&mut task, input, today())?;
        self.repository.save(task).await
    }

    #[instrument(skip(self), fields(task_id = %id, owner_id = %owner_id))]
    pub async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> TaskResult<()> {
        self.owned_task(owner_id, id).await?;

        if !self.repository.delete(id).await? {
            return Err(TaskError::NotFound(id));
        }
        Ok(())
    }

    /// Mark a task as completed
    #[instrument(skip(self), fields(task_id = %id, owner_id = %owner_id))]
    pub async fn complete_task(&self, owner_id: Uuid, id: Uuid) -> TaskResult<Task> {
        let mut task = self.owned_task(owner_id, id).await?;
        lifecycle::complete(&mut task)?;
        self.repository.save(task).await
    }

    /// Move a task back to pending
    #[instrument(skip(self), fields(task_id = %id, owner_id = %owner_id))]
    pub async fn mark_pending(&self, owner_id: Uuid, id: Uuid) -> TaskResult<Task> {
        let mut task = self.owned_task(owner_id, id).await?;
        lifecycle::reopen_as_pending(&mut task)?;
        self.repository.save(task).await
    }

    /// Existence is checked before ownership: a missing id is `NotFound`
    /// for every caller, a foreign one is `Forbidden`.
    async fn owned_task(&self, owner_id: Uuid, id: Uuid) -> TaskResult<Task> {
        let task = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(TaskError::NotFound(id))?;
        lifecycle::ensure_owner(&task, owner_id)?;
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskPriority, TaskStatus};
    use crate::repository::{InMemoryTaskRepository, MockTaskRepository};
    use mockall::predicate::eq;

    fn create_input(name: &str) -> CreateTask {
        CreateTask {
            name: Some(name.into()),
            due_date: Some(today()),
            ..Default::default()
        }
    }

    fn stored_task(owner: Uuid) -> Task {
        lifecycle::create(create_input("Stored"), owner, today()).unwrap()
    }

    #[tokio::test]
    async fn test_create_task_persists_owner() {
        let service = TaskService::new(InMemoryTaskRepository::new());
        let owner = Uuid::now_v7();

        let task = service.create_task(owner, create_input("Tarefa 1")).await.unwrap();

        assert_eq!(task.owner_id(), owner);
        assert_eq!(task.status(), TaskStatus::Open);
        assert_eq!(service.get_task(owner, task.id()).await.unwrap(), task);
    }

    #[tokio::test]
    async fn test_create_task_rejects_long_name() {
        let mut mock_repo = MockTaskRepository::new();
        mock_repo.expect_insert().never();
        let service = TaskService::new(mock_repo);

        let result = service.create_task(Uuid::now_v7(), create_input(&"x".repeat(101))).await;
        assert!(matches!(result, Err(TaskError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_missing_task_is_not_found() {
        let mut mock_repo = MockTaskRepository::new();
        let id = Uuid::now_v7();
        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(None));
        let service = TaskService::new(mock_repo);

        let result = service.get_task(Uuid::now_v7(), id).await;
        assert!(matches!(result, Err(TaskError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_foreign_task_is_forbidden_and_untouched() {
        let owner = Uuid::now_v7();
        let task = stored_task(owner);
        let id = task.id();

        let mut mock_repo = MockTaskRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(task.clone())));
        mock_repo.expect_save().never();
        mock_repo.expect_delete().never();
        let service = TaskService::new(mock_repo);

        let intruder = Uuid::now_v7();
        assert!(matches!(service.get_task(intruder, id).await, Err(TaskError::Forbidden(_))));
        assert!(matches!(service.complete_task(intruder, id).await, Err(TaskError::Forbidden(_))));
        assert!(matches!(service.mark_pending(intruder, id).await, Err(TaskError::Forbidden(_))));
        assert!(matches!(service.delete_task(intruder, id).await, Err(TaskError::Forbidden(_))));
        assert!(matches!(
            service.update_task(intruder, id, UpdateTask::default()).await,
            Err(TaskError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_then_pending() {
        let service = TaskService::new(InMemoryTaskRepository::new());
        let owner = Uuid::now_v7();
        let task = service.create_task(owner, create_input("Tarefa")).await.unwrap();

        let completed = service.complete_task(owner, task.id()).await.unwrap();
        assert_eq!(completed.status(), TaskStatus::Completed);

        let again = service.complete_task(owner, task.id()).await;
        assert!(matches!(again, Err(TaskError::AlreadyInState(TaskStatus::Completed))));

        let pending = service.mark_pending(owner, task.id()).await.unwrap();
        assert_eq!(pending.status(), TaskStatus::Pending);
        assert!(service.mark_pending(owner, task.id()).await.is_err());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let service = TaskService::new(InMemoryTaskRepository::new());
        let owner = Uuid::now_v7();
        let task = service.create_task(owner, create_input("Tarefa")).await.unwrap();

        let input = UpdateTask {
            description: Some("more detail".into()),
            priority: Some(TaskPriority::High),
            ..Default::default()
        };
        let updated = service.update_task(owner, task.id(), input).await.unwrap();

        assert_eq!(updated.name(), "Tarefa");
        assert_eq!(updated.description(), Some("more detail"));
        assert_eq!(updated.priority(), TaskPriority::High);
        assert_eq!(updated.created_at(), task.created_at());
    }

    #[tokio::test]
    async fn test_update_status_change_is_rejected() {
        let service = TaskService::new(InMemoryTaskRepository::new());
        let owner = Uuid::now_v7();
        let task = service.create_task(owner, create_input("Tarefa")).await.unwrap();

        let input = UpdateTask {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let result = service.update_task(owner, task.id(), input).await;
        assert!(matches!(result, Err(TaskError::IllegalStatusChange { .. })));
        assert_eq!(
            service.get_task(owner, task.id()).await.unwrap().status(),
            TaskStatus::Open
        );
    }

    #[tokio::test]
    async fn test_update_guards_run_before_field_rules() {
        let owner = Uuid::now_v7();
        let task = stored_task(owner);
        let id = task.id();
        let too_long = || UpdateTask {
            name: Some("x".repeat(101)),
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };

        let mut mock_repo = MockTaskRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(move |requested| Ok((requested == id).then(|| task.clone())));
        mock_repo.expect_save().never();
        let service = TaskService::new(mock_repo);

        let missing = Uuid::now_v7();
        assert!(matches!(
            service.update_task(owner, missing, too_long()).await,
            Err(TaskError::NotFound(found)) if found == missing
        ));
        assert!(matches!(
            service.update_task(Uuid::now_v7(), id, too_long()).await,
            Err(TaskError::Forbidden(_))
        ));
        assert!(matches!(
            service.update_task(owner, id, too_long()).await,
            Err(TaskError::IllegalStatusChange {
                current: TaskStatus::Open,
                requested: TaskStatus::Completed
            })
        ));

        let same_status = UpdateTask {
            status: Some(TaskStatus::Open),
            ..too_long()
        };
        assert!(matches!(
            service.update_task(owner, id, same_status).await,
            Err(TaskError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_task() {
        let service = TaskService::new(InMemoryTaskRepository::new());
        let owner = Uuid::now_v7();
        let task = service.create_task(owner, create_input("Tarefa")).await.unwrap();

        service.delete_task(owner, task.id()).await.unwrap();
        assert!(matches!(
            service.delete_task(owner, task.id()).await,
            Err(TaskError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_tasks_validates_page_size() {
        let mut mock_repo = MockTaskRepository::new();
        mock_repo.expect_query().never();
        let service = TaskService::new(mock_repo);

        let query = TaskQuery {
            page_size: 0,
            ..TaskQuery::for_owner(Uuid::now_v7())
        };
        assert!(matches!(service.list_tasks(query).await, Err(TaskError::Validation(_))));
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let mut mock_repo = MockTaskRepository::new();
        mock_repo
            .expect_insert()
            .returning(|_| Err(TaskError::Database("connection reset".into())));
        let service = TaskService::new(mock_repo);

        let result = service.create_task(Uuid::now_v7(), create_input("Tarefa")).await;
        assert!(matches!(result, Err(TaskError::Database(_))));
    }
}
