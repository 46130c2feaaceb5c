use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{TaskError, TaskResult};
use crate::models::Task;
use crate::query::{TaskPage, TaskQuery, run_query};

/// Persistence port for tasks.
///
/// Implementations store whole [`Task`] values; every business rule lives
/// above this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, task: Task) -> TaskResult<Task>;

    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>>;

    /// Overwrite an existing task. Fails with `NotFound` when it is gone.
    async fn save(&self, task: Task) -> TaskResult<Task>;

    /// Returns whether a task was removed
    async fn delete(&self, id: Uuid) -> TaskResult<bool>;

    async fn query(&self, query: TaskQuery) -> TaskResult<TaskPage>;
}

/// Repository backed by a vector behind a lock; used in tests and local runs.
#[derive(Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<Vec<Task>>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, task: Task) -> TaskResult<Task> {
        let mut tasks = self.tasks.write().await;
        if tasks.iter().any(|t| t.id() == task.id()) {
            return Err(TaskError::Internal(format!("duplicate task id {}", task.id())));
        }
        tasks.push(task.clone());
        Ok(task)
    }

    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().find(|t| t.id() == id).cloned())
    }

    async fn save(&self, task: Task) -> TaskResult<Task> {
        let mut tasks = self.tasks.write().await;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id() == task.id())
            .ok_or(TaskError::NotFound(task.id()))?;
        *slot = task.clone();
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> TaskResult<bool> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id() != id);
        Ok(tasks.len() < before)
    }

    async fn query(&self, query: TaskQuery) -> TaskResult<TaskPage> {
        query.validate()?;
        let tasks = self.tasks.read().await;
        Ok(run_query(tasks.iter(), &query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateTask;
    use chrono::NaiveDate;

    fn new_task(owner: Uuid, name: &str) -> Task {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let input = CreateTask {
            name: Some(name.into()),
            due_date: Some(today),
            ..Default::default()
        };
        Task::new(input, owner, today).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryTaskRepository::new();
        let task = repo.insert(new_task(Uuid::now_v7(), "Tarefa")).await.unwrap();

        let found = repo.get_by_id(task.id()).await.unwrap();
        assert_eq!(found, Some(task));
        assert_eq!(repo.get_by_id(Uuid::now_v7()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_missing_task_is_not_found() {
        let repo = InMemoryTaskRepository::new();
        let task = new_task(Uuid::now_v7(), "Ghost");
        assert!(matches!(repo.save(task).await, Err(TaskError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let repo = InMemoryTaskRepository::new();
        let task = repo.insert(new_task(Uuid::now_v7(), "Tarefa")).await.unwrap();

        assert!(repo.delete(task.id()).await.unwrap());
        assert!(!repo.delete(task.id()).await.unwrap());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_query_scopes_to_owner() {
        let repo = InMemoryTaskRepository::new();
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        repo.insert(new_task(alice, "A1")).await.unwrap();
        repo.insert(new_task(alice, "A2")).await.unwrap();
        repo.insert(new_task(bob, "B1")).await.unwrap();

        let page = repo.query(TaskQuery::for_owner(alice)).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert!(page.items.iter().all(|t| t.owner_id() == alice));
        assert_eq!(repo.len().await, 3);
    }

    #[tokio::test]
    async fn test_query_rejects_out_of_range_page() {
        let repo = InMemoryTaskRepository::new();
        let query = TaskQuery {
            page: u64::MAX / 2,
            ..TaskQuery::for_owner(Uuid::now_v7())
        };

        assert!(matches!(repo.query(query).await, Err(TaskError::Validation(_))));
    }
}
