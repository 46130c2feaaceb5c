//! Tasks Domain
//!
//! Personal to-do items owned by a single user: validation, the status
//! lifecycle, filtered listing and the HTTP routes on top.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← axum routes, OpenAPI
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │   Service   │  ← ownership checks, orchestration
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │ Lifecycle / │  ← state machine, filtering, sorting, paging
//! │    Query    │
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │ Repository  │  ← trait + PostgreSQL and in-memory implementations
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_tasks::{PgTaskRepository, TaskService};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//!
//! let service = TaskService::new(PgTaskRepository::new(db));
//! let routes = domain_tasks::handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod postgres;
pub mod query;
pub mod repository;
pub mod service;

pub use error::{TaskError, TaskResult};
pub use handlers::TasksApiDoc;
pub use models::{
    CreateTask, Task, TaskChanges, TaskListParams, TaskPriority, TaskStatus, UpdateTask,
};
pub use postgres::PgTaskRepository;
pub use query::{SortDirection, SortField, TaskPage, TaskQuery, TaskSort};
pub use repository::{InMemoryTaskRepository, TaskRepository};
pub use service::TaskService;
