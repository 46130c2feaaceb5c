use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use axum_helpers::{AppError, AuthUser, UuidPath, ValidatedJson};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{TaskError, TaskResult};
use crate::models::{CreateTask, Task, TaskListParams, TaskPriority, TaskStatus, UpdateTask};
use crate::query::TaskPage;
use crate::repository::TaskRepository;
use crate::service::TaskService;

/// OpenAPI documentation for the tasks API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_tasks,
        get_task,
        create_task,
        update_task,
        delete_task,
        complete_task,
        mark_pending,
    ),
    components(
        schemas(Task, TaskPage, CreateTask, UpdateTask, TaskPriority, TaskStatus),
        responses(
            axum_helpers::errors::responses::BadRequestResponse,
            axum_helpers::errors::responses::BadRequestUuidResponse,
            axum_helpers::errors::responses::UnauthorizedResponse,
            axum_helpers::errors::responses::ForbiddenResponse,
            axum_helpers::errors::responses::NotFoundResponse,
            axum_helpers::errors::responses::InternalServerErrorResponse,
        )
    ),
    tags(
        (name = "tasks", description = "Personal task management")
    )
)]
pub struct TasksApiDoc;

/// Routes for the tasks API, to be nested behind the auth middleware.
///
/// `concluir` and `pendente` are kept for older clients.
pub fn router<R: TaskRepository + 'static>(service: TaskService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/{id}", get(get_task).put(update_task).delete(delete_task))
        .route("/{id}/complete", patch(complete_task))
        .route("/{id}/concluir", patch(complete_task))
        .route("/{id}/pending", patch(mark_pending))
        .route("/{id}/pendente", patch(mark_pending))
        .with_state(shared_service)
}

/// List the caller's tasks
#[utoipa::path(
    get,
    path = "",
    tag = "tasks",
    params(TaskListParams),
    responses(
        (status = 200, description = "One page of tasks", body = TaskPage),
        (status = 400, response = axum_helpers::errors::responses::BadRequestResponse),
        (status = 401, response = axum_helpers::errors::responses::UnauthorizedResponse),
        (status = 500, response = axum_helpers::errors::responses::InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_tasks<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    AuthUser(owner_id): AuthUser,
    params: Result<Query<TaskListParams>, QueryRejection>,
) -> TaskResult<Json<TaskPage>> {
    let Query(params) = params.map_err(|e| TaskError::Validation(e.body_text()))?;
    let query = params.into_query(owner_id)?;

    let page = service.list_tasks(query).await?;
    Ok(Json(page))
}

/// Get a task by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 400, response = axum_helpers::errors::responses::BadRequestUuidResponse),
        (status = 403, response = axum_helpers::errors::responses::ForbiddenResponse),
        (status = 404, response = axum_helpers::errors::responses::NotFoundResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    AuthUser(owner_id): AuthUser,
    UuidPath(id): UuidPath,
) -> TaskResult<impl IntoResponse> {
    let task = service.get_task(owner_id, id).await?;
    Ok(Json(task))
}

/// Create a new task
#[utoipa::path(
    post,
    path = "",
    tag = "tasks",
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created successfully", body = Task),
        (status = 400, response = axum_helpers::errors::responses::BadRequestResponse),
        (status = 401, response = axum_helpers::errors::responses::UnauthorizedResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    AuthUser(owner_id): AuthUser,
    ValidatedJson(input): ValidatedJson<CreateTask>,
) -> TaskResult<impl IntoResponse> {
    let task = service.create_task(owner_id, input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Update a task. Absent fields are left unchanged.
///
/// The body is only parsed here; field rules run in the service after the
/// existence, ownership and status checks.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "Task updated successfully", body = Task),
        (status = 400, response = axum_helpers::errors::responses::BadRequestResponse),
        (status = 403, response = axum_helpers::errors::responses::ForbiddenResponse),
        (status = 404, response = axum_helpers::errors::responses::NotFoundResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    AuthUser(owner_id): AuthUser,
    UuidPath(id): UuidPath,
    input: Result<Json<UpdateTask>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = input?;
    let task = service.update_task(owner_id, id, input).await?;
    Ok(Json(task))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted successfully"),
        (status = 403, response = axum_helpers::errors::responses::ForbiddenResponse),
        (status = 404, response = axum_helpers::errors::responses::NotFoundResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    AuthUser(owner_id): AuthUser,
    UuidPath(id): UuidPath,
) -> TaskResult<impl IntoResponse> {
    service.delete_task(owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark a task as completed
#[utoipa::path(
    patch,
    path = "/{id}/complete",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task completed", body = Task),
        (status = 400, description = "Task is already completed"),
        (status = 403, response = axum_helpers::errors::responses::ForbiddenResponse),
        (status = 404, response = axum_helpers::errors::responses::NotFoundResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn complete_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    AuthUser(owner_id): AuthUser,
    UuidPath(id): UuidPath,
) -> TaskResult<impl IntoResponse> {
    let task = service.complete_task(owner_id, id).await?;
    Ok(Json(task))
}

/// Move a task back to pending
#[utoipa::path(
    patch,
    path = "/{id}/pending",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task is pending", body = Task),
        (status = 400, description = "Task is already pending"),
        (status = 403, response = axum_helpers::errors::responses::ForbiddenResponse),
        (status = 404, response = axum_helpers::errors::responses::NotFoundResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_pending<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    AuthUser(owner_id): AuthUser,
    UuidPath(id): UuidPath,
) -> TaskResult<impl IntoResponse> {
    let task = service.mark_pending(owner_id, id).await?;
    Ok(Json(task))
}
