use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{TaskError, TaskResult};
use crate::query::{TaskQuery, TaskSort};

pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Task priority levels, ordered LOW < MEDIUM < HIGH
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_priority")]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum TaskPriority {
    /// Default priority
    #[default]
    #[sea_orm(string_value = "low")]
    #[strum(to_string = "LOW", serialize = "BAIXA")]
    Low,
    #[sea_orm(string_value = "medium")]
    #[strum(to_string = "MEDIUM", serialize = "MEDIA")]
    Medium,
    #[sea_orm(string_value = "high")]
    #[strum(to_string = "HIGH", serialize = "ALTA")]
    High,
}

impl TryFrom<String> for TaskPriority {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .trim()
            .parse()
            .map_err(|_| format!("unknown priority '{}', expected LOW, MEDIUM or HIGH", value))
    }
}

/// Task status, ordered OPEN < PENDING < COMPLETED
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_status")]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum TaskStatus {
    /// Initial status of a new task
    #[default]
    #[sea_orm(string_value = "open")]
    #[strum(to_string = "OPEN", serialize = "ABERTA")]
    Open,
    #[sea_orm(string_value = "pending")]
    #[strum(to_string = "PENDING", serialize = "PENDENTE")]
    Pending,
    #[sea_orm(string_value = "completed")]
    #[strum(to_string = "COMPLETED", serialize = "CONCLUIDA")]
    Completed,
}

impl TryFrom<String> for TaskStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .trim()
            .parse()
            .map_err(|_| format!("unknown status '{}', expected OPEN, PENDING or COMPLETED", value))
    }
}

/// A personal to-do item.
///
/// Every `Task` in memory holds a valid name and due date: construction goes
/// through [`Task::new`] and edits through [`Task::apply_changes`]. Identity,
/// owner and creation time never change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub(crate) id: Uuid,
    #[schema(example = "Estudar Rust")]
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) priority: TaskPriority,
    pub(crate) status: TaskStatus,
    pub(crate) due_date: NaiveDate,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) owner_id: Uuid,
}

impl Task {
    /// Validated construction for a new task owned by `owner_id`.
    ///
    /// Priority defaults to LOW and status to OPEN when absent.
    pub fn new(input: CreateTask, owner_id: Uuid, today: NaiveDate) -> TaskResult<Self> {
        let name = input
            .name
            .ok_or_else(|| TaskError::validation("name is required"))?;
        validate_name(&name)?;
        if let Some(description) = &input.description {
            validate_description(description)?;
        }
        let due_date = validate_due_date(input.due_date, today)?;

        Ok(Self {
            id: Uuid::now_v7(),
            name,
            description: input.description,
            priority: input.priority.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            due_date,
            created_at: Utc::now(),
            owner_id,
        })
    }

    /// Merge the mergeable fields. Nothing is written unless every present
    /// field is valid.
    pub fn apply_changes(&mut self, changes: TaskChanges, today: NaiveDate) -> TaskResult<()> {
        if let Some(name) = &changes.name {
            validate_name(name)?;
        }
        if let Some(description) = &changes.description {
            validate_description(description)?;
        }
        if changes.due_date.is_some() {
            validate_due_date(changes.due_date, today)?;
        }

        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        Ok(())
    }

    pub(crate) fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Non-blank and at most [`NAME_MAX_CHARS`] characters.
pub fn validate_name(name: &str) -> TaskResult<()> {
    if name.trim().is_empty() {
        return Err(TaskError::validation("name must not be blank"));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(TaskError::validation(format!(
            "name must be at most {} characters",
            NAME_MAX_CHARS
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> TaskResult<()> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(TaskError::validation(format!(
            "description must be at most {} characters",
            DESCRIPTION_MAX_CHARS
        )));
    }
    Ok(())
}

/// Due date is required and may not lie before `today`.
pub fn validate_due_date(due_date: Option<NaiveDate>, today: NaiveDate) -> TaskResult<NaiveDate> {
    let due_date = due_date.ok_or_else(|| TaskError::validation("dueDate is required"))?;
    if due_date < today {
        return Err(TaskError::InvalidDueDate { due_date, today });
    }
    Ok(due_date)
}

/// The fields an update may overwrite. Identity, owner, creation time and
/// status are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
}

/// Payload keys understood on write, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Name,
    Description,
    Priority,
    Status,
    DueDate,
}

impl TaskField {
    /// Canonical key or one of the legacy client's aliases. Owner keys
    /// (`userId`, `idUser`) and anything unknown map to `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "name" | "nome" => Some(Self::Name),
            "description" | "descricao" => Some(Self::Description),
            "priority" | "prioridade" => Some(Self::Priority),
            "status" | "situacao" | "situation" => Some(Self::Status),
            "duedate" | "expectedcompletiondate" | "dataprevistaconclusao" => Some(Self::DueDate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Priority => "priority",
            Self::Status => "status",
            Self::DueDate => "dueDate",
        }
    }
}

/// Raw write payload with keys normalised to [`TaskField`]s and nulls dropped.
///
/// Two keys naming the same field (`name` and `nome`) are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct TaskPayload {
    fields: HashMap<TaskField, Value>,
}

impl TryFrom<Map<String, Value>> for TaskPayload {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut fields = HashMap::new();
        for (key, value) in map {
            if value.is_null() {
                continue;
            }
            let Some(field) = TaskField::from_key(&key) else {
                continue;
            };
            if fields.insert(field, value).is_some() {
                return Err(format!("{} given more than once (via {})", field.as_str(), key));
            }
        }
        Ok(Self { fields })
    }
}

impl TaskPayload {
    fn take<T: DeserializeOwned>(&mut self, field: TaskField) -> Result<Option<T>, String> {
        self.fields
            .remove(&field)
            .map(|value| {
                serde_json::from_value(value).map_err(|e| format!("invalid {}: {}", field.as_str(), e))
            })
            .transpose()
    }
}

/// DTO for creating a new task.
///
/// Every field is optional on the wire; required-field checks happen in
/// [`Task::new`] so that they surface as validation errors.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(try_from = "TaskPayload")]
pub struct CreateTask {
    #[validate(length(max = 100))]
    #[schema(example = "Estudar Rust")]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    #[schema(example = "2030-01-31")]
    pub due_date: Option<NaiveDate>,
}

impl TryFrom<TaskPayload> for CreateTask {
    type Error = String;

    fn try_from(mut payload: TaskPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            name: payload.take(TaskField::Name)?,
            description: payload.take(TaskField::Description)?,
            priority: payload.take(TaskField::Priority)?,
            status: payload.take(TaskField::Status)?,
            due_date: payload.take(TaskField::DueDate)?,
        })
    }
}

/// DTO for a partial update; absent fields are left untouched.
///
/// Field rules are checked by [`Task::apply_changes`] once the task has been
/// found, its owner confirmed and the status guard passed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(try_from = "TaskPayload")]
pub struct UpdateTask {
    #[schema(max_length = 100)]
    pub name: Option<String>,
    #[schema(max_length = 500)]
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    /// Accepted only when equal to the current status
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

impl TryFrom<TaskPayload> for UpdateTask {
    type Error = String;

    fn try_from(mut payload: TaskPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            name: payload.take(TaskField::Name)?,
            description: payload.take(TaskField::Description)?,
            priority: payload.take(TaskField::Priority)?,
            status: payload.take(TaskField::Status)?,
            due_date: payload.take(TaskField::DueDate)?,
        })
    }
}

impl UpdateTask {
    pub fn changes(&self) -> TaskChanges {
        TaskChanges {
            name: self.name.clone(),
            description: self.description.clone(),
            priority: self.priority,
            due_date: self.due_date,
        }
    }
}

/// Query string of the list endpoint
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TaskListParams {
    /// Case-insensitive substring of the task name
    #[serde(alias = "nome")]
    pub name: Option<String>,
    #[serde(alias = "prioridade")]
    pub priority: Option<TaskPriority>,
    #[serde(alias = "situacao")]
    pub status: Option<TaskStatus>,
    /// Zero-based page index
    #[serde(default, alias = "pagina")]
    pub page: u64,
    #[serde(default = "default_page_size", alias = "tamanho")]
    pub page_size: u64,
    /// name, description, priority, status, dueDate or createdAt
    #[serde(default = "default_sort_field", alias = "ordenarPor")]
    pub sort_field: String,
    /// ASC or DESC
    #[serde(default = "default_sort_direction", alias = "direcao")]
    pub sort_direction: String,
}

fn default_page_size() -> u64 {
    crate::query::DEFAULT_PAGE_SIZE
}

fn default_sort_field() -> String {
    "name".to_string()
}

fn default_sort_direction() -> String {
    "ASC".to_string()
}

impl Default for TaskListParams {
    fn default() -> Self {
        Self {
            name: None,
            priority: None,
            status: None,
            page: 0,
            page_size: default_page_size(),
            sort_field: default_sort_field(),
            sort_direction: default_sort_direction(),
        }
    }
}

impl TaskListParams {
    pub fn into_query(self, owner_id: Uuid) -> TaskResult<TaskQuery> {
        let sort = TaskSort::parse(&self.sort_field, &self.sort_direction)?;
        let query = TaskQuery {
            owner_id,
            name_contains: self.name.filter(|name| !name.is_empty()),
            priority: self.priority,
            status: self.status,
            page: self.page,
            page_size: self.page_size,
            sort,
        };
        query.validate()?;
        Ok(query)
    }
}
