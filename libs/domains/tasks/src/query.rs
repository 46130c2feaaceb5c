use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{TaskError, TaskResult};
use crate::models::{Task, TaskPriority, TaskStatus};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SortField {
    #[default]
    #[strum(to_string = "name", serialize = "nome")]
    Name,
    #[strum(to_string = "description", serialize = "descricao")]
    Description,
    #[strum(to_string = "priority", serialize = "prioridade")]
    Priority,
    #[strum(to_string = "status", serialize = "situacao")]
    Status,
    #[strum(to_string = "dueDate", serialize = "dataPrevistaConclusao")]
    DueDate,
    #[strum(to_string = "createdAt", serialize = "dataCriacao")]
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl TaskSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn parse(field: &str, direction: &str) -> TaskResult<Self> {
        let field = SortField::from_str(field.trim())
            .map_err(|_| TaskError::validation(format!("unknown sort field '{}'", field)))?;
        let direction = SortDirection::from_str(direction.trim()).map_err(|_| {
            TaskError::validation(format!("unknown sort direction '{}', expected ASC or DESC", direction))
        })?;
        Ok(Self { field, direction })
    }

    /// Total order over tasks: the chosen field in the chosen direction, then
    /// id ascending.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let by_field = match self.field {
            SortField::Name => a.name().cmp(b.name()),
            SortField::Description => a.description().cmp(&b.description()),
            SortField::Priority => a.priority().cmp(&b.priority()),
            SortField::Status => a.status().cmp(&b.status()),
            SortField::DueDate => a.due_date().cmp(&b.due_date()),
            SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
        };
        let by_field = match self.direction {
            SortDirection::Asc => by_field,
            SortDirection::Desc => by_field.reverse(),
        };
        by_field.then_with(|| a.id().cmp(&b.id()))
    }
}

/// One owner's filtered, sorted, paged view of their tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub owner_id: Uuid,
    pub name_contains: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    /// Zero-based
    pub page: u64,
    pub page_size: u64,
    pub sort: TaskSort,
}

impl TaskQuery {
    pub fn for_owner(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            name_contains: None,
            priority: None,
            status: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort: TaskSort::default(),
        }
    }

    pub fn validate(&self) -> TaskResult<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(TaskError::validation(format!(
                "pageSize must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if self.offset().is_none() {
            return Err(TaskError::validation(format!("page {} is out of range", self.page)));
        }
        Ok(())
    }

    /// Name filter as given; empty counts as absent
    pub fn name_filter(&self) -> Option<&str> {
        self.name_contains.as_deref().filter(|name| !name.is_empty())
    }

    pub fn matches(&self, task: &Task) -> bool {
        if task.owner_id() != self.owner_id {
            return false;
        }
        if let Some(needle) = self.name_filter() {
            if !task.name().to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if self.priority.is_some_and(|p| p != task.priority()) {
            return false;
        }
        if self.status.is_some_and(|s| s != task.status()) {
            return false;
        }
        true
    }

    /// Rows skipped before this page. `None` when it does not fit a SQL
    /// `OFFSET` (signed 64-bit).
    pub fn offset(&self) -> Option<u64> {
        self.page
            .checked_mul(self.page_size)
            .filter(|offset| i64::try_from(*offset).is_ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    pub items: Vec<Task>,
    pub total_count: u64,
    pub total_pages: u64,
    pub page: u64,
    pub page_size: u64,
}

impl TaskPage {
    pub fn new(items: Vec<Task>, total_count: u64, page: u64, page_size: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(page_size)
        };
        Self {
            items,
            total_count,
            total_pages,
            page,
            page_size,
        }
    }
}

/// Cut one page out of an already filtered and sorted list.
pub fn paginate(sorted: Vec<Task>, page: u64, page_size: u64) -> TaskPage {
    let total_count = sorted.len() as u64;
    let start = usize::try_from(page.saturating_mul(page_size)).unwrap_or(usize::MAX);
    let take = usize::try_from(page_size).unwrap_or(usize::MAX);
    let items = sorted.into_iter().skip(start).take(take).collect();
    TaskPage::new(items, total_count, page, page_size)
}

/// Filter, sort and page `tasks` in memory.
pub fn run_query<'a>(tasks: impl IntoIterator<Item = &'a Task>, query: &TaskQuery) -> TaskPage {
    let mut matching: Vec<Task> = tasks
        .into_iter()
        .filter(|task| query.matches(task))
        .cloned()
        .collect();
    matching.sort_by(|a, b| query.sort.compare(a, b));
    paginate(matching, query.page, query.page_size)
}
