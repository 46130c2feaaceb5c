use crate::models::{Task, TaskPriority, TaskStatus};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// Row of the `tasks` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Date,
    pub created_at: DateTimeWithTimeZone,
    pub owner_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Task {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            priority: model.priority,
            status: model.status,
            due_date: model.due_date,
            created_at: model.created_at.into(),
            owner_id: model.owner_id,
        }
    }
}

impl From<&Task> for ActiveModel {
    fn from(task: &Task) -> Self {
        ActiveModel {
            id: Set(task.id),
            name: Set(task.name.clone()),
            description: Set(task.description.clone()),
            priority: Set(task.priority),
            status: Set(task.status),
            due_date: Set(task.due_date),
            created_at: Set(task.created_at.into()),
            owner_id: Set(task.owner_id),
        }
    }
}
