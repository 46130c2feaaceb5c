use async_trait::async_trait;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, NullOrdering, Order};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{TaskError, TaskResult},
    models::Task,
    query::{SortDirection, SortField, TaskPage, TaskQuery},
    repository::TaskRepository,
};

pub struct PgTaskRepository {
    db: DatabaseConnection,
}

impl PgTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn filtered(query: &TaskQuery) -> Select<entity::Entity> {
        let mut select = entity::Entity::find().filter(entity::Column::OwnerId.eq(query.owner_id));

        if let Some(name) = query.name_filter() {
            select = select.filter(Expr::col(entity::Column::Name).ilike(like_pattern(name)));
        }
        if let Some(priority) = query.priority {
            select = select.filter(entity::Column::Priority.eq(priority));
        }
        if let Some(status) = query.status {
            select = select.filter(entity::Column::Status.eq(status));
        }
        select
    }

    fn sorted(select: Select<entity::Entity>, query: &TaskQuery) -> Select<entity::Entity> {
        let order = match query.sort.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        let select = match query.sort.field {
            SortField::Name => select.order_by(entity::Column::Name, order),
            SortField::Description => {
                let nulls = match query.sort.direction {
                    SortDirection::Asc => NullOrdering::First,
                    SortDirection::Desc => NullOrdering::Last,
                };
                select.order_by_with_nulls(entity::Column::Description, order, nulls)
            }
            SortField::Priority => select.order_by(entity::Column::Priority, order),
            SortField::Status => select.order_by(entity::Column::Status, order),
            SortField::DueDate => select.order_by(entity::Column::DueDate, order),
            SortField::CreatedAt => select.order_by(entity::Column::CreatedAt, order),
        };
        select.order_by_asc(entity::Column::Id)
    }
}

/// `%needle%` with LIKE wildcards in the needle escaped
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn insert(&self, task: Task) -> TaskResult<Task> {
        let model = entity::ActiveModel::from(&task).insert(&self.db).await?;

        tracing::info!(task_id = %model.id, owner_id = %model.owner_id, "Created task");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn save(&self, task: Task) -> TaskResult<Task> {
        let id = task.id();
        let model = entity::ActiveModel::from(&task)
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => TaskError::NotFound(id),
                other => other.into(),
            })?;

        tracing::info!(task_id = %id, "Updated task");
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> TaskResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(task_id = %id, "Deleted task");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn query(&self, query: TaskQuery) -> TaskResult<TaskPage> {
        // the paginator multiplies page by page_size unchecked
        query.validate()?;

        let select = Self::sorted(Self::filtered(&query), &query);
        let paginator = select.paginate(&self.db, query.page_size);

        let total_count = paginator.num_items().await?;
        let models = paginator.fetch_page(query.page).await?;

        Ok(TaskPage::new(
            models.into_iter().map(Into::into).collect(),
            total_count,
            query.page,
            query.page_size,
        ))
    }
}
