use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(TaskPriority::Enum)
                    .values(TaskPriority::variants())
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(TaskStatus::Enum)
                    .values(TaskStatus::variants())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_uuid(Tasks::Id))
                    .col(string_len(Tasks::Name, 100))
                    .col(string_len_null(Tasks::Description, 500))
                    .col(
                        ColumnDef::new(Tasks::Priority)
                            .enumeration(TaskPriority::Enum, TaskPriority::variants())
                            .not_null()
                            .default("low"),
                    )
                    .col(
                        ColumnDef::new(Tasks::Status)
                            .enumeration(TaskStatus::Enum, TaskStatus::variants())
                            .not_null()
                            .default("open"),
                    )
                    .col(date(Tasks::DueDate))
                    .col(
                        timestamp_with_time_zone(Tasks::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(uuid(Tasks::OwnerId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_owner_id")
                    .table(Tasks::Table)
                    .col(Tasks::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_owner_id_status")
                    .table(Tasks::Table)
                    .col(Tasks::OwnerId)
                    .col(Tasks::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(TaskStatus::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(TaskPriority::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Name,
    Description,
    Priority,
    Status,
    DueDate,
    CreatedAt,
    OwnerId,
}

#[derive(DeriveIden)]
enum TaskPriority {
    #[sea_orm(iden = "task_priority")]
    Enum,
    #[sea_orm(iden = "low")]
    Low,
    #[sea_orm(iden = "medium")]
    Medium,
    #[sea_orm(iden = "high")]
    High,
}

impl TaskPriority {
    fn variants() -> [Self; 3] {
        [Self::Low, Self::Medium, Self::High]
    }
}

#[derive(DeriveIden)]
enum TaskStatus {
    #[sea_orm(iden = "task_status")]
    Enum,
    #[sea_orm(iden = "open")]
    Open,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "completed")]
    Completed,
}

impl TaskStatus {
    fn variants() -> [Self; 3] {
        [Self::Open, Self::Pending, Self::Completed]
    }
}
