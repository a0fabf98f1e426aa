use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250105_000001_create_locations::Locations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_auto(Tasks::Id))
                    .col(string_len(Tasks::Title, 200))
                    .col(text(Tasks::Description).default(""))
                    .col(timestamp_with_time_zone(Tasks::DueDate))
                    .col(string_len(Tasks::Priority, 10).default("Low"))
                    .col(string_len(Tasks::Category, 20).default("Personal"))
                    .col(integer_null(Tasks::LocationId))
                    .col(boolean(Tasks::IsCompleted).default(false))
                    .col(boolean(Tasks::IsDeleted).default(false))
                    .col(
                        timestamp_with_time_zone(Tasks::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Tasks::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_location_id")
                            .from(Tasks::Table, Tasks::LocationId)
                            .to(Locations::Table, Locations::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_tasks_is_deleted", Tasks::IsDeleted),
            ("idx_tasks_due_date", Tasks::DueDate),
            ("idx_tasks_created_at", Tasks::CreatedAt),
            ("idx_tasks_updated_at", Tasks::UpdatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Tasks::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Title,
    Description,
    DueDate,
    Priority,
    Category,
    LocationId,
    IsCompleted,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}
