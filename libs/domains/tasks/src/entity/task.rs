use crate::models::{TaskCategory, TaskPriority};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub due_date: DateTimeWithTimeZone,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub location_id: Option<i32>,
    pub is_completed: bool,
    pub is_deleted: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id",
        on_delete = "SetNull"
    )]
    Location,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Build the domain task from a row and its joined location.
pub fn into_task(model: Model, location: Option<super::location::Model>) -> crate::models::Task {
    crate::models::Task {
        id: model.id,
        title: model.title,
        description: model.description,
        due_date: model.due_date.into(),
        priority: model.priority,
        category: model.category,
        location: location.map(Into::into),
        is_completed: model.is_completed,
        is_deleted: model.is_deleted,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    }
}
