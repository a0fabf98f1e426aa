use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select,
};

use crate::entity::{location, task};
use crate::error::{TaskError, TaskResult};
use crate::models::{Location, NewLocation, Task, TaskFilter, TaskInput, TaskSort};
use crate::repository::{LocationRepository, TaskRepository};

pub struct SqlTaskRepository {
    db: DatabaseConnection,
}

impl SqlTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn filtered(filter: &TaskFilter) -> Select<task::Entity> {
        task::Entity::find()
            .filter(task::Column::IsDeleted.eq(filter.is_deleted))
            .apply_if(filter.is_completed, |query, done| {
                query.filter(task::Column::IsCompleted.eq(done))
            })
    }
}

#[async_trait]
impl TaskRepository for SqlTaskRepository {
    async fn create(&self, input: TaskInput) -> TaskResult<Task> {
        let now = Utc::now();
        let model = task::ActiveModel {
            id: NotSet,
            title: Set(input.title),
            description: Set(input.description),
            due_date: Set(input.due_date.into()),
            priority: Set(input.priority),
            category: Set(input.category),
            location_id: Set(input.location.as_ref().map(|l| l.id)),
            is_completed: Set(false),
            is_deleted: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(task_id = model.id, "Created task");
        let mut created = task::into_task(model, None);
        created.location = input.location;
        Ok(created)
    }

    async fn get_by_id(&self, id: i32) -> TaskResult<Option<Task>> {
        let row = task::Entity::find_by_id(id)
            .find_also_related(location::Entity)
            .one(&self.db)
            .await?;

        Ok(row.map(|(model, location)| task::into_task(model, location)))
    }

    async fn save(&self, record: Task) -> TaskResult<Task> {
        let id = record.id;
        let location = record.location;
        let result = task::ActiveModel {
            id: Set(id),
            title: Set(record.title),
            description: Set(record.description),
            due_date: Set(record.due_date.into()),
            priority: Set(record.priority),
            category: Set(record.category),
            location_id: Set(location.as_ref().map(|l| l.id)),
            is_completed: Set(record.is_completed),
            is_deleted: Set(record.is_deleted),
            created_at: NotSet,
            updated_at: Set(Utc::now().into()),
        }
        .update(&self.db)
        .await;

        let model = match result {
            Ok(model) => model,
            Err(DbErr::RecordNotUpdated) => return Err(TaskError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(task_id = id, "Saved task");
        let mut saved = task::into_task(model, None);
        saved.location = location;
        Ok(saved)
    }

    async fn delete(&self, id: i32) -> TaskResult<bool> {
        let result = task::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(task_id = id, "Deleted task permanently");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn list(&self, filter: TaskFilter) -> TaskResult<Vec<Task>> {
        let query = Self::filtered(&filter);

        let query = match filter.sort {
            TaskSort::Newest => query.order_by_desc(task::Column::CreatedAt),
            TaskSort::Urgency => {
                query.order_by_with_nulls(task::Column::DueDate, Order::Asc, NullOrdering::Last)
            }
            TaskSort::Updated => query.order_by_desc(task::Column::UpdatedAt),
        }
        .order_by_desc(task::Column::Id)
        .apply_if(filter.limit, |query, limit| query.limit(limit));

        let rows = query
            .find_also_related(location::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(model, location)| task::into_task(model, location))
            .collect())
    }

    async fn count(&self, filter: TaskFilter) -> TaskResult<u64> {
        Ok(Self::filtered(&filter).count(&self.db).await?)
    }

    async fn completed_since(&self, since: DateTime<Utc>) -> TaskResult<Vec<DateTime<Utc>>> {
        let stamps: Vec<sea_orm::prelude::DateTimeWithTimeZone> = task::Entity::find()
            .select_only()
            .column(task::Column::UpdatedAt)
            .filter(task::Column::IsCompleted.eq(true))
            .filter(task::Column::IsDeleted.eq(false))
            .filter(task::Column::UpdatedAt.gte(since.fixed_offset()))
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(stamps.into_iter().map(Into::into).collect())
    }
}

pub struct SqlLocationRepository {
    db: DatabaseConnection,
}

impl SqlLocationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LocationRepository for SqlLocationRepository {
    async fn create(&self, input: NewLocation) -> TaskResult<Location> {
        let model = location::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            address: Set(input.address),
            description: Set(input.description),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(location_id = model.id, name = %model.name, "Created location");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i32) -> TaskResult<Option<Location>> {
        let model = location::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> TaskResult<Option<Location>> {
        let model = location::Entity::find()
            .filter(location::Column::Name.eq(name))
            .order_by_asc(location::Column::Id)
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn list(&self) -> TaskResult<Vec<Location>> {
        let models = location::Entity::find()
            .order_by_asc(location::Column::Name)
            .order_by_asc(location::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
