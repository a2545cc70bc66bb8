use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::todos::repo_types::{NewTodo, StatusCounts, TodoChanges, TodoItem, TodoSlice, TodoStatus};

/// Persistence for todos. Every lookup is keyed by `(owner_id, id)`.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create(&self, todo: NewTodo) -> anyhow::Result<TodoItem>;
    async fn find(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<Option<TodoItem>>;
    /// Newest first, ties broken by id descending.
    async fn list(
        &self,
        owner_id: Uuid,
        status: Option<TodoStatus>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<TodoSlice>;
    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: TodoChanges,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<TodoItem>>;
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
    async fn status_counts(&self, owner_id: Uuid) -> anyhow::Result<StatusCounts>;
}

#[derive(Clone)]
pub struct PgTodoStore {
    db: PgPool,
}

impl PgTodoStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn create(&self, todo: NewTodo) -> anyhow::Result<TodoItem> {
        let row = sqlx::query_as::<_, TodoItem>(
            r#"
            INSERT INTO todo_items
                (id, owner_id, title, description, status, due_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, owner_id, title, description, status, due_date, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(todo.owner_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(TodoStatus::Pending)
        .bind(todo.due_date)
        .bind(todo.created_at)
        .fetch_one(&self.db)
        .await
        .context("insert todo")?;
        Ok(row)
    }

    async fn find(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<Option<TodoItem>> {
        let row = sqlx::query_as::<_, TodoItem>(
            r#"
            SELECT id, owner_id, title, description, status, due_date, created_at, updated_at
              FROM todo_items
             WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await
        .context("find todo")?;
        Ok(row)
    }

    async fn list(
        &self,
        owner_id: Uuid,
        status: Option<TodoStatus>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<TodoSlice> {
        // Count and page come from one snapshot.
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .context("set isolation")?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
              FROM todo_items
             WHERE owner_id = $1 AND ($2::INTEGER IS NULL OR status = $2)
            "#,
        )
        .bind(owner_id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await
        .context("count todos")?;

        let items = sqlx::query_as::<_, TodoItem>(
            r#"
            SELECT id, owner_id, title, description, status, due_date, created_at, updated_at
              FROM todo_items
             WHERE owner_id = $1 AND ($2::INTEGER IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await
        .context("list todos")?;

        tx.commit().await.context("commit tx")?;
        Ok(TodoSlice { items, total })
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: TodoChanges,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<TodoItem>> {
        let row = sqlx::query_as::<_, TodoItem>(
            r#"
            UPDATE todo_items
               SET title       = COALESCE($3, title),
                   description = COALESCE($4, description),
                   status      = COALESCE($5, status),
                   due_date    = COALESCE($6, due_date),
                   updated_at  = $7
             WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, description, status, due_date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.status)
        .bind(changes.due_date)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .context("update todo")?;
        Ok(row)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM todo_items WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.db)
            .await
            .context("delete todo")?;
        Ok(res.rows_affected() > 0)
    }

    async fn status_counts(&self, owner_id: Uuid) -> anyhow::Result<StatusCounts> {
        let groups = sqlx::query_as::<_, (TodoStatus, i64)>(
            r#"
            SELECT status, COUNT(*)
              FROM todo_items
             WHERE owner_id = $1
             GROUP BY status
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await
        .context("count todos by status")?;
        Ok(StatusCounts::from_groups(groups))
    }
}
