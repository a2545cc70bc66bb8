use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::AppError,
    todos::repo_types::{StatusCounts, TodoChanges, TodoItem, TodoStatus},
};

pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option", alias = "dueDate")]
    pub due_date: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TodoStatus>,
    #[serde(default, with = "time::serde::rfc3339::option", alias = "dueDate")]
    pub due_date: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TodoStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<i64>,
    pub status: Option<TodoStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodoView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    pub owner_id: Uuid,
}

impl From<TodoItem> for TodoView {
    fn from(t: TodoItem) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            status: t.status,
            created_at: t.created_at,
            updated_at: t.updated_at,
            due_date: t.due_date,
            owner_id: t.owner_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TodoPage {
    pub items: Vec<TodoView>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TodoStats {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub done: i64,
}

impl From<StatusCounts> for TodoStats {
    fn from(c: StatusCounts) -> Self {
        Self {
            total: c.total(),
            pending: c.pending,
            in_progress: c.in_progress,
            done: c.done,
        }
    }
}

fn check_title(title: String) -> Result<String, AppError> {
    let title = title.trim().to_string();
    let len = title.chars().count();
    if len == 0 || len > TITLE_MAX {
        return Err(AppError::Validation(format!(
            "Title must be between 1 and {TITLE_MAX} characters"
        )));
    }
    Ok(title)
}

fn check_description(description: Option<String>) -> Result<Option<String>, AppError> {
    if let Some(d) = &description {
        if d.chars().count() > DESCRIPTION_MAX {
            return Err(AppError::Validation(format!(
                "Description must be at most {DESCRIPTION_MAX} characters"
            )));
        }
    }
    Ok(description)
}

impl CreateTodoRequest {
    pub fn validated(self) -> Result<Self, AppError> {
        Ok(Self {
            title: check_title(self.title)?,
            description: check_description(self.description)?,
            due_date: self.due_date,
        })
    }
}

impl UpdateTodoRequest {
    pub fn into_changes(self) -> Result<TodoChanges, AppError> {
        Ok(TodoChanges {
            title: self.title.map(check_title).transpose()?,
            description: check_description(self.description)?,
            status: self.status,
            due_date: self.due_date,
        })
    }
}
