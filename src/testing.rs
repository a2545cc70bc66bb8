//! In-memory stores for tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    todos::{
        repo::TodoStore,
        repo_types::{NewTodo, StatusCounts, TodoChanges, TodoItem, TodoSlice, TodoStatus},
    },
};

#[derive(Default)]
pub struct MemoryUserStore {
    by_email: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn len(&self) -> usize {
        self.by_email.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> anyhow::Result<Option<User>> {
        let mut rows = self.by_email.lock().unwrap();
        if rows.contains_key(&user.email) {
            return Ok(None);
        }
        let now = OffsetDateTime::now_utc();
        let row = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email.clone(),
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        rows.insert(user.email, row.clone());
        Ok(Some(row))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.by_email.lock().unwrap().get(email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self
            .by_email
            .lock()
            .unwrap()
            .values()
            .find(|u| u.id == id)
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryTodoStore {
    rows: Mutex<HashMap<Uuid, TodoItem>>,
}

impl MemoryTodoStore {
    fn owned(&self, owner_id: Uuid, status: Option<TodoStatus>) -> Vec<TodoItem> {
        let mut items: Vec<TodoItem> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.owner_id == owner_id)
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        items
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn create(&self, todo: NewTodo) -> anyhow::Result<TodoItem> {
        let row = TodoItem {
            id: Uuid::new_v4(),
            owner_id: todo.owner_id,
            title: todo.title,
            description: todo.description,
            status: TodoStatus::Pending,
            due_date: todo.due_date,
            created_at: todo.created_at,
            updated_at: todo.created_at,
        };
        self.rows.lock().unwrap().insert(row.id, row.clone());
        Ok(row)
    }

    async fn find(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<Option<TodoItem>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&id)
            .filter(|t| t.owner_id == owner_id)
            .cloned())
    }

    async fn list(
        &self,
        owner_id: Uuid,
        status: Option<TodoStatus>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<TodoSlice> {
        let all = self.owned(owner_id, status);
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok(TodoSlice { items, total })
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: TodoChanges,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<TodoItem>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.get_mut(&id).filter(|t| t.owner_id == owner_id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(description) = changes.description {
            row.description = Some(description);
        }
        if let Some(status) = changes.status {
            row.status = status;
        }
        if let Some(due) = changes.due_date {
            row.due_date = Some(due);
        }
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let owned = rows.get(&id).is_some_and(|t| t.owner_id == owner_id);
        if owned {
            rows.remove(&id);
        }
        Ok(owned)
    }

    async fn status_counts(&self, owner_id: Uuid) -> anyhow::Result<StatusCounts> {
        Ok(StatusCounts::from_groups(
            self.owned(owner_id, None).into_iter().map(|t| (t.status, 1)),
        ))
    }
}
