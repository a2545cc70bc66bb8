use std::sync::Arc;

use axum::extract::FromRef;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    error::AppError,
    state::AppState,
    todos::{
        dto::{CreateTodoRequest, TodoPage, TodoStats, TodoView},
        pagination::PageRequest,
        repo::TodoStore,
        repo_types::{NewTodo, TodoChanges, TodoStatus},
    },
};

const NOT_FOUND: AppError = AppError::NotFound("Todo item");

/// Owner-scoped todo operations. `owner_id` always comes from the verified
/// token, never from the request body.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl FromRef<AppState> for TodoService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.todos.clone())
    }
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, req))]
    pub async fn create(
        &self,
        owner_id: Uuid,
        req: CreateTodoRequest,
    ) -> Result<TodoView, AppError> {
        let todo = self
            .store
            .create(NewTodo {
                owner_id,
                title: req.title,
                description: req.description,
                due_date: req.due_date,
                created_at: OffsetDateTime::now_utc(),
            })
            .await?;
        info!(todo_id = %todo.id, "todo created");
        Ok(todo.into())
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        owner_id: Uuid,
        page: PageRequest,
        status: Option<TodoStatus>,
    ) -> Result<TodoPage, AppError> {
        let slice = self
            .store
            .list(owner_id, status, page.limit(), page.offset())
            .await?;
        debug!(total = slice.total, returned = slice.items.len(), "todos listed");
        Ok(TodoPage {
            items: slice.items.into_iter().map(TodoView::from).collect(),
            total_count: slice.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages(slice.total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<TodoView, AppError> {
        self.store
            .find(owner_id, id)
            .await?
            .map(TodoView::from)
            .ok_or(NOT_FOUND)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: TodoChanges,
    ) -> Result<TodoView, AppError> {
        let todo = self
            .store
            .update(owner_id, id, changes, OffsetDateTime::now_utc())
            .await?
            .ok_or(NOT_FOUND)?;
        info!(todo_id = %todo.id, status = ?todo.status, "todo updated");
        Ok(todo.into())
    }

    pub async fn update_status(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: TodoStatus,
    ) -> Result<TodoView, AppError> {
        let changes = TodoChanges {
            status: Some(status),
            ..Default::default()
        };
        self.update(owner_id, id, changes).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete(owner_id, id).await? {
            return Err(NOT_FOUND);
        }
        info!(todo_id = %id, "todo deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn stats(&self, owner_id: Uuid) -> Result<TodoStats, AppError> {
        Ok(self.store.status_counts(owner_id).await?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryTodoStore;
    use std::time::Duration;

    fn service() -> TodoService {
        TodoService::new(Arc::new(MemoryTodoStore::default()))
    }

    fn new_todo(title: &str) -> CreateTodoRequest {
        CreateTodoRequest {
            title: title.into(),
            description: None,
            due_date: None,
        }
    }

    async fn seed(svc: &TodoService, owner: Uuid, n: usize) -> Vec<TodoView> {
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            out.push(svc.create(owner, new_todo(&format!("todo {i}"))).await.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn create_starts_pending_with_equal_timestamps() {
        let svc = service();
        let owner = Uuid::new_v4();
        let due = OffsetDateTime::now_utc() - time::Duration::days(3);
        let todo = svc
            .create(
                owner,
                CreateTodoRequest {
                    title: "write report".into(),
                    description: Some("quarterly".into()),
                    due_date: Some(due),
                },
            )
            .await
            .unwrap();
        assert_eq!(todo.status, TodoStatus::Pending);
        assert_eq!(todo.created_at, todo.updated_at);
        assert_eq!(todo.owner_id, owner);
        // Due dates in the past are accepted.
        assert_eq!(todo.due_date, Some(due));
    }

    #[tokio::test]
    async fn other_owner_sees_not_found() {
        let svc = service();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let item = svc.create(bob, new_todo("bob's")).await.unwrap();

        assert!(matches!(svc.get(alice, item.id).await, Err(AppError::NotFound(_))));
        let changes = TodoChanges {
            title: Some("hijacked".into()),
            ..Default::default()
        };
        assert!(matches!(
            svc.update(alice, item.id, changes).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.update_status(alice, item.id, TodoStatus::Done).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(svc.delete(alice, item.id).await, Err(AppError::NotFound(_))));

        // Same error as a genuinely absent id.
        let missing = svc.get(alice, Uuid::new_v4()).await.unwrap_err();
        let foreign = svc.get(alice, item.id).await.unwrap_err();
        assert_eq!(missing.public_message(), foreign.public_message());

        let untouched = svc.get(bob, item.id).await.unwrap();
        assert_eq!(untouched.title, "bob's");
        assert_eq!(untouched.status, TodoStatus::Pending);
    }

    #[tokio::test]
    async fn pages_cover_whole_filtered_set() {
        let svc = service();
        let owner = Uuid::new_v4();
        seed(&svc, owner, 23).await;
        seed(&svc, Uuid::new_v4(), 5).await;

        for size in [1, 2, 5, 10, 23, 50] {
            let first = svc
                .list(owner, PageRequest::clamped(Some(1), Some(size)), None)
                .await
                .unwrap();
            assert_eq!(first.total_count, 23);
            assert_eq!(first.total_pages, (23 + size - 1) / size);

            let mut seen = 0;
            for page in 1..=first.total_pages {
                let p = svc
                    .list(owner, PageRequest::clamped(Some(page), Some(size)), None)
                    .await
                    .unwrap();
                assert!(p.items.iter().all(|t| t.owner_id == owner));
                seen += p.items.len();
            }
            assert_eq!(seen, 23);
        }
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let svc = service();
        let owner = Uuid::new_v4();
        let items = seed(&svc, owner, 5).await;
        svc.update_status(owner, items[0].id, TodoStatus::Done).await.unwrap();
        svc.update_status(owner, items[1].id, TodoStatus::Done).await.unwrap();
        svc.update_status(owner, items[2].id, TodoStatus::InProgress).await.unwrap();

        let done = svc
            .list(owner, PageRequest::default(), Some(TodoStatus::Done))
            .await
            .unwrap();
        assert_eq!(done.total_count, 2);
        assert!(done.items.iter().all(|t| t.status == TodoStatus::Done));
    }

    #[tokio::test]
    async fn out_of_range_page_size_uses_default() {
        let svc = service();
        let owner = Uuid::new_v4();
        seed(&svc, owner, 15).await;

        for size in [0, 1000] {
            let page = svc
                .list(owner, PageRequest::clamped(Some(1), Some(size)), None)
                .await
                .unwrap();
            assert_eq!(page.page_size, 10);
            assert_eq!(page.items.len(), 10);
            assert_eq!(page.total_pages, 2);
        }

        let page = svc
            .list(owner, PageRequest::clamped(Some(0), None), None)
            .await
            .unwrap();
        assert_eq!(page.page, 1);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let svc = service();
        let owner = Uuid::new_v4();
        seed(&svc, owner, 3).await;
        let page = svc
            .list(owner, PageRequest::clamped(Some(9), Some(2)), None)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn description_update_leaves_other_fields() {
        let svc = service();
        let owner = Uuid::new_v4();
        let due = OffsetDateTime::now_utc() + time::Duration::days(1);
        let created = svc
            .create(
                owner,
                CreateTodoRequest {
                    title: "original".into(),
                    description: Some("old".into()),
                    due_date: Some(due),
                },
            )
            .await
            .unwrap();
        svc.update_status(owner, created.id, TodoStatus::InProgress)
            .await
            .unwrap();
        let before = svc.get(owner, created.id).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let changes = TodoChanges {
            description: Some("new".into()),
            ..Default::default()
        };
        let after = svc.update(owner, created.id, changes).await.unwrap();

        assert_eq!(after.title, "original");
        assert_eq!(after.status, TodoStatus::InProgress);
        assert_eq!(after.due_date, Some(due));
        assert_eq!(after.description.as_deref(), Some("new"));
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn empty_update_still_touches_updated_at() {
        let svc = service();
        let owner = Uuid::new_v4();
        let created = svc.create(owner, new_todo("t")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let after = svc
            .update(owner, created.id, TodoChanges::default())
            .await
            .unwrap();
        assert!(after.updated_at > created.updated_at);
        assert_eq!(after.title, created.title);
    }

    #[tokio::test]
    async fn every_status_transition_is_allowed() {
        let svc = service();
        let owner = Uuid::new_v4();
        let item = svc.create(owner, new_todo("t")).await.unwrap();
        let all = [TodoStatus::Pending, TodoStatus::InProgress, TodoStatus::Done];
        for from in all {
            for to in all {
                if from == to {
                    continue;
                }
                svc.update_status(owner, item.id, from).await.unwrap();
                let v = svc.update_status(owner, item.id, to).await.unwrap();
                assert_eq!(v.status, to);
            }
        }
    }

    #[tokio::test]
    async fn delete_removes_item_once() {
        let svc = service();
        let owner = Uuid::new_v4();
        let item = svc.create(owner, new_todo("t")).await.unwrap();
        svc.delete(owner, item.id).await.unwrap();
        assert!(matches!(svc.get(owner, item.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.delete(owner, item.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn stats_counts_sum_to_total() {
        let svc = service();
        let owner = Uuid::new_v4();
        let items = seed(&svc, owner, 6).await;
        seed(&svc, Uuid::new_v4(), 4).await;
        svc.update_status(owner, items[0].id, TodoStatus::InProgress).await.unwrap();
        svc.update_status(owner, items[1].id, TodoStatus::Done).await.unwrap();
        svc.update_status(owner, items[2].id, TodoStatus::Done).await.unwrap();

        let stats = svc.stats(owner).await.unwrap();
        assert_eq!(
            stats,
            TodoStats {
                total: 6,
                pending: 3,
                in_progress: 1,
                done: 2
            }
        );
        assert_eq!(stats.pending + stats.in_progress + stats.done, stats.total);

        let empty = svc.stats(Uuid::new_v4()).await.unwrap();
        assert_eq!(empty.total, 0);
    }
}
