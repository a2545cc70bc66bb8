use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, StatusCode},
    routing::{get, patch, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    extract::{ValidJson, ValidQuery},
    state::AppState,
    todos::{
        dto::{
            CreateTodoRequest, ListQuery, TodoPage, TodoStats, TodoView, UpdateStatusRequest,
            UpdateTodoRequest,
        },
        pagination::PageRequest,
        services::TodoService,
    },
};

/// Todo id from the path. Anything that is not a UUID cannot name a todo.
#[derive(Debug)]
pub struct TodoId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound("Todo item"))?;
        Ok(TodoId(id))
    }
}

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos))
        .route("/todos/stats", get(get_stats))
        .route("/todos/:id", get(get_todo))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", post(create_todo))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
        .route("/todos/:id/status", patch(update_status))
}

#[instrument(skip(todos, payload))]
pub async fn create_todo(
    State(todos): State<TodoService>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<CreateTodoRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<TodoView>), AppError> {
    let todo = todos.create(user_id, payload.validated()?).await?;
    let location = format!("/api/todos/{}", todo.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(todo),
    ))
}

#[instrument(skip(todos))]
pub async fn list_todos(
    State(todos): State<TodoService>,
    AuthUser(user_id): AuthUser,
    ValidQuery(q): ValidQuery<ListQuery>,
) -> Result<Json<TodoPage>, AppError> {
    let page = PageRequest::clamped(q.page, q.page_size);
    Ok(Json(todos.list(user_id, page, q.status).await?))
}

#[instrument(skip(todos))]
pub async fn get_todo(
    State(todos): State<TodoService>,
    AuthUser(user_id): AuthUser,
    TodoId(id): TodoId,
) -> Result<Json<TodoView>, AppError> {
    Ok(Json(todos.get(user_id, id).await?))
}

#[instrument(skip(todos, payload))]
pub async fn update_todo(
    State(todos): State<TodoService>,
    AuthUser(user_id): AuthUser,
    TodoId(id): TodoId,
    ValidJson(payload): ValidJson<UpdateTodoRequest>,
) -> Result<Json<TodoView>, AppError> {
    let changes = payload.into_changes()?;
    Ok(Json(todos.update(user_id, id, changes).await?))
}

#[instrument(skip(todos))]
pub async fn update_status(
    State(todos): State<TodoService>,
    AuthUser(user_id): AuthUser,
    TodoId(id): TodoId,
    ValidJson(payload): ValidJson<UpdateStatusRequest>,
) -> Result<Json<TodoView>, AppError> {
    Ok(Json(todos.update_status(user_id, id, payload.status).await?))
}

#[instrument(skip(todos))]
pub async fn delete_todo(
    State(todos): State<TodoService>,
    AuthUser(user_id): AuthUser,
    TodoId(id): TodoId,
) -> Result<StatusCode, AppError> {
    todos.delete(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(todos))]
pub async fn get_stats(
    State(todos): State<TodoService>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TodoStats>, AppError> {
    Ok(Json(todos.stats(user_id).await?))
}
