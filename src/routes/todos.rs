use crate::{
    auth::{authorize_owner_str, AuthenticatedUser},
    error::AppError,
    models::{NewTodo, Todo, TodoInput},
    query::{ListTodosParams, TodoQuery},
    state::AppState,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

pub const TODO_NOT_FOUND: &str = "Todo not found";

/// One page of a todo listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoPage {
    /// Total number of matching todos, ignoring `skip` and `limit`.
    pub count: u64,
    /// The requested page.
    pub todos: Vec<Todo>,
}

async fn list_page(
    state: &AppState,
    owner: Uuid,
    params: &ListTodosParams,
) -> Result<TodoPage, AppError> {
    let query = TodoQuery::from_params(owner, params)?;
    let count = state.todos.count(&query.filter).await?;
    let todos = state.todos.query(&query).await?;
    Ok(TodoPage { count, todos })
}

/// Lists the authenticated user's todos.
///
/// ## Query Parameters:
/// - `skip` (default 0) and `limit` (default 10): non-numeric values fall back to
///   the default, negative values are clamped to 0.
/// - `sort` (default `-createdAt`): keys over `createdAt`, `title`, `completed`,
///   `-` prefix for descending.
/// - `search`: case-insensitive substring of the title.
///
/// ## Responses:
/// - `200 OK`: `{"count": <total>, "todos": [...]}`
/// - `400 Bad Request`: invalid `sort`.
/// - `401 Unauthorized`: no valid bearer token.
#[get("")]
pub async fn list_todos(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query_params: web::Query<ListTodosParams>,
) -> Result<impl Responder, AppError> {
    let page = list_page(&state, user.id(), &query_params).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Lists the todos of the user named in the path, which must be the caller.
///
/// ## Responses:
/// - `200 OK`: same body as `GET /api/todos`.
/// - `403 Forbidden`: the path names another user.
#[get("")]
pub async fn list_user_todos(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    user_id: web::Path<String>,
    query_params: web::Query<ListTodosParams>,
) -> Result<impl Responder, AppError> {
    authorize_owner_str(user.id(), &user_id)?;

    let page = list_page(&state, user.id(), &query_params).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Creates a todo owned by the authenticated user.
///
/// Ownership always comes from the token; an owner id in the body is ignored.
///
/// ## Responses:
/// - `201 Created`: `{"message": "Todo created"}`
/// - `400 Bad Request`: missing or empty title.
#[post("")]
pub async fn create_todo(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    todo_data: web::Json<TodoInput>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let todo = state
        .todos
        .insert(NewTodo::new(todo_data.into_inner(), user.id()))
        .await?;
    log::debug!("user {} created todo {}", user.id(), todo.id);

    Ok(HttpResponse::Created().json(json!({ "message": "Todo created" })))
}

/// Fetches one of the caller's todos.
///
/// A todo owned by someone else, an unknown id and a malformed id all give the
/// same 404.
#[get("/{id}")]
pub async fn get_todo(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    todo_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let not_found = || AppError::NotFound(TODO_NOT_FOUND.into());

    let id = Uuid::parse_str(&todo_id).map_err(|_| not_found())?;
    let todo = state
        .todos
        .find_by_id(id, user.id())
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(json!({ "todo": todo })))
}
