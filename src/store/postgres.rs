//! PostgreSQL adapters built on `sqlx`. Schema lives in `migrations/`.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{CredentialStore, StoreError, TaskStore, DUPLICATE_EMAIL, TITLE_REQUIRED};
use crate::models::{NewTodo, NewUser, Todo, User};
use crate::query::{like_pattern, TodoFilter, TodoQuery};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";
const TODO_COLUMNS: &str = "id, title, description, completed, user_id, created_at";

/// Maps driver errors onto the store taxonomy. Constraint violations become
/// client-facing messages; everything else stays a backend failure.
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        if let Some(db_error) = error.as_database_error() {
            if db_error.is_unique_violation() {
                return StoreError::Conflict(DUPLICATE_EMAIL.into());
            }
            if db_error.is_check_violation() {
                return StoreError::Validation(TITLE_REQUIRED.into());
            }
        }
        StoreError::Backend(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(user.name)
            .bind(user.email)
            .bind(user.password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the `WHERE` clause for `filter`. The owner condition is unconditional.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TodoFilter) {
    builder.push(" WHERE user_id = ");
    builder.push_bind(filter.owner);
    if let Some(term) = &filter.title_contains {
        builder.push(" AND title ILIKE ");
        builder.push_bind(like_pattern(term));
    }
}

/// Builds the page query: filter, then `ORDER BY`, then `OFFSET`, then `LIMIT`.
/// Sort columns come from a closed enum and are never taken from user input.
fn build_page_query(query: &TodoQuery) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM todos", TODO_COLUMNS));
    push_filter(&mut builder, &query.filter);

    let order_by: Vec<String> = query
        .sort
        .keys()
        .iter()
        .map(|key| format!("{} {}", key.field.column(), key.direction.keyword()))
        .collect();
    if !order_by.is_empty() {
        builder.push(" ORDER BY ");
        builder.push(order_by.join(", "));
    }

    builder.push(" OFFSET ");
    builder.push_bind(i64::try_from(query.skip).unwrap_or(i64::MAX));
    builder.push(" LIMIT ");
    builder.push_bind(i64::try_from(query.limit).unwrap_or(i64::MAX));
    builder
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let sql = format!(
            "INSERT INTO todos (id, title, description, completed, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(Uuid::new_v4())
            .bind(todo.title)
            .bind(todo.description)
            .bind(todo.completed)
            .bind(todo.user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn find_by_id(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, StoreError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE id = $1 AND user_id = $2",
            TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn query(&self, query: &TodoQuery) -> Result<Vec<Todo>, StoreError> {
        let mut builder = build_page_query(query);
        let todos = builder
            .build_query_as::<Todo>()
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }

    async fn count(&self, filter: &TodoFilter) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM todos");
        push_filter(&mut builder, filter);
        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
