//! In-process store adapters.
//!
//! They honour the same constraints as the PostgreSQL schema (unique email,
//! non-empty title) so handlers behave identically on either backend.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, StoreError, TaskStore, DUPLICATE_EMAIL, TITLE_REQUIRED};
use crate::models::{NewTodo, NewUser, Todo, User};
use crate::query::{SortDirection, SortField, TodoFilter, TodoQuery};

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict(DUPLICATE_EMAIL.into()));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }
}

#[derive(Debug, Default)]
struct TaskTable {
    todos: Vec<Todo>,
    last_created_at: Option<DateTime<Utc>>,
}

impl TaskTable {
    /// Strictly increasing creation time, even for inserts within the same tick.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created_at = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(created_at);
        created_at
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    table: RwLock<TaskTable>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(todo: &Todo, filter: &TodoFilter) -> bool {
    if todo.user_id != filter.owner {
        return false;
    }
    match &filter.title_contains {
        Some(term) => todo.title.to_lowercase().contains(&term.to_lowercase()),
        None => true,
    }
}

/// Titles compare case-folded first, then by raw bytes, close to what a
/// PostgreSQL collation gives.
fn compare(a: &Todo, b: &Todo, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Title => a
            .title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title)),
        SortField::Completed => a.completed.cmp(&b.completed),
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        if todo.title.trim().is_empty() {
            return Err(StoreError::Validation(TITLE_REQUIRED.into()));
        }
        let mut table = self.table.write().await;
        let todo = Todo {
            id: Uuid::new_v4(),
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            user_id: todo.user_id,
            created_at: table.next_created_at(),
        };
        table.todos.push(todo.clone());
        Ok(todo)
    }

    async fn find_by_id(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .todos
            .iter()
            .find(|todo| todo.id == id && todo.user_id == owner)
            .cloned())
    }

    async fn query(&self, query: &TodoQuery) -> Result<Vec<Todo>, StoreError> {
        let table = self.table.read().await;
        let mut selected: Vec<Todo> = table
            .todos
            .iter()
            .filter(|todo| matches(todo, &query.filter))
            .cloned()
            .collect();
        drop(table);

        selected.sort_by(|a, b| {
            query
                .sort
                .keys()
                .iter()
                .map(|key| {
                    let ordering = compare(a, b, key.field);
                    match key.direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        Ok(selected.into_iter().skip(skip).take(limit).collect())
    }

    async fn count(&self, filter: &TodoFilter) -> Result<u64, StoreError> {
        let table = self.table.read().await;
        Ok(table.todos.iter().filter(|todo| matches(todo, filter)).count() as u64)
    }
}
