//! Persistence ports.
//!
//! Handlers only see these traits. `postgres` provides the production adapters;
//! `memory` keeps everything in process and backs the test suite.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::models::{NewTodo, NewUser, Todo, User};
use crate::query::{TodoFilter, TodoQuery};

pub use memory::{InMemoryCredentialStore, InMemoryTaskStore};
pub use postgres::{PgCredentialStore, PgTaskStore};

pub const DUPLICATE_EMAIL: &str = "Email already registered";
pub const TITLE_REQUIRED: &str = "title is required";

/// Failures reported by a store adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    Conflict(String),
    /// The record violates a constraint enforced by the store itself.
    Validation(String),
    /// Connectivity or query failure.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Conflict(msg) => write!(f, "conflict: {}", msg),
            StoreError::Validation(msg) => write!(f, "validation failed: {}", msg),
            StoreError::Backend(msg) => write!(f, "store failure: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Persists user accounts.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a new user. Fails with `Conflict` if the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

/// Persists todos, always scoped by owner on reads.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a todo. Fails with `Validation` if the title is empty.
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError>;

    /// Returns the todo only if it exists and belongs to `owner`.
    async fn find_by_id(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, StoreError>;

    /// Matching todos, sorted, then skipped, then limited.
    async fn query(&self, query: &TodoQuery) -> Result<Vec<Todo>, StoreError>;

    /// Number of todos matching `filter`, ignoring pagination.
    async fn count(&self, filter: &TodoFilter) -> Result<u64, StoreError>;
}
