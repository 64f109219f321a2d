#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Authenticated personal to-do API: registration and login, bearer-token"]
#![doc = "authentication, and owner-scoped todo creation, lookup and paginated listing."]
#![doc = "The binary (`main.rs`) builds the stores from `Config` and serves `routes::config`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
