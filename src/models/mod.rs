pub mod todo;
pub mod user;

pub use todo::{NewTodo, Todo, TodoInput};
pub use user::{LoginRequest, LoginResponse, NewUser, RegisterRequest, User};
