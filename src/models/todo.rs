use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A to-do item as stored and as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier for the todo (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Owning user. Fixed at creation.
    pub user_id: Uuid,
    /// Assigned by the store on insert.
    pub created_at: DateTime<Utc>,
}

/// Payload of `POST /api/todos`.
///
/// There is deliberately no owner field: any `userId` in the body is ignored and
/// ownership always comes from the authenticated caller.
#[derive(Debug, Deserialize, Validate)]
pub struct TodoInput {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    pub description: Option<String>,

    pub completed: Option<bool>,
}

/// A todo about to be persisted. The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: Uuid,
}

impl NewTodo {
    /// Binds the input to `owner`, defaulting `completed` to false.
    pub fn new(input: TodoInput, owner: Uuid) -> Self {
        Self {
            title: input.title,
            description: input.description,
            completed: input.completed.unwrap_or(false),
            user_id: owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_todo_takes_owner_from_caller() {
        let input: TodoInput = serde_json::from_value(serde_json::json!({
            "title": "T",
            "userId": Uuid::new_v4(),
        }))
        .unwrap();
        let owner = Uuid::new_v4();

        let todo = NewTodo::new(input, owner);
        assert_eq!(todo.title, "T");
        assert_eq!(todo.user_id, owner);
        assert!(!todo.completed);
        assert!(todo.description.is_none());
    }

    #[test]
    fn test_todo_input_validation() {
        let valid = TodoInput {
            title: "Valid Title".to_string(),
            description: Some("Test Description".to_string()),
            completed: Some(true),
        };
        assert!(valid.validate().is_ok());

        let empty_title = TodoInput {
            title: "".to_string(),
            description: None,
            completed: None,
        };
        assert!(
            empty_title.validate().is_err(),
            "Validation should fail for empty title."
        );

        let long_fields = TodoInput {
            title: "a".repeat(500),
            description: Some("b".repeat(5000)),
            completed: None,
        };
        assert!(
            long_fields.validate().is_ok(),
            "Long titles and descriptions are accepted."
        );
    }

    #[test]
    fn test_todo_wire_format_is_camel_case() {
        let todo = Todo {
            id: Uuid::new_v4(),
            title: "T".into(),
            description: None,
            completed: false,
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["completed"], false);
    }
}
