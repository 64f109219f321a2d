pub mod health;
pub mod todos;
pub mod users;

use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::{auth::AuthMiddleware, error::AppError};

/// Registers every route plus the extractor configuration that keeps error
/// bodies in the `{"error": ...}` shape.
///
/// Expects `web::Data<AppState>` to be registered on the `App`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(health::health)
        .service(
            web::scope("/api")
                .service(users::register)
                .service(users::login)
                .service(
                    web::scope("/users/{user_id}/todos")
                        .wrap(AuthMiddleware)
                        .service(todos::list_user_todos),
                )
                .service(
                    web::scope("/todos")
                        .wrap(AuthMiddleware)
                        .service(todos::list_todos)
                        .service(todos::create_todo)
                        .service(todos::get_todo),
                ),
        )
        .default_service(web::to(not_found));
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        let message = match &err {
            JsonPayloadError::Deserialize(inner) => inner.to_string(),
            other => other.to_string(),
        };
        AppError::BadRequest(message).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::BadRequest(err.to_string()).into())
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": "Not found" }))
}
