use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

/// Health check endpoint
///
/// Probes the credential store with a lookup that can never match, so a
/// reachable backend answers 200 and an unreachable one 503.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    match state.users.find_by_id(Uuid::nil()).await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "timestamp": Utc::now()
        })),
        Err(err) => {
            log::warn!("health check failed: {}", err);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unavailable",
                "timestamp": Utc::now()
            }))
        }
    }
}
