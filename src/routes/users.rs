use crate::{
    error::AppError,
    models::{LoginRequest, LoginResponse, NewUser, RegisterRequest},
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Hashes the password and stores the account. A duplicate email surfaces the
/// store's message as a 400.
///
/// ## Responses:
/// - `201 Created`: `{"message": "User created"}`
/// - `400 Bad Request`: missing or empty fields, or email already registered.
#[post("/users")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest {
        name,
        email,
        password,
    } = register_data.into_inner();

    let hasher = state.passwords;
    let password_hash = web::block(move || hasher.hash(&password)).await??;

    let user = state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
        })
        .await?;
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(json!({ "message": "User created" })))
}

/// Login user
///
/// Unknown email and wrong password produce the same response.
///
/// ## Responses:
/// - `200 OK`: `{"token": "..."}`, valid for one hour.
/// - `400 Bad Request`: `{"error": "Invalid email or password"}`
#[post("/users/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let LoginRequest { email, password } = login_data.into_inner();

    let user = match state.users.find_by_email(&email).await? {
        Some(user) => user,
        None => {
            log::debug!("login failed: no user for email");
            return Err(AppError::InvalidCredentials);
        }
    };

    let hasher = state.passwords;
    let digest = user.password_hash.clone();
    let matched = web::block(move || hasher.verify(&password, &digest)).await??;
    if !matched {
        log::debug!("login failed: wrong password for user {}", user.id);
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id)?;
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}
