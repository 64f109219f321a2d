use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::User;

/// The user resolved by `AuthMiddleware` for the current request.
///
/// Only usable on routes wrapped by `AuthMiddleware`. If the middleware did not
/// run, extraction fails with `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn id(&self) -> uuid::Uuid {
        self.0.id
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<User>().cloned() {
            Some(user) => ready(Ok(AuthenticatedUser(user))),
            None => {
                log::warn!("no authenticated user on {}; is AuthMiddleware applied?", req.path());
                ready(Err(AppError::Unauthorized.into()))
            }
        }
    }
}
