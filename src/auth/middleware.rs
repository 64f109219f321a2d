//! Bearer-token authentication for the todo routes.
//!
//! Each request moves through
//! `NoToken -> TokenExtracted -> TokenVerified -> UserResolved -> Authenticated`.
//! Any failing step ends the request with 401 `{"error": "Authentication failed"}`;
//! the specific [`AuthRejection`] is only logged. On success the resolved
//! [`User`](crate::models::User) is stored in the request extensions, where
//! [`AuthenticatedUser`](super::AuthenticatedUser) picks it up.

use std::fmt;
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderValue},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use uuid::Uuid;

use crate::auth::token::InvalidToken;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;
use crate::store::StoreError;

/// Why a request was not authenticated.
#[derive(Debug)]
pub enum AuthRejection {
    /// No `Authorization` header.
    MissingHeader,
    /// Header present but not of the form `Bearer <token>`.
    MalformedHeader,
    /// Signature, format or expiry check failed.
    InvalidToken(InvalidToken),
    /// Token is valid but names a user that does not exist.
    UnknownUser(Uuid),
    /// The credential store could not be queried.
    Store(StoreError),
    /// `AppState` was not registered on the app.
    MissingState,
}

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthRejection::MissingHeader => write!(f, "missing authorization header"),
            AuthRejection::MalformedHeader => write!(f, "malformed authorization header"),
            AuthRejection::InvalidToken(err) => write!(f, "{}", err),
            AuthRejection::UnknownUser(id) => write!(f, "token subject {} not found", id),
            AuthRejection::Store(err) => write!(f, "{}", err),
            AuthRejection::MissingState => write!(f, "application state not configured"),
        }
    }
}

impl From<AuthRejection> for AppError {
    fn from(rejection: AuthRejection) -> AppError {
        match rejection {
            AuthRejection::Store(StoreError::Backend(msg)) => AppError::InternalServerError(msg),
            AuthRejection::MissingState => {
                AppError::InternalServerError(AuthRejection::MissingState.to_string())
            }
            _ => AppError::Unauthorized,
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(value: Option<&HeaderValue>) -> Result<&str, AuthRejection> {
    let value = value.ok_or(AuthRejection::MissingHeader)?;
    let token = value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthRejection::MalformedHeader)?;
    if token.is_empty() || token.contains(' ') {
        return Err(AuthRejection::MalformedHeader);
    }
    Ok(token)
}

/// Runs the full authentication sequence for `req`.
pub async fn authenticate(req: &ServiceRequest) -> Result<User, AuthRejection> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or(AuthRejection::MissingState)?;

    let token = bearer_token(req.headers().get(header::AUTHORIZATION))?;
    let owner_id = state.tokens.verify(token).map_err(AuthRejection::InvalidToken)?;

    match state.users.find_by_id(owner_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(AuthRejection::UnknownUser(owner_id)),
        Err(err) => Err(AuthRejection::Store(err)),
    }
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            match authenticate(&req).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(rejection) => {
                    log::debug!("rejected {} {}: {}", req.method(), req.path(), rejection);
                    let response = AppError::from(rejection).error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PasswordHasher, TokenService};
    use crate::models::NewUser;
    use actix_web::{test as actix_test, App, HttpResponse};

    #[test]
    fn test_bearer_token_parsing() {
        let value = HeaderValue::from_static("Bearer abc.def.ghi");
        assert_eq!(bearer_token(Some(&value)).unwrap(), "abc.def.ghi");

        assert!(matches!(bearer_token(None), Err(AuthRejection::MissingHeader)));
        for garbled in [
            "abc.def.ghi",
            "Basic dXNlcjpwYXNz",
            "Bearer ",
            "Bearer a b",
            "bearer x",
            "Bearer  x",
            "Bearer x ",
        ] {
            let value = HeaderValue::from_static(garbled);
            assert!(
                matches!(bearer_token(Some(&value)), Err(AuthRejection::MalformedHeader)),
                "accepted {:?}",
                garbled
            );
        }
    }

    #[test]
    fn test_rejections_collapse_to_unauthorized() {
        for rejection in [
            AuthRejection::MissingHeader,
            AuthRejection::MalformedHeader,
            AuthRejection::InvalidToken(InvalidToken("ExpiredSignature".into())),
            AuthRejection::UnknownUser(Uuid::new_v4()),
        ] {
            assert!(matches!(AppError::from(rejection), AppError::Unauthorized));
        }
        assert!(matches!(
            AppError::from(AuthRejection::Store(StoreError::Backend("down".into()))),
            AppError::InternalServerError(_)
        ));
    }

    #[actix_rt::test]
    async fn test_middleware_attaches_user() {
        let state = web::Data::new(AppState::in_memory(
            TokenService::new("middleware-secret"),
            PasswordHasher::new(4),
        ));
        let user = state
            .users
            .create(NewUser {
                name: "A".into(),
                email: "a@x.com".into(),
                password_hash: "digest".into(),
            })
            .await
            .unwrap();
        let token = state.tokens.issue(user.id).unwrap();

        let app = actix_test::init_service(
            App::new().app_data(state.clone()).service(
                web::resource("/whoami")
                    .wrap(AuthMiddleware)
                    .to(|req: actix_web::HttpRequest| async move {
                        let email = req.extensions().get::<User>().map(|u| u.email.clone());
                        HttpResponse::Ok().body(email.unwrap_or_default())
                    }),
            ),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(actix_test::read_body(resp).await, "a@x.com");

        // A valid token for a user that no longer resolves is still rejected.
        let stranger = state.tokens.issue(Uuid::new_v4()).unwrap();
        let req = actix_test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", stranger)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "Authentication failed");
    }
}
