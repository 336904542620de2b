use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    Error, HttpMessage, HttpResponse,
};
use error_types::{error_codes, error_types as kinds, ErrorResponse};
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use uuid::Uuid;

/// Identity id extracted from a validated bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

fn unauthorized(message: &str, code: &str) -> Error {
    let body = ErrorResponse::for_status(401, message, kinds::AUTHENTICATION_ERROR, code);
    InternalError::from_response(message.to_string(), HttpResponse::Unauthorized().json(body))
        .into()
}

/// JWT Authentication Middleware
///
/// Requests without an `Authorization` header pass through untouched so that
/// public routes (login, register, contact, health) share the same app.
/// A header that is present but malformed, forged or expired is rejected
/// with 401 before reaching any handler. Handlers that need a caller
/// extract [`UserId`], which fails with 401 when no token was presented.
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let Some(auth_header) = req.headers().get("Authorization") else {
                return service.call(req).await;
            };

            let token = auth_header
                .to_str()
                .ok()
                .and_then(|h| h.strip_prefix("Bearer "))
                .ok_or_else(|| {
                    unauthorized(
                        "Invalid Authorization header format",
                        error_codes::TOKEN_INVALID,
                    )
                })?;

            let token_data = crypto_core::jwt::validate_token(token).map_err(|e| {
                tracing::warn!(error = %e, "JWT validation failed");
                unauthorized("Invalid or expired token", error_codes::TOKEN_INVALID)
            })?;

            let user_id = token_data.claims.user_id().map_err(|e| {
                tracing::warn!(error = %e, "Token subject is not a UUID");
                unauthorized("Invalid token: malformed subject", error_codes::TOKEN_INVALID)
            })?;

            req.extensions_mut().insert(UserId(user_id));

            service.call(req).await
        })
    }
}
