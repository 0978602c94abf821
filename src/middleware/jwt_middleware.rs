/// Authenticated Request Gate
///
/// Validates bearer tokens from the Authorization header and hands the
/// resulting claims to route handlers as a typed `web::ReqData<UserClaims>`
/// parameter. Admin-gated routes additionally require the admin flag.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{TokenMaker, UserClaims};
use crate::error::{AppError, AuthError};

/// Extract and verify the bearer token of a request.
///
/// This is the sole mechanism by which downstream handlers learn who is
/// calling.
fn verify_claims_from_header(
    req: &ServiceRequest,
    token_maker: &TokenMaker,
) -> Result<UserClaims, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Auth(AuthError::MissingToken))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Auth(AuthError::TokenInvalid))?;

    token_maker.verify_token(token)
}

/// JWT middleware for protecting routes
///
/// `JwtMiddleware::new` gates on a valid access token; `JwtMiddleware::admin`
/// additionally requires the admin claim.
pub struct JwtMiddleware {
    token_maker: TokenMaker,
    require_admin: bool,
}

impl JwtMiddleware {
    pub fn new(token_maker: TokenMaker) -> Self {
        Self {
            token_maker,
            require_admin: false,
        }
    }

    pub fn admin(token_maker: TokenMaker) -> Self {
        Self {
            token_maker,
            require_admin: true,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            token_maker: self.token_maker.clone(),
            require_admin: self.require_admin,
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    token_maker: TokenMaker,
    require_admin: bool,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = match verify_claims_from_header(&req, &self.token_maker) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("Token verification failed: {}", e);
                let response = HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "Invalid or missing authentication token",
                    "code": "UNAUTHORIZED"
                }));
                return Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response("Unauthorized", response)
                        .into())
                });
            }
        };

        if self.require_admin && !claims.is_admin {
            tracing::warn!(user_id = claims.id, "Non-admin user on admin route");
            let response = HttpResponse::Forbidden().json(serde_json::json!({
                "error": "Admin privileges required",
                "code": "FORBIDDEN"
            }));
            return Box::pin(async move {
                Err(actix_web::error::InternalError::from_response("Forbidden", response).into())
            });
        }

        tracing::debug!(
            user_id = claims.id,
            email = %claims.email,
            "Token validated successfully"
        );
        req.extensions_mut().insert(claims);

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
