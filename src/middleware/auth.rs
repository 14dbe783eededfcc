use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::config::AuthConfig;
use crate::services::auth_service;
use crate::utils::AppError;

pub use crate::services::auth_service::Claims;

pub const TOKEN_COOKIE: &str = "token";

/// Tokens candidatos: cookie `token` primeiro, depois `Authorization: Bearer`
pub fn extract_tokens(req: &ServiceRequest) -> Vec<String> {
    let cookie = req
        .cookie(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty());

    cookie.into_iter().chain(bearer_token(req)).collect()
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let config = match req.app_data::<web::Data<AuthConfig>>() {
            Some(config) => config.clone(),
            None => {
                log::error!("❌ AuthConfig missing from app data");
                let err: Error = AppError::Internal("auth not configured".to_string()).into();
                return Box::pin(async move { Err(err) });
            }
        };

        let tokens = extract_tokens(&req);
        if tokens.is_empty() {
            let err: Error = AppError::Unauthorized("token not found".to_string()).into();
            return Box::pin(async move { Err(err) });
        }

        // Cookie vencido não deve esconder um Bearer válido
        let verified = tokens
            .iter()
            .map(|token| auth_service::verify_token(token, &config))
            .reduce(|first, next| first.or(next))
            .unwrap_or_else(|| Err(AppError::Unauthorized("token not found".to_string())));

        match verified {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(e) => {
                log::warn!("❌ {} {} rejected: {}", req.method(), req.path(), e);
                let err: Error = AppError::Unauthorized("invalid token".to_string()).into();
                Box::pin(async move { Err(err) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{cookie::Cookie, http::StatusCode, test, App, HttpResponse};

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "middleware-secret".to_string(),
            token_ttl_days: 1,
            cookie_secure: false,
        }
    }

    async fn whoami(claims: web::ReqData<Claims>) -> HttpResponse {
        HttpResponse::Ok().body(claims.sub.clone())
    }

    macro_rules! protected_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(config()))
                    .service(
                        web::scope("/api/user")
                            .wrap(AuthMiddleware)
                            .route("/whoami", web::get().to(whoami)),
                    ),
            )
            .await
        };
    }

    #[actix_rt::test]
    async fn test_missing_token_is_unauthorized() {
        let app = protected_app!();
        let req = test::TestRequest::get().uri("/api/user/whoami").to_request();

        let err = test::try_call_service(&app, req).await.unwrap_err();
        let res = err.error_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_invalid_token_is_unauthorized() {
        let app = protected_app!();
        let req = test::TestRequest::get()
            .uri("/api/user/whoami")
            .insert_header(("Authorization", "Bearer not.a.jwt"))
            .to_request();

        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_cookie_token_is_accepted() {
        let app = protected_app!();
        let token = auth_service::generate_jwt("65f0c0ffee0000000000abcd", &config()).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/user/whoami")
            .cookie(Cookie::new(TOKEN_COOKIE, token))
            .to_request();

        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "65f0c0ffee0000000000abcd");
    }

    #[actix_rt::test]
    async fn test_bearer_token_is_accepted() {
        let app = protected_app!();
        let token = auth_service::generate_jwt("65f0c0ffee0000000000beef", &config()).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/user/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "65f0c0ffee0000000000beef");
    }

    #[actix_rt::test]
    async fn test_stale_cookie_falls_back_to_bearer() {
        let app = protected_app!();
        let token = auth_service::generate_jwt("65f0c0ffee0000000000cafe", &config()).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/user/whoami")
            .cookie(Cookie::new(TOKEN_COOKIE, "expired.or.forged"))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "65f0c0ffee0000000000cafe");
    }

    #[actix_rt::test]
    async fn test_stale_cookie_without_bearer_is_unauthorized() {
        let app = protected_app!();
        let req = test::TestRequest::get()
            .uri("/api/user/whoami")
            .cookie(Cookie::new(TOKEN_COOKIE, "expired.or.forged"))
            .to_request();

        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }
}
