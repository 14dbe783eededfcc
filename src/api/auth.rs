use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    web, HttpResponse,
};

use crate::{
    config::AuthConfig,
    database::MongoDB,
    middleware::auth::TOKEN_COOKIE,
    models::{AuthResponse, PublicUser, SignInRequest, SignUpRequest},
    services::auth_service,
    utils::AppError,
};

pub fn auth_cookie(token: &str, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.cookie_secure)
        .max_age(CookieDuration::days(config.token_ttl_days))
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

fn authenticated(
    mut response: actix_web::HttpResponseBuilder,
    user: PublicUser,
    token: String,
    config: &AuthConfig,
) -> HttpResponse {
    response.cookie(auth_cookie(&token, config)).json(AuthResponse {
        success: true,
        token,
        user,
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created, token cookie set", body = AuthResponse),
        (status = 400, description = "Invalid input or email already registered")
    )
)]
pub async fn sign_up(
    db: web::Data<MongoDB>,
    config: web::Data<AuthConfig>,
    request: web::Json<SignUpRequest>,
) -> Result<HttpResponse, AppError> {
    let email_str = request.email.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /auth/signup - email: {}", email_str);

    match auth_service::sign_up(&db, &config, &request).await {
        Ok((user, token)) => {
            log::info!("✅ Sign up successful: {}", user.email);
            Ok(authenticated(HttpResponse::Created(), user, token, &config))
        }
        Err(e) => {
            log::warn!("❌ Sign up failed: {} - {}", email_str, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/signin",
    tag = "Auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in, token cookie set", body = AuthResponse),
        (status = 400, description = "Unknown email or wrong password")
    )
)]
pub async fn sign_in(
    db: web::Data<MongoDB>,
    config: web::Data<AuthConfig>,
    request: web::Json<SignInRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /auth/signin - email: {}", request.email);

    match auth_service::sign_in(&db, &config, &request).await {
        Ok((user, token)) => {
            log::info!("✅ Sign in successful: {}", user.email);
            Ok(authenticated(HttpResponse::Ok(), user, token, &config))
        }
        Err(e) => {
            log::warn!("❌ Sign in failed: {} - {}", request.email, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Token cookie cleared")
    )
)]
pub async fn logout() -> HttpResponse {
    log::info!("👋 GET /auth/logout");

    HttpResponse::Ok().cookie(removal_cookie()).json(serde_json::json!({
        "message": "log out successfully"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, App};

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "s".to_string(),
            token_ttl_days: 10,
            cookie_secure: true,
        }
    }

    #[test]
    fn test_auth_cookie_attributes() {
        let cookie = auth_cookie("abc", &config());
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(CookieDuration::days(10)));
    }

    #[actix_rt::test]
    async fn test_logout_clears_cookie() {
        let app = actix_test::init_service(App::new().route("/api/auth/logout", web::get().to(logout))).await;
        let req = actix_test::TestRequest::get().uri("/api/auth/logout").to_request();
        let res = actix_test::call_service(&app, req).await;

        assert!(res.status().is_success());
        let cleared = res
            .response()
            .cookies()
            .find(|c| c.name() == TOKEN_COOKIE)
            .expect("token cookie in response");
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age(), Some(CookieDuration::ZERO));

        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["message"], "log out successfully");
    }
}
