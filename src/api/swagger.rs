use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Voice Assistant Service API",
        version = "1.0.0",
        description = "Backend for a voice-controlled personal assistant. \n\n**Authentication:** `/api/user/*` endpoints require the `token` cookie set by sign in, or a JWT Bearer token.\n\n**Features:**\n- Email/password accounts\n- Assistant customization (name + avatar upload)\n- Command classification through a generative-language model\n- Health monitoring and metrics"
    ),
    paths(
        // Auth endpoints
        crate::api::auth::sign_up,
        crate::api::auth::sign_in,
        crate::api::auth::logout,

        // User / assistant
        crate::api::user::get_current_user,
        crate::api::user::update_assistant,
        crate::api::user::ask_to_assistant,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::models::SignUpRequest,
            crate::models::SignInRequest,
            crate::models::AuthResponse,
            crate::models::PublicUser,
            crate::models::UpdateAssistantRequest,
            crate::models::AskRequest,
            crate::models::AssistantReply,
            crate::models::ClientAction,
            crate::models::ActionKind,
            crate::models::Intent,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Account creation, sign in and sign out. Sign in sets an HttpOnly `token` cookie."),
        (name = "User", description = "Current user, assistant customization and the ask-the-assistant endpoint."),
        (name = "Health", description = "Health check and metrics for monitoring service status."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/signup",
            "/api/auth/signin",
            "/api/auth/logout",
            "/api/user/current",
            "/api/user/update",
            "/api/user/asktoassistant",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
