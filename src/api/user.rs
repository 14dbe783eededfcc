use actix_web::{web, HttpResponse};

use crate::{
    api::metrics::{self, AskOutcome},
    database::MongoDB,
    middleware::auth::Claims,
    models::{AskRequest, AssistantReply, PublicUser, UpdateAssistantRequest},
    services::{
        assistant_service::{self, AskError},
        user_service,
    },
    state::AppState,
    utils::AppError,
};

fn message(status: actix_web::http::StatusCode, msg: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({ "message": msg }))
}

fn spoken(status: actix_web::http::StatusCode, msg: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({ "response": msg }))
}

/// Maps a failed ask to the body the voice client reads out loud.
pub fn ask_error_response(err: &AskError) -> HttpResponse {
    use actix_web::http::StatusCode;

    match err {
        AskError::MissingCommand => spoken(StatusCode::BAD_REQUEST, "command is required"),
        AskError::NotUnderstood => spoken(StatusCode::BAD_REQUEST, "sorry, i can't understand"),
        AskError::UnknownIntent(_) => spoken(StatusCode::BAD_REQUEST, "I don't understand that command."),
        AskError::Failed(_) => spoken(StatusCode::INTERNAL_SERVER_ERROR, "ask assistant error"),
    }
}

#[utoipa::path(
    get,
    path = "/api/user/current",
    tag = "User",
    responses(
        (status = 200, description = "Authenticated user", body = PublicUser),
        (status = 400, description = "User not found"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn get_current_user(claims: web::ReqData<Claims>, db: web::Data<MongoDB>) -> HttpResponse {
    let user_id = &claims.sub;
    log::info!("👤 GET /user/current - user {}", user_id);

    match user_service::get_current_user(&db, user_id).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(AppError::NotFound(_)) => message(actix_web::http::StatusCode::BAD_REQUEST, "user not found"),
        Err(e) => {
            log::error!("❌ Failed to get current user {}: {}", user_id, e);
            message(actix_web::http::StatusCode::BAD_REQUEST, "get current user error")
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/user/update",
    tag = "User",
    request_body = UpdateAssistantRequest,
    responses(
        (status = 200, description = "Assistant profile updated", body = PublicUser),
        (status = 400, description = "Invalid input or update failure"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn update_assistant(
    claims: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    state: web::Data<AppState>,
    request: web::Json<UpdateAssistantRequest>,
) -> HttpResponse {
    let user_id = &claims.sub;
    log::info!("🔧 POST /user/update - user {}", user_id);

    let update = match user_service::validate_update(&request, state.max_image_bytes) {
        Ok(update) => update,
        Err(e) => {
            log::warn!("⚠️ Invalid assistant update: {}", e);
            return message(actix_web::http::StatusCode::BAD_REQUEST, e.client_message());
        }
    };

    match user_service::update_assistant(&db, state.uploader.as_ref(), user_id, update).await {
        Ok(user) => {
            log::info!("✅ Assistant updated: {:?}", user.assistant_name);
            HttpResponse::Ok().json(user)
        }
        Err(e) => {
            log::error!("❌ Update assistant failed for {}: {}", user_id, e);
            message(actix_web::http::StatusCode::BAD_REQUEST, "Update Assistant Error")
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/user/asktoassistant",
    tag = "User",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Classified reply", body = AssistantReply),
        (status = 400, description = "Command missing or not understood"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Language model failure")
    ),
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn ask_to_assistant(
    claims: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    state: web::Data<AppState>,
    request: web::Json<AskRequest>,
) -> HttpResponse {
    use actix_web::http::StatusCode;

    let user_id = &claims.sub;
    let command = request.command.as_deref().unwrap_or_default();

    log::info!("🎙️ POST /user/asktoassistant - user {}: {:?}", user_id, command);

    let user = match user_service::find_user(&db, user_id).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            metrics::record_ask(AskOutcome::Rejected);
            return message(StatusCode::BAD_REQUEST, "user not found");
        }
        Err(e) => {
            log::error!("❌ Failed to load user {}: {}", user_id, e);
            metrics::record_ask(AskOutcome::Failed);
            return spoken(StatusCode::INTERNAL_SERVER_ERROR, "ask assistant error");
        }
    };

    let now = chrono::Local::now();
    match assistant_service::ask(state.model.as_ref(), db.get_ref(), user_id, &user, command, &now).await {
        Ok(reply) => {
            log::info!("✅ Intent {} for user {}", reply.intent, user_id);
            metrics::record_ask(AskOutcome::Answered);
            HttpResponse::Ok().json(reply)
        }
        Err(e) => {
            log::warn!("❌ Ask failed for user {}: {}", user_id, e);
            metrics::record_ask(match e {
                AskError::MissingCommand => AskOutcome::Rejected,
                AskError::NotUnderstood | AskError::UnknownIntent(_) => AskOutcome::NotUnderstood,
                AskError::Failed(_) => AskOutcome::Failed,
            });
            ask_error_response(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, http::StatusCode};

    async fn body_json(res: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(res.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_rt::test]
    async fn test_ask_error_bodies() {
        let res = ask_error_response(&AskError::MissingCommand);
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["response"], "command is required");

        let res = ask_error_response(&AskError::NotUnderstood);
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["response"], "sorry, i can't understand");

        let res = ask_error_response(&AskError::UnknownIntent("open-spotify".into()));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["response"], "I don't understand that command.");

        let res = ask_error_response(&AskError::Failed("timeout".into()));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(res).await["response"], "ask assistant error");
    }
}
