use chrono::{DateTime, TimeZone};
use std::fmt;

use crate::models::{AssistantReply, User};
use crate::services::gemini_service::LanguageModel;
use crate::services::intent_service::{self, IntentError};
use crate::services::user_service::CommandHistory;
use crate::utils::AppError;

const DEFAULT_ASSISTANT_NAME: &str = "Assistant";

#[derive(Debug)]
pub enum AskError {
    MissingCommand,
    /// Resposta do modelo sem JSON
    NotUnderstood,
    UnknownIntent(String),
    Failed(String),
}

impl fmt::Display for AskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AskError::MissingCommand => write!(f, "command is empty"),
            AskError::NotUnderstood => write!(f, "model reply had no JSON object"),
            AskError::UnknownIntent(tag) => write!(f, "model returned unknown intent '{}'", tag),
            AskError::Failed(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<IntentError> for AskError {
    fn from(e: IntentError) -> Self {
        match e {
            IntentError::NoJson => AskError::NotUnderstood,
            IntentError::UnknownIntent(tag) => AskError::UnknownIntent(tag),
            IntentError::Malformed(msg) => AskError::Failed(format!("malformed model reply: {}", msg)),
        }
    }
}

impl From<AppError> for AskError {
    fn from(e: AppError) -> Self {
        AskError::Failed(e.to_string())
    }
}

/// Full ask flow for an authenticated user.
///
/// The command is recorded before the model is called so failed asks still
/// show up in the history. A failed write is logged and does not block the
/// answer. Blank commands are rejected without touching the history.
pub async fn ask<Tz>(
    model: &dyn LanguageModel,
    history: &dyn CommandHistory,
    user_id: &str,
    user: &User,
    command: &str,
    now: &DateTime<Tz>,
) -> Result<AssistantReply, AskError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let command = command.trim();
    if command.is_empty() {
        return Err(AskError::MissingCommand);
    }

    if let Err(e) = history.record(user_id, command).await {
        log::warn!("⚠️ Could not record history for {}: {}", user_id, e);
    }

    respond(model, command, user.assistant_name.as_deref(), &user.name, now).await
}

/// Sends `command` to the model and classifies its answer.
pub async fn respond<Tz>(
    model: &dyn LanguageModel,
    command: &str,
    assistant_name: Option<&str>,
    user_name: &str,
    now: &DateTime<Tz>,
) -> Result<AssistantReply, AskError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let assistant_name = assistant_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(DEFAULT_ASSISTANT_NAME);

    let prompt = intent_service::build_prompt(command, assistant_name, user_name);
    let text = model.generate(&prompt).await?;

    log::debug!("🤖 Model output: {}", text);

    let reply = intent_service::parse_reply(&text)?;
    Ok(intent_service::dispatch(reply, command, now)?)
}
