use chrono::{DateTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use crate::models::{ActionKind, AssistantReply, ClientAction, Intent, ModelReply};

lazy_static! {
    // Primeiro objeto JSON no texto livre do modelo (não-guloso)
    static ref JSON_BLOB: Regex = Regex::new(r"\{[\s\S]*?\}").expect("valid regex");
    static ref CODE_FENCE: Regex = Regex::new(r"```json\n?|\n?```").expect("valid regex");
}

#[derive(Debug, PartialEq, Eq)]
pub enum IntentError {
    /// O texto do modelo não contém nenhum objeto JSON
    NoJson,
    Malformed(String),
    UnknownIntent(String),
}

impl fmt::Display for IntentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentError::NoJson => write!(f, "no JSON object in model output"),
            IntentError::Malformed(msg) => write!(f, "malformed model reply: {}", msg),
            IntentError::UnknownIntent(tag) => write!(f, "unknown intent: {}", tag),
        }
    }
}

impl std::error::Error for IntentError {}

/// Builds the instruction prompt sent to the language model.
pub fn build_prompt(command: &str, assistant_name: &str, user_name: &str) -> String {
    let tags = Intent::ALL
        .iter()
        .map(|i| format!("\"{}\"", i.as_str()))
        .collect::<Vec<_>>()
        .join(" | ");

    let meanings = Intent::ALL
        .iter()
        .map(|i| format!("- \"{}\": {}.", i.as_str(), i.description()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a virtual assistant named {assistant_name} created by {user_name}.
You are not Google. You will now behave like a voice-enabled assistant.

Your task is to understand the user's natural language input and respond with a JSON object like this:

{{
  "type": {tags},
  "userInput": "<original user input, with your own name removed if present; if the user asked to search something on Google or YouTube, only the text to search for>",
  "response": "<a short spoken response to read out loud to the user>"
}}

Instructions:
- "type": determine the intent of the user.
- "userInput": the original sentence the user spoke.
- "response": a short voice-friendly reply, e.g. "Sure, playing it now", "Here's what I found", "Today is Tuesday".

Type meanings:
{meanings}

Important:
- If someone asks who created you, answer with "{user_name}".
- Only respond with the JSON object, nothing else.

Now your userInput: {command}
"#
    )
}

/// First `{...}` blob in the model text with markdown fences stripped.
pub fn extract_json(text: &str) -> Option<String> {
    let blob = JSON_BLOB.find(text)?;
    Some(CODE_FENCE.replace_all(blob.as_str(), "").trim().to_string())
}

pub fn parse_reply(text: &str) -> Result<ModelReply, IntentError> {
    let json = extract_json(text).ok_or(IntentError::NoJson)?;
    serde_json::from_str(&json).map_err(|e| IntentError::Malformed(e.to_string()))
}

/// URL the client opens for intents that leave the page.
pub fn client_action(intent: Intent, user_input: &str) -> Option<ClientAction> {
    let url = match intent {
        Intent::GoogleSearch => format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(user_input)
        ),
        Intent::YoutubeSearch | Intent::YoutubePlay => format!(
            "https://www.youtube.com/results?search_query={}",
            urlencoding::encode(user_input)
        ),
        Intent::CalculatorOpen => "https://www.google.com/search?q=calculator".to_string(),
        Intent::InstagramOpen => "https://www.instagram.com".to_string(),
        Intent::FacebookOpen => "https://www.facebook.com".to_string(),
        Intent::WeatherShow => "https://www.google.com/search?q=weather".to_string(),
        Intent::General | Intent::GetTime | Intent::GetDate | Intent::GetDay | Intent::GetMonth => {
            return None
        }
    };

    Some(ClientAction {
        kind: ActionKind::OpenUrl,
        url,
    })
}

/// Turns the model's reply into the reply sent to the client.
///
/// Clock intents are answered from `now` instead of trusting the model.
/// Everything else passes the model's `response` through.
pub fn dispatch<Tz>(
    reply: ModelReply,
    command: &str,
    now: &DateTime<Tz>,
) -> Result<AssistantReply, IntentError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let tag = reply.intent.as_deref().unwrap_or_default();
    let intent: Intent = tag
        .parse()
        .map_err(|_| IntentError::UnknownIntent(tag.to_string()))?;

    let user_input = reply
        .user_input
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| command.to_string());

    let response = match intent {
        Intent::GetDate => format!("current date is {}", now.format("%Y-%m-%d")),
        Intent::GetTime => format!("current time is {}", now.format("%I:%M %p")),
        Intent::GetDay => format!("today is {}", now.format("%A")),
        Intent::GetMonth => format!("month is {}", now.format("%B")),
        _ => reply.response.unwrap_or_default(),
    };

    let action = client_action(intent, &user_input);

    Ok(AssistantReply {
        intent,
        user_input,
        response,
        action,
    })
}
