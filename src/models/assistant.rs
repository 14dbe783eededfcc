use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Intenção reconhecida pelo modelo (conjunto fechado)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    General,
    GoogleSearch,
    YoutubeSearch,
    YoutubePlay,
    GetTime,
    GetDate,
    GetDay,
    GetMonth,
    CalculatorOpen,
    InstagramOpen,
    FacebookOpen,
    WeatherShow,
}

impl Intent {
    pub const ALL: [Intent; 12] = [
        Intent::General,
        Intent::GoogleSearch,
        Intent::YoutubeSearch,
        Intent::YoutubePlay,
        Intent::GetTime,
        Intent::GetDate,
        Intent::GetDay,
        Intent::GetMonth,
        Intent::CalculatorOpen,
        Intent::InstagramOpen,
        Intent::FacebookOpen,
        Intent::WeatherShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::General => "general",
            Intent::GoogleSearch => "google-search",
            Intent::YoutubeSearch => "youtube-search",
            Intent::YoutubePlay => "youtube-play",
            Intent::GetTime => "get-time",
            Intent::GetDate => "get-date",
            Intent::GetDay => "get-day",
            Intent::GetMonth => "get-month",
            Intent::CalculatorOpen => "calculator-open",
            Intent::InstagramOpen => "instagram-open",
            Intent::FacebookOpen => "facebook-open",
            Intent::WeatherShow => "weather-show",
        }
    }

    /// Meaning of the tag, as explained to the model in the prompt.
    pub fn description(&self) -> &'static str {
        match self {
            Intent::General => "if it's a factual or informational question, or any question you already know the answer to; give a short answer",
            Intent::GoogleSearch => "if user wants to search something on Google",
            Intent::YoutubeSearch => "if user wants to search something on YouTube",
            Intent::YoutubePlay => "if user wants to directly play a video or song",
            Intent::GetTime => "if user asks for current time",
            Intent::GetDate => "if user asks for today's date",
            Intent::GetDay => "if user asks what day it is",
            Intent::GetMonth => "if user asks for the current month",
            Intent::CalculatorOpen => "if user wants to open a calculator",
            Intent::InstagramOpen => "if user wants to open instagram",
            Intent::FacebookOpen => "if user wants to open facebook",
            Intent::WeatherShow => "if user wants to know weather",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .iter()
            .copied()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| format!("unknown intent: {}", s))
    }
}

/// JSON object the model is asked to produce. `type` is kept as a raw,
/// optional string so a missing or unknown tag can be reported instead of
/// failing the decode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelReply {
    #[serde(rename = "type", default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub user_input: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    OpenUrl,
}

/// Ação que o cliente deve executar além de falar a resposta
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ClientAction {
    pub kind: ActionKind,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    #[serde(rename = "type")]
    pub intent: Intent,
    pub user_input: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ClientAction>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AskRequest {
    pub command: Option<String>,
}
