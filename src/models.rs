use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A retrieved document chunk that an answer may cite.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub id: String,
    #[serde(default)]
    pub filepath: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub chunk_id: Option<String>,
    #[serde(default)]
    pub part_index: Option<u32>,
    #[serde(default)]
    pub reindex_id: Option<String>,
}

impl Citation {
    pub fn new(id: impl Into<String>, filepath: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filepath: Some(filepath.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default, deserialize_with = "string_or_none")]
    pub answer: Option<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub generated_chart: Option<serde_json::Value>,
}

impl AskResponse {
    pub fn new(answer: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            answer: Some(answer.into()),
            citations,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParsedAnswer {
    pub citations: Vec<Citation>,
    #[serde(rename = "markdownFormatText")]
    pub markdown_format_text: String,
}

// Answers arrive from a streaming backend; anything that is not a string is
// treated as "nothing renderable" instead of failing the whole payload.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        _ => None,
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Neutral,
    Positive,
    Negative,
    MissingCitation,
    WrongCitation,
    OutOfScope,
    InaccurateOrIrrelevant,
    OtherUnhelpful,
    HateSpeech,
    Violent,
    Sexual,
    Manipulative,
    OtherHarmful,
}

impl Feedback {
    pub fn as_str(self) -> &'static str {
        match self {
            Feedback::Neutral => "neutral",
            Feedback::Positive => "positive",
            Feedback::Negative => "negative",
            Feedback::MissingCitation => "missing_citation",
            Feedback::WrongCitation => "wrong_citation",
            Feedback::OutOfScope => "out_of_scope",
            Feedback::InaccurateOrIrrelevant => "inaccurate_or_irrelevant",
            Feedback::OtherUnhelpful => "other_unhelpful",
            Feedback::HateSpeech => "hate_speech",
            Feedback::Violent => "violent",
            Feedback::Sexual => "sexual",
            Feedback::Manipulative => "manipulative",
            Feedback::OtherHarmful => "other_harmful",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    Tool,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub end_turn: Option<bool>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub feedback: Option<Feedback>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            end_turn: None,
            date: Utc::now(),
            feedback: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub date: DateTime<Utc>,
}

impl Conversation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            messages: Vec::new(),
            date: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiSettings {
    pub title: String,
    pub chat_title: String,
    pub chat_description: String,
    pub show_share_button: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrontendSettings {
    pub auth_enabled: bool,
    pub feedback_enabled: bool,
    pub sanitize_answer: bool,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CosmosDbHealth {
    #[serde(rename = "cosmosDB")]
    pub cosmos_db: bool,
    pub status: String,
}

impl Default for CosmosDbHealth {
    fn default() -> Self {
        Self {
            cosmos_db: false,
            status: "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ChatHistoryLoadingState {
    Loading,
    Success,
    Fail,
    #[default]
    NotStarted,
}
