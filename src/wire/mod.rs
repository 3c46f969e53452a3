use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::QuestionKind;
use crate::store::Answer;

/// ========================================
/// Suggestion provider wire types
/// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousAnswer {
    pub question: String,
    pub answer: String,
}

impl From<&Answer> for PreviousAnswer {
    fn from(a: &Answer) -> Self {
        Self { question: a.question_title.clone(), answer: a.value.clone() }
    }
}

/// What the provider needs to know about the question being suggested for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionQuery {
    pub current_question: String,
    pub question_type: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub previous_answers: Vec<PreviousAnswer>,
    /// Free-form profile or metadata; only used by the single recommendation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpKind {
    #[default]
    Text,
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpQuestion {
    #[serde(default)]
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default, rename = "type")]
    pub kind: FollowUpKind,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpRequest {
    pub previous_answers: Vec<PreviousAnswer>,
    #[serde(default)]
    pub answered_question_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpResponse {
    pub questions: Vec<FollowUpQuestion>,
}

/// A single chat completion request handed to a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the backend for a JSON object response where it supports that.
    #[serde(default)]
    pub json: bool,
}
