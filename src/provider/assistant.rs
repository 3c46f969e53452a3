use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::{extract_first_json_object, DynProvider, SuggestionProvider, SummaryRenderer};
use crate::catalog::QuestionKind;
use crate::errors::BriefError;
use crate::prompt;
use crate::wire::{Completion, FollowUpQuestion, FollowUpRequest, FollowUpResponse, PreviousAnswer, SuggestionQuery};

pub const MAX_SUGGESTIONS: usize = 5;

/// Suggestion provider and brief renderer backed by a chat-completion model.
pub struct LlmAssistant {
    provider: DynProvider,
    summary_provider: Option<DynProvider>,
    max_suggestions: usize,
}

impl LlmAssistant {
    pub fn new(provider: DynProvider, max_suggestions: usize) -> Self {
        Self {
            provider,
            summary_provider: None,
            max_suggestions: max_suggestions.clamp(1, MAX_SUGGESTIONS),
        }
    }

    /// Use a different backend (usually a larger model) for the final brief.
    pub fn with_summary_provider(mut self, provider: DynProvider) -> Self {
        self.summary_provider = Some(provider);
        self
    }
}

fn max_tokens_for(kind: QuestionKind) -> u32 {
    match kind {
        QuestionKind::Textarea | QuestionKind::Scene => 500,
        _ => 400,
    }
}

/// Drops a leading `1.` / `2)` numbering or a `-` / `*` / `•` bullet.
/// Digits not followed by `.` or `)` are part of the text.
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(['.', ')']) {
            return rest.trim();
        }
        return line;
    }
    line.strip_prefix(['-', '*', '•']).map(str::trim).unwrap_or(line)
}

/// One suggestion per non-empty line, list markers stripped.
pub fn parse_suggestion_lines(text: &str, max: usize) -> Vec<String> {
    text.lines()
        .map(|l| strip_list_marker(l).to_string())
        .filter(|l| !l.is_empty())
        .take(max)
        .collect()
}

fn clean_single(text: &str) -> String {
    text.trim().trim_matches(|c: char| c == '"' || c == '\'').trim().to_string()
}

pub fn parse_follow_ups(content: &str) -> Result<Vec<FollowUpQuestion>, BriefError> {
    if let Ok(resp) = serde_json::from_str::<FollowUpResponse>(content) {
        return Ok(resp.questions);
    }
    extract_first_json_object(content)
        .and_then(|obj| serde_json::from_str::<FollowUpResponse>(&obj).ok())
        .map(|r| r.questions)
        .ok_or_else(|| BriefError::Schema(format!("model did not return follow-up questions JSON: {content}")))
}

#[async_trait]
impl SuggestionProvider for LlmAssistant {
    async fn get_suggestions(&self, query: &SuggestionQuery) -> Result<Vec<String>> {
        let req = Completion {
            system: prompt::system_prompt_suggestions(),
            user: prompt::user_prompt_suggestions(query),
            temperature: 0.8,
            max_tokens: max_tokens_for(query.question_type),
            json: false,
        };
        let text = self.provider.complete(&req).await?;
        let list = parse_suggestion_lines(&text, self.max_suggestions);
        debug!(question = %query.current_question, count = list.len(), "suggestions received");
        Ok(list)
    }

    async fn get_answer_suggestion(&self, query: &SuggestionQuery) -> Result<String> {
        let req = Completion {
            system: prompt::system_prompt_suggestions(),
            user: prompt::user_prompt_answer_suggestion(query),
            temperature: 0.7,
            max_tokens: if query.question_type == QuestionKind::Dropdown { 50 } else { max_tokens_for(query.question_type) },
            json: false,
        };
        let text = self.provider.complete(&req).await?;
        Ok(clean_single(&text))
    }

    async fn generate_follow_up_questions(&self, req: &FollowUpRequest) -> Result<Vec<FollowUpQuestion>> {
        let completion = Completion {
            system: prompt::system_prompt_suggestions(),
            user: prompt::user_prompt_follow_ups(&req.previous_answers, &req.answered_question_ids),
            temperature: 0.7,
            max_tokens: 800,
            json: true,
        };
        let text = self.provider.complete(&completion).await?;
        Ok(parse_follow_ups(&text)?)
    }
}

#[async_trait]
impl SummaryRenderer for LlmAssistant {
    async fn generate_summary(&self, answers: &[PreviousAnswer]) -> Result<String> {
        let req = Completion {
            system: prompt::system_prompt_summary(),
            user: prompt::user_prompt_summary(answers),
            temperature: 0.7,
            max_tokens: 2000,
            json: false,
        };
        let provider = self.summary_provider.as_ref().unwrap_or(&self.provider);
        let summary = provider.complete(&req).await?;
        if summary.trim().is_empty() {
            warn!("summary provider returned an empty brief");
            return Err(BriefError::Provider("empty brief".into()).into());
        }
        Ok(summary)
    }
}
