use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::errors::BriefError;
use crate::wire::{Completion, FollowUpQuestion, FollowUpRequest, PreviousAnswer, SuggestionQuery};

pub mod openai;
pub mod anthropic;
pub mod ollama;
pub mod assistant;

/// A chat-completion backend. Returns the raw text of the first choice.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn complete(&self, req: &Completion) -> Result<String>;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

/// Supplies candidate answers. Results only feed UI hints; failures are
/// handled by the caller and never gate navigation.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Up to five candidate answers.
    async fn get_suggestions(&self, query: &SuggestionQuery) -> Result<Vec<String>>;

    /// One recommended answer; may be empty.
    async fn get_answer_suggestion(&self, query: &SuggestionQuery) -> Result<String>;

    async fn generate_follow_up_questions(&self, req: &FollowUpRequest) -> Result<Vec<FollowUpQuestion>>;
}

/// Formats the finished brief from every recorded answer.
#[async_trait]
pub trait SummaryRenderer: Send + Sync {
    async fn generate_summary(&self, answers: &[PreviousAnswer]) -> Result<String>;
}

/// Reads a non-empty API key from the environment.
fn api_key(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(BriefError::Unavailable(format!("{var} env var is not set")).into()),
    }
}

/// Builds the configured backend. Fails up front when the backend's API key
/// is missing so the caller can drop to offline mode.
pub fn make_provider(cfg: &Config, model: &str) -> Result<DynProvider> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    match cfg.provider {
        ProviderKind::OpenAI => Ok(Box::new(openai::OpenAIProvider::new(
            model.to_string(),
            api_key("OPENAI_API_KEY")?,
            cfg.openai_base.clone(),
            cfg.timeout_secs,
        ))),
        ProviderKind::Anthropic => {
            let api_key = api_key("ANTHROPIC_API_KEY")?;
            Ok(Box::new(anthropic::Anthropic {
                model: model.to_string(),
                api_key,
                timeout,
                api_base: cfg.anthropic_base.clone(),
                api_version: cfg.anthropic_version.clone(),
            }))
        }
        ProviderKind::Ollama => Ok(Box::new(ollama::Ollama {
            model: model.to_string(),
            url: cfg.ollama_url.clone().unwrap_or_else(|| "http://localhost:11434".into()),
            timeout,
        })),
    }
}

/// Extracts the first top-level JSON object substring from a string.
/// Handles nested braces; returns None if not found.
pub fn extract_first_json_object(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut start = None;
    let mut depth = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        if b == b'{' {
            if start.is_none() {
                start = Some(i);
            }
            depth += 1;
        } else if b == b'}' && depth > 0 {
            depth -= 1;
            if depth == 0 {
                if let Some(st) = start {
                    return Some(s[st..=i].to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_fails_at_build_time() {
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("ANTHROPIC_API_KEY");
        let mut cfg = Config::default();

        for kind in [ProviderKind::OpenAI, ProviderKind::Anthropic] {
            cfg.provider = kind;
            let err = match make_provider(&cfg, "m") {
                Ok(_) => panic!("provider built without an API key"),
                Err(e) => e,
            };
            assert!(matches!(err.downcast_ref::<BriefError>(), Some(BriefError::Unavailable(_))));
        }

        cfg.provider = ProviderKind::Ollama;
        assert!(make_provider(&cfg, "m").is_ok());
    }

    #[test]
    fn extracts_object_wrapped_in_prose() {
        let text = "Sure! ```json\n{\"questions\":[{\"label\":\"a {b}\"}]}\n``` hope that helps";
        assert_eq!(
            extract_first_json_object(text).as_deref(),
            Some("{\"questions\":[{\"label\":\"a {b}\"}]}")
        );
        assert!(extract_first_json_object("no json here }").is_none());
    }
}
