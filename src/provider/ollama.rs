use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::wire::Completion;
use super::Provider;

pub struct Ollama {
    pub model: String,
    pub url: String,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct Msg {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: String,
}

fn to_messages(req: &Completion) -> Vec<Msg> {
    vec![
        Msg { role: "system".into(), content: req.system.clone() },
        Msg { role: "user".into(), content: req.user.clone() },
    ]
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, req: &Completion) -> Result<String> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let client = Client::builder().timeout(self.timeout).build()?;
        let body = ChatRequest {
            model: &self.model,
            messages: to_messages(req),
            stream: false,
            format: req.json.then_some("json"),
            options: OllamaOptions { temperature: req.temperature, num_predict: req.max_tokens },
        };

        debug!(%url, model = %self.model, "ollama request");

        let resp = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("ollama request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("ollama read body failed")?;
        debug!(%status, body = %text, "ollama response");

        if !status.is_success() {
            return Err(anyhow!("ollama error ({}): {}", status, text));
        }

        // Some proxies return the bare content instead of the chat envelope.
        let content = match serde_json::from_str::<ChatResponse>(&text) {
            Ok(c) => c.message.content,
            Err(_) => text,
        };
        Ok(content.trim().to_string())
    }
}
