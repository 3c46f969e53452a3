use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::{Args, ProviderKind};
use crate::errors::BriefError;
use crate::provider::assistant::MAX_SUGGESTIONS;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: String,
    pub provider: ProviderKind,
    pub model: String,
    /// Model used for the final brief; falls back to `model`.
    pub summary_model: Option<String>,
    pub timeout_secs: u64,
    pub openai_base: String,
    pub anthropic_base: String,
    pub anthropic_version: String,
    pub ollama_url: Option<String>,
    pub suggestions_enabled: bool,
    pub follow_ups_enabled: bool,
    pub max_suggestions: usize,
    pub out_dir: String,
    pub save_session: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: "2025-11-01".into(),
            provider: ProviderKind::OpenAI,
            model: "gpt-4o-mini".into(),
            summary_model: Some("gpt-4o".into()),
            timeout_secs: 30,
            openai_base: "https://api.openai.com".into(),
            anthropic_base: "https://api.anthropic.com".into(),
            anthropic_version: "2023-06-01".into(),
            ollama_url: Some("http://localhost:11434".into()),
            suggestions_enabled: true,
            follow_ups_enabled: true,
            max_suggestions: 5,
            out_dir: ".".into(),
            save_session: true,
        }
    }
}

impl Config {
    /// Parses a TOML config; absent keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, BriefError> {
        toml::from_str(text).map_err(|e| BriefError::Config(e.to_string()))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(p) => {
                let text = fs::read_to_string(p)?;
                Self::from_toml(&text).with_context(|| format!("invalid config file {}", p.display()))
            }
        }
    }

    /// CLI flags win over file values.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(p) = &args.provider {
            self.provider = p.clone();
        }
        if let Some(m) = &args.model {
            self.model = m.clone();
            self.summary_model = None;
        }
        if let Some(t) = args.timeout_secs {
            self.timeout_secs = t;
        }
        if let Some(dir) = &args.out_dir {
            self.out_dir = dir.clone();
        }
        if args.no_ai {
            self.suggestions_enabled = false;
            self.follow_ups_enabled = false;
        }
        if args.no_save {
            self.save_session = false;
        }
        self.max_suggestions = self.max_suggestions.clamp(1, MAX_SUGGESTIONS);
    }

    pub fn summary_model(&self) -> &str {
        self.summary_model.as_deref().unwrap_or(&self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml("provider = \"ollama\"\nmodel = \"llama3.1\"\nmax_suggestions = 3\n").unwrap();
        assert!(matches!(cfg.provider, ProviderKind::Ollama));
        assert_eq!(cfg.model, "llama3.1");
        assert_eq!(cfg.max_suggestions, 3);
        assert!(cfg.suggestions_enabled);
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = Config::from_toml("max_suggestions = \"many\"").unwrap_err();
        assert!(matches!(err, BriefError::Config(_)));
    }

    #[test]
    fn cli_flags_override_file() {
        let mut cfg = Config::default();
        let args = Args::parse_from(["ugc-brief", "--model", "gpt-4.1-mini", "--no-ai", "--timeout-secs", "5"]);
        cfg.apply_args(&args);
        assert_eq!(cfg.model, "gpt-4.1-mini");
        assert_eq!(cfg.summary_model(), "gpt-4.1-mini");
        assert_eq!(cfg.timeout_secs, 5);
        assert!(!cfg.suggestions_enabled);
        assert!(!cfg.follow_ups_enabled);
        assert!(cfg.save_session);
    }

    #[test]
    fn suggestion_cap_is_clamped() {
        let args = Args::parse_from(["ugc-brief"]);
        let mut cfg = Config::from_toml("max_suggestions = 0").unwrap();
        cfg.apply_args(&args);
        assert_eq!(cfg.max_suggestions, 1);

        let mut cfg = Config::from_toml("max_suggestions = 40").unwrap();
        cfg.apply_args(&args);
        assert_eq!(cfg.max_suggestions, MAX_SUGGESTIONS);
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.toml");
        fs::write(&path, "out_dir = \"/tmp/briefs\"\nsave_session = false\n").unwrap();
        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.out_dir, "/tmp/briefs");
        assert!(!cfg.save_session);
    }
}
