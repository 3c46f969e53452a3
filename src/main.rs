use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod config;
mod errors;
mod flow;
mod followup;
mod log;
mod prompt;
mod provider;
mod scenes;
mod session;
mod store;
mod suggest;
mod summary;
mod ux;
mod wire;
mod wizard;

use provider::assistant::LlmAssistant;
use provider::{SuggestionProvider, SummaryRenderer};

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_assistant(cfg: &config::Config) -> anyhow::Result<Arc<LlmAssistant>> {
    let mut assistant = LlmAssistant::new(provider::make_provider(cfg, &cfg.model)?, cfg.max_suggestions);
    if cfg.summary_model() != cfg.model {
        assistant = assistant.with_summary_provider(provider::make_provider(cfg, cfg.summary_model())?);
    }
    Ok(Arc::new(assistant))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_logging(args.debug);

    let mut cfg = config::Config::load(args.config.as_deref().map(Path::new))?;
    cfg.apply_args(&args);
    info!(schema = %cfg.schema_version, provider = ?cfg.provider, model = %cfg.model, "configuration loaded");

    let assistant = if cfg.suggestions_enabled || cfg.follow_ups_enabled {
        match build_assistant(&cfg) {
            Ok(a) => Some(a),
            Err(e) => {
                warn!(error = %e, "suggestion provider unavailable, continuing offline");
                ux::print_muted("AI suggestions unavailable, continuing without them");
                None
            }
        }
    } else {
        None
    };

    let (suggestions, renderer): (Option<Arc<dyn SuggestionProvider>>, Arc<dyn SummaryRenderer>) = match assistant {
        Some(a) => (Some(a.clone() as Arc<dyn SuggestionProvider>), a as Arc<dyn SummaryRenderer>),
        None => (None, Arc::new(summary::LocalRenderer)),
    };

    let opts = wizard::WizardOptions {
        suggestions: cfg.suggestions_enabled,
        follow_ups: cfg.follow_ups_enabled,
        max_suggestions: cfg.max_suggestions,
    };
    let mut wizard = wizard::Wizard::new(session::BriefSession::new(), suggestions, renderer, opts);
    let outcome = wizard.run(BufReader::new(tokio::io::stdin())).await?;

    info!(answers = wizard.session().answers().len(), "wizard finished");
    let brief = match &outcome {
        wizard::Outcome::Completed { brief } => Some(brief.as_str()),
        wizard::Outcome::Quit => {
            println!("Left without generating a brief.");
            None
        }
    };

    if cfg.save_session && !wizard.session().answers().is_empty() {
        let saved = log::save_session(Path::new(&cfg.out_dir), wizard.session(), brief)?;
        log::print_saved_paths(&saved);
    }

    Ok(())
}
