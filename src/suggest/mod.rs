//! Suggestion state for the active question.
//!
//! Every activation bumps a generation counter and hands out a `FetchTicket`.
//! Results carry their ticket back; anything from an older generation is
//! dropped, so a slow response for a question the user already left can never
//! overwrite the hints of the current one. The two fetches (candidate list and
//! single recommendation) run concurrently and land independently.

use regex::Regex;
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::catalog::{AiHint, QuestionKind};
use crate::provider::SuggestionProvider;
use crate::store::AnswerStore;
use crate::wire::{PreviousAnswer, SuggestionQuery};

/// Words kept per suggestion for short-answer questions.
pub const SHORT_SUGGESTION_WORDS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus<T> {
    Idle,
    Loading,
    Ready(T),
    Unavailable(String),
}

impl<T> FetchStatus<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    Off,
    Short { fallback: Vec<String> },
    Full,
}

impl From<AiHint> for FetchMode {
    fn from(hint: AiHint) -> Self {
        match hint {
            AiHint::None => FetchMode::Off,
            AiHint::Short { fallback, .. } => FetchMode::Short {
                fallback: fallback.iter().map(|s| s.to_string()).collect(),
            },
            AiHint::Full => FetchMode::Full,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub target: String,
}

#[derive(Debug)]
pub enum SuggestionEvent {
    Candidates(FetchTicket, Result<Vec<String>, String>),
    Recommendation(FetchTicket, Result<String, String>),
}

impl SuggestionEvent {
    pub fn ticket(&self) -> &FetchTicket {
        match self {
            SuggestionEvent::Candidates(t, _) | SuggestionEvent::Recommendation(t, _) => t,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SuggestionBoard {
    generation: u64,
    target: Option<String>,
    mode: FetchMode,
    max: usize,
    candidates: FetchStatus<Vec<String>>,
    recommendation: FetchStatus<String>,
}

impl SuggestionBoard {
    pub fn new(max: usize) -> Self {
        Self {
            generation: 0,
            target: None,
            mode: FetchMode::Off,
            max,
            candidates: FetchStatus::Idle,
            recommendation: FetchStatus::Idle,
        }
    }

    /// Starts a new generation for `target`, invalidating every in-flight fetch.
    pub fn activate(&mut self, target: &str, mode: FetchMode) -> FetchTicket {
        self.generation = self.generation.wrapping_add(1);
        self.target = Some(target.to_string());
        (self.candidates, self.recommendation) = match &mode {
            FetchMode::Off => (FetchStatus::Idle, FetchStatus::Idle),
            FetchMode::Short { .. } => (FetchStatus::Loading, FetchStatus::Idle),
            FetchMode::Full => (FetchStatus::Loading, FetchStatus::Loading),
        };
        self.mode = mode;
        FetchTicket { generation: self.generation, target: target.to_string() }
    }

    /// Drops all hints, e.g. when the flow completes.
    pub fn deactivate(&mut self) {
        self.activate("", FetchMode::Off);
        self.target = None;
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation && self.target.as_deref() == Some(ticket.target.as_str())
    }

    pub fn pending(&self) -> bool {
        self.candidates.is_loading() || self.recommendation.is_loading()
    }

    pub fn candidates(&self) -> &FetchStatus<Vec<String>> {
        &self.candidates
    }

    pub fn recommendation(&self) -> &FetchStatus<String> {
        &self.recommendation
    }

    /// Candidates to offer the user, empty unless ready.
    pub fn candidate_list(&self) -> &[String] {
        match &self.candidates {
            FetchStatus::Ready(list) => list,
            _ => &[],
        }
    }

    /// Applies a fetch result. Returns false (state untouched) for stale tickets.
    pub fn apply(&mut self, event: SuggestionEvent) -> bool {
        if !self.is_current(event.ticket()) {
            debug!(generation = event.ticket().generation, current = self.generation, "discarding stale suggestion result");
            return false;
        }
        match event {
            SuggestionEvent::Candidates(_, result) => {
                self.candidates = match (&self.mode, result) {
                    (FetchMode::Short { fallback }, Ok(list)) => {
                        let list = normalize_suggestions(&list, Some(SHORT_SUGGESTION_WORDS), self.max);
                        FetchStatus::Ready(if list.is_empty() { fallback.clone() } else { list })
                    }
                    (FetchMode::Short { fallback }, Err(e)) => {
                        warn!(error = %e, "suggestions failed, using fallback list");
                        FetchStatus::Ready(fallback.clone())
                    }
                    (_, Ok(list)) => FetchStatus::Ready(normalize_suggestions(&list, None, self.max)),
                    (_, Err(e)) => {
                        warn!(error = %e, "suggestions unavailable");
                        FetchStatus::Unavailable(e)
                    }
                };
            }
            SuggestionEvent::Recommendation(_, result) => {
                self.recommendation = match result {
                    Ok(s) => FetchStatus::Ready(s.trim().to_string()),
                    Err(e) => {
                        warn!(error = %e, "answer suggestion unavailable");
                        FetchStatus::Unavailable(e)
                    }
                };
            }
        }
        true
    }
}

/// Collapses whitespace.
pub fn normalize_text(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes, optionally shortens to `max_words`, drops empties and
/// duplicates, and keeps at most `max` entries.
pub fn normalize_suggestions(list: &[String], max_words: Option<usize>, max: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in list {
        if out.len() >= max {
            break;
        }
        let clean = normalize_text(raw);
        let item = match max_words {
            Some(n) => clean.split(' ').take(n).collect::<Vec<_>>().join(" "),
            None => clean,
        };
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn choice_phrase() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:select|choose|pick)\s+([^-\n]+)").ok()).as_ref()
}

/// Maps a free-form candidate onto a dropdown option; returns the candidate
/// itself when nothing matches.
pub fn match_option(suggestion: &str, options: &[String]) -> String {
    let lower = suggestion.to_lowercase();
    if let Some(opt) = options.iter().find(|o| lower.contains(&o.to_lowercase())) {
        return opt.clone();
    }
    if let Some(caps) = choice_phrase().and_then(|re| re.captures(suggestion)) {
        let extracted = caps[1].trim().to_lowercase();
        if let Some(opt) = options.iter().find(|o| {
            let o = o.to_lowercase();
            o.contains(&extracted) || extracted.contains(&o)
        }) {
            return opt.clone();
        }
    }
    suggestion.to_string()
}

/// Maps a single recommendation onto an option: exact (case-insensitive) first,
/// then partial containment either way.
pub fn match_recommendation(recommendation: &str, options: &[String]) -> String {
    let rec = recommendation.trim().to_lowercase();
    options
        .iter()
        .find(|o| o.to_lowercase() == rec)
        .or_else(|| {
            options.iter().find(|o| {
                let o = o.to_lowercase();
                o.contains(&rec) || rec.contains(&o)
            })
        })
        .cloned()
        .unwrap_or_else(|| recommendation.trim().to_string())
}

/// Builds the provider query from the question and every filled answer.
pub fn query_for(title: &str, kind: QuestionKind, options: Option<Vec<String>>, answers: &AnswerStore) -> SuggestionQuery {
    SuggestionQuery {
        current_question: title.to_string(),
        question_type: kind,
        options: options.filter(|o| !o.is_empty()),
        previous_answers: answers.iter().filter(|a| a.is_filled()).map(PreviousAnswer::from).collect(),
        user_profile: None,
        metadata: None,
    }
}

/// Runs provider calls on the tokio runtime and funnels their results, tagged
/// with their ticket, into one channel.
pub struct SuggestionFetcher {
    provider: Arc<dyn SuggestionProvider>,
    tx: mpsc::UnboundedSender<SuggestionEvent>,
    rx: mpsc::UnboundedReceiver<SuggestionEvent>,
}

impl SuggestionFetcher {
    pub fn new(provider: Arc<dyn SuggestionProvider>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { provider, tx, rx }
    }

    pub fn provider(&self) -> Arc<dyn SuggestionProvider> {
        self.provider.clone()
    }

    /// Issues the fetches the mode calls for. Nothing is spawned for `Off`.
    pub fn fetch(&self, ticket: &FetchTicket, mode: &FetchMode, query: SuggestionQuery) {
        if *mode == FetchMode::Off {
            return;
        }
        let query = Arc::new(query);

        let (provider, tx, t, q) = (self.provider.clone(), self.tx.clone(), ticket.clone(), query.clone());
        tokio::spawn(async move {
            let result = provider.get_suggestions(&q).await.map_err(|e| e.to_string());
            let _ = tx.send(SuggestionEvent::Candidates(t, result));
        });

        if *mode == FetchMode::Full {
            let (provider, tx, t) = (self.provider.clone(), self.tx.clone(), ticket.clone());
            tokio::spawn(async move {
                let result = provider.get_answer_suggestion(&query).await.map_err(|e| e.to_string());
                let _ = tx.send(SuggestionEvent::Recommendation(t, result));
            });
        }
    }

    /// Next finished fetch, current or stale.
    pub async fn next_event(&mut self) -> Option<SuggestionEvent> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{FollowUpQuestion, FollowUpRequest};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Slow {
        list_delay_ms: u64,
        answer_delay_ms: u64,
        fail: bool,
    }

    #[async_trait]
    impl SuggestionProvider for Slow {
        async fn get_suggestions(&self, q: &SuggestionQuery) -> Result<Vec<String>> {
            tokio::time::sleep(Duration::from_millis(self.list_delay_ms)).await;
            if self.fail {
                return Err(anyhow!("timeout"));
            }
            Ok(vec![format!("{} idea", q.current_question), format!("{} idea", q.current_question)])
        }

        async fn get_answer_suggestion(&self, q: &SuggestionQuery) -> Result<String> {
            tokio::time::sleep(Duration::from_millis(self.answer_delay_ms)).await;
            Ok(format!("best {}", q.current_question))
        }

        async fn generate_follow_up_questions(&self, _req: &FollowUpRequest) -> Result<Vec<FollowUpQuestion>> {
            Ok(vec![])
        }
    }

    /// Applies results until the board has nothing loading.
    async fn settle(fetcher: &mut SuggestionFetcher, board: &mut SuggestionBoard, mut on_update: impl FnMut(&SuggestionBoard)) {
        while board.pending() {
            let Some(event) = fetcher.next_event().await else { break };
            if board.apply(event) {
                on_update(board);
            }
        }
    }

    fn q(title: &str) -> SuggestionQuery {
        query_for(title, QuestionKind::Textarea, None, &AnswerStore::new())
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let mut board = SuggestionBoard::new(5);
        let old = board.activate("wardrobe", FetchMode::Full);
        let new = board.activate("creative_direction", FetchMode::Full);

        assert!(!board.apply(SuggestionEvent::Candidates(old, Ok(vec!["jeans".into()]))));
        assert!(board.candidates().is_loading());

        assert!(board.apply(SuggestionEvent::Candidates(new, Ok(vec!["no logos".into()]))));
        assert_eq!(board.candidate_list(), ["no logos".to_string()]);
        assert!(board.pending());
    }

    #[test]
    fn reactivating_same_target_still_invalidates() {
        let mut board = SuggestionBoard::new(5);
        let first = board.activate("wardrobe", FetchMode::Full);
        let _second = board.activate("wardrobe", FetchMode::Full);
        assert!(!board.is_current(&first));
    }

    #[test]
    fn short_mode_shortens_and_falls_back() {
        let mode = FetchMode::Short { fallback: vec!["Gen Z".into(), "Founders".into()] };
        let mut board = SuggestionBoard::new(5);

        let t = board.activate("target_audience", mode.clone());
        board.apply(SuggestionEvent::Candidates(t, Ok(vec!["Busy  young parents".into(), "Busy young".into(), " ".into()])));
        assert_eq!(board.candidate_list(), ["Busy young".to_string()]);
        assert_eq!(*board.recommendation(), FetchStatus::Idle);
        assert!(!board.pending());

        let t = board.activate("target_audience", mode.clone());
        board.apply(SuggestionEvent::Candidates(t, Err("network".into())));
        assert_eq!(board.candidate_list(), ["Gen Z".to_string(), "Founders".to_string()]);

        let t = board.activate("target_audience", mode);
        board.apply(SuggestionEvent::Candidates(t, Ok(vec![])));
        assert_eq!(board.candidate_list().len(), 2);
    }

    #[test]
    fn full_mode_failure_is_unavailable_not_fatal() {
        let mut board = SuggestionBoard::new(5);
        let t = board.activate("wardrobe", FetchMode::Full);
        board.apply(SuggestionEvent::Candidates(t.clone(), Err("502".into())));
        board.apply(SuggestionEvent::Recommendation(t, Ok("  Casual denim ".into())));
        assert_eq!(*board.candidates(), FetchStatus::Unavailable("502".into()));
        assert_eq!(*board.recommendation(), FetchStatus::Ready("Casual denim".into()));
        assert!(board.candidate_list().is_empty());
    }

    #[test]
    fn normalize_dedupes_and_caps() {
        let raw: Vec<String> = ["a  b", "a b", "c", "d", "e", "f", "g"].iter().map(|s| s.to_string()).collect();
        assert_eq!(normalize_suggestions(&raw, None, 5), vec!["a b", "c", "d", "e", "f"]);
        assert!(normalize_suggestions(&raw, None, 0).is_empty());
    }

    #[test]
    fn dropdown_matching() {
        let options: Vec<String> = ["Instagram", "TikTok", "YouTube"].iter().map(|s| s.to_string()).collect();
        assert_eq!(match_option("Select TikTok - short-form fits Gen Z", &options), "TikTok");
        assert_eq!(match_option("Go with reels on insta", &options), "Go with reels on insta");
        assert_eq!(match_option("Pick You - long form", &options), "YouTube");
        assert_eq!(match_recommendation("tiktok", &options), "TikTok");
        assert_eq!(match_recommendation("YouTube Shorts", &options), "YouTube");
        assert_eq!(match_recommendation("Snapchat", &options), "Snapchat");
    }

    #[test]
    fn query_skips_blank_answers_and_empty_options() {
        let mut answers = AnswerStore::new();
        answers.set_answer("product_name", "Name", "GlowSerum");
        answers.set_answer("product_link", "Link", "  ");
        let q = query_for("Wardrobe", QuestionKind::Textarea, Some(vec![]), &answers);
        assert_eq!(q.previous_answers.len(), 1);
        assert!(q.options.is_none());
    }

    #[tokio::test]
    async fn results_arrive_independently_in_any_order() {
        let provider = Arc::new(Slow { list_delay_ms: 40, answer_delay_ms: 5, fail: false });
        let mut fetcher = SuggestionFetcher::new(provider);
        let mut board = SuggestionBoard::new(5);

        let t = board.activate("wardrobe", FetchMode::Full);
        fetcher.fetch(&t, &FetchMode::Full, q("Wardrobe"));

        let mut snapshots = Vec::new();
        settle(&mut fetcher, &mut board, |b| snapshots.push((b.candidates().is_loading(), b.recommendation().is_loading()))).await;

        // Recommendation landed first while the list was still loading.
        assert_eq!(snapshots, vec![(true, false), (false, false)]);
        assert_eq!(board.candidate_list(), ["Wardrobe idea".to_string()]);
        assert_eq!(*board.recommendation(), FetchStatus::Ready("best Wardrobe".into()));
    }

    #[tokio::test]
    async fn slow_result_for_previous_question_never_lands() {
        let provider = Arc::new(Slow { list_delay_ms: 30, answer_delay_ms: 30, fail: false });
        let mut fetcher = SuggestionFetcher::new(provider);
        let mut board = SuggestionBoard::new(5);

        let old = board.activate("wardrobe", FetchMode::Full);
        fetcher.fetch(&old, &FetchMode::Full, q("Wardrobe"));
        let new = board.activate("legal_disclaimers", FetchMode::Full);
        fetcher.fetch(&new, &FetchMode::Full, q("Legal"));

        settle(&mut fetcher, &mut board, |_| {}).await;
        assert_eq!(board.candidate_list(), ["Legal idea".to_string()]);
        assert_eq!(*board.recommendation(), FetchStatus::Ready("best Legal".into()));
    }

    #[tokio::test]
    async fn provider_failure_settles_board() {
        let provider = Arc::new(Slow { list_delay_ms: 1, answer_delay_ms: 1, fail: true });
        let mut fetcher = SuggestionFetcher::new(provider);
        let mut board = SuggestionBoard::new(5);
        let t = board.activate("wardrobe", FetchMode::Full);
        fetcher.fetch(&t, &FetchMode::Full, q("Wardrobe"));
        settle(&mut fetcher, &mut board, |_| {}).await;
        assert!(matches!(board.candidates(), FetchStatus::Unavailable(_)));
        assert!(!board.pending());
    }

    #[tokio::test]
    async fn off_mode_spawns_nothing() {
        let provider = Arc::new(Slow { list_delay_ms: 1, answer_delay_ms: 1, fail: false });
        let mut fetcher = SuggestionFetcher::new(provider);
        let mut board = SuggestionBoard::new(5);
        let t = board.activate("platform", FetchMode::Off);
        fetcher.fetch(&t, &FetchMode::Off, q("Platform"));
        assert!(!board.pending());
        settle(&mut fetcher, &mut board, |_| panic!("no updates expected")).await;
    }
}
