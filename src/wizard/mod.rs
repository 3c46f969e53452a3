//! Interactive driver. Reads commands line by line, applies them to the
//! session, and renders suggestion results as they land without ever waiting
//! on them before accepting input.

use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::catalog::{self, AiHint, Question, QuestionKind, ResolvedOptions, StepId};
use crate::flow::Transition;
use crate::followup;
use crate::provider::{SuggestionProvider, SummaryRenderer};
use crate::scenes::{self, MIN_SCENES};
use crate::session::BriefSession;
use crate::suggest::{self, FetchMode, FetchStatus, SuggestionBoard, SuggestionEvent, SuggestionFetcher};
use crate::summary;
use crate::ux;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Answer(String),
    /// 1-based index into the shown suggestions.
    PickSuggestion(usize),
    AcceptRecommendation,
    Next,
    Back,
    GoTo(StepId),
    Edit(String),
    Skip,
    SceneAdd,
    SceneRemove(usize),
    SceneEdit(usize),
    More,
    Preview,
    Reset,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Answer(line.to_string());
    };
    let mut parts = rest.split_whitespace();
    let head = parts.next().unwrap_or("").to_lowercase();
    let arg = parts.collect::<Vec<_>>().join(" ");

    if let Ok(n) = head.parse::<usize>() {
        return if n == 0 { Command::Invalid("suggestions are numbered from 1".into()) } else { Command::PickSuggestion(n) };
    }
    match (head.as_str(), arg.as_str()) {
        ("a" | "accept", "") => Command::AcceptRecommendation,
        ("n" | "next", "") => Command::Next,
        ("b" | "back", "") => Command::Back,
        ("goto" | "go", target) if !target.is_empty() => match target.parse::<StepId>() {
            Ok(step) => Command::GoTo(step),
            Err(e) => Command::Invalid(e),
        },
        ("edit", id) if !id.is_empty() => Command::Edit(id.to_string()),
        ("skip" | "s", "") => Command::Skip,
        ("scene", "add") => Command::SceneAdd,
        ("scene", arg) => {
            let words: Vec<&str> = arg.split_whitespace().collect();
            match words.as_slice() {
                ["rm" | "remove", n] => n.parse().map(Command::SceneRemove).unwrap_or_else(|_| Command::Invalid(format!("not a scene number: {n}"))),
                [n] => n.parse().map(Command::SceneEdit).unwrap_or_else(|_| Command::Invalid(format!("unknown scene command: {arg}"))),
                _ => Command::Invalid("usage: :scene add | :scene rm N | :scene N".into()),
            }
        }
        ("more", "") => Command::More,
        ("preview" | "p", "") => Command::Preview,
        ("reset", "") => Command::Reset,
        ("help" | "h" | "?", "") => Command::Help,
        ("quit" | "q" | "exit", "") => Command::Quit,
        _ => Command::Invalid(format!("unknown command :{rest}")),
    }
}

/// Maps typed dropdown input (an option number or text) onto an option.
pub fn resolve_dropdown_input(input: &str, opts: &ResolvedOptions) -> Result<String, String> {
    if !opts.enabled {
        return Err(opts.options.first().cloned().unwrap_or_else(|| "no options available".into()));
    }
    if let Ok(n) = input.trim().parse::<usize>() {
        return match n.checked_sub(1).and_then(|i| opts.options.get(i)) {
            Some(o) => Ok(o.clone()),
            None => Err(format!("pick a number between 1 and {}", opts.options.len())),
        };
    }
    let matched = suggest::match_option(input.trim(), &opts.options);
    if opts.options.contains(&matched) {
        Ok(matched)
    } else {
        Err("pick one of the listed options".into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Question(&'static Question),
    Scene(String),
    FollowUp(String),
}

impl Target {
    fn id(&self) -> &str {
        match self {
            Target::Question(q) => q.id,
            Target::Scene(id) | Target::FollowUp(id) => id,
        }
    }

    fn kind(&self) -> QuestionKind {
        match self {
            Target::Question(q) => q.kind,
            Target::Scene(_) => QuestionKind::Scene,
            Target::FollowUp(_) => QuestionKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WizardOptions {
    pub suggestions: bool,
    pub follow_ups: bool,
    pub max_suggestions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed { brief: String },
    Quit,
}

pub struct Wizard {
    session: BriefSession,
    board: SuggestionBoard,
    fetcher: Option<SuggestionFetcher>,
    renderer: Arc<dyn SummaryRenderer>,
    opts: WizardOptions,
    override_target: Option<Target>,
    skipped: HashSet<String>,
    shown_step: Option<StepId>,
    shown_target: Option<Target>,
}

async fn next_suggestion(fetcher: &mut Option<SuggestionFetcher>) -> Option<SuggestionEvent> {
    match fetcher {
        Some(f) => f.next_event().await,
        None => std::future::pending().await,
    }
}

impl Wizard {
    pub fn new(
        session: BriefSession,
        provider: Option<Arc<dyn SuggestionProvider>>,
        renderer: Arc<dyn SummaryRenderer>,
        opts: WizardOptions,
    ) -> Self {
        Self {
            session,
            board: SuggestionBoard::new(opts.max_suggestions),
            fetcher: provider.map(SuggestionFetcher::new),
            renderer,
            opts,
            override_target: None,
            skipped: HashSet::new(),
            shown_step: None,
            shown_target: None,
        }
    }

    pub fn session(&self) -> &BriefSession {
        &self.session
    }

    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<Outcome> {
        let mut lines = input.lines();
        ux::print_help();
        loop {
            self.refresh();
            ux::print_prompt();

            let line = loop {
                tokio::select! {
                    line = lines.next_line() => break line?,
                    Some(event) = next_suggestion(&mut self.fetcher), if self.board.pending() => {
                        if self.board.apply(event) {
                            if let Some(t) = &self.shown_target {
                                ux::print_suggestions(&self.board, t.kind());
                                ux::print_prompt();
                            }
                        }
                    }
                }
            };
            let Some(line) = line else {
                debug!("input closed");
                return Ok(Outcome::Quit);
            };

            match parse_command(&line) {
                Command::Quit => return Ok(Outcome::Quit),
                cmd => {
                    if let Some(outcome) = self.handle(cmd).await? {
                        return Ok(outcome);
                    }
                }
            }
        }
    }

    /// Prints the step header and the current target when either changed, and
    /// starts suggestion fetches for a newly shown target.
    fn refresh(&mut self) {
        let Some(step) = self.session.active_step() else { return };
        if self.shown_step != Some(step) {
            self.shown_step = Some(step);
            self.shown_target = None;
            ux::print_step_header(step, &self.session.step_status(step), self.session.progress());
            if step.is_terminal() {
                ux::print_preview_dashboard(&summary::preview(self.session.answers()), self.session.progress());
                ux::print_info("type :next to generate the brief, or :goto <step> to revise");
            }
        }

        let target = self.current_target();
        if target == self.shown_target {
            return;
        }
        match &target {
            Some(t) => {
                self.render_target(t);
                self.activate(t);
            }
            None => {
                self.board.deactivate();
                if !step.is_terminal() {
                    ux::print_info("step complete, :next to continue or :edit <id> to revise");
                }
            }
        }
        self.shown_target = target;
    }

    fn current_target(&self) -> Option<Target> {
        if let Some(t) = &self.override_target {
            return Some(t.clone());
        }
        if let Some(q) = self.session.active_question() {
            if q.kind == QuestionKind::Scene {
                let scene = self.session.scenes().first_unfilled_required()?;
                return Some(Target::Scene(scene.id.clone()));
            }
            return Some(Target::Question(q));
        }
        if let Some(q) = self.session.pending_optional().into_iter().find(|q| !self.skipped.contains(q.id)) {
            return Some(Target::Question(q));
        }
        self.session
            .pending_follow_ups()
            .into_iter()
            .find(|f| !self.skipped.contains(&f.id))
            .map(|f| Target::FollowUp(f.id.clone()))
    }

    fn render_target(&self, target: &Target) {
        let current = self.session.get_answer(target.id()).map(|a| a.value.as_str());
        match target {
            Target::Question(q) => {
                let opts = (q.kind == QuestionKind::Dropdown).then(|| self.session.options_for(q));
                ux::print_question(q, opts.as_ref(), current);
            }
            Target::Scene(id) => {
                if let (Some(n), Some(scene)) = (self.session.scenes().ordinal(id), self.session.scenes().get(id)) {
                    ux::print_scene(n, scene, n <= MIN_SCENES);
                }
            }
            Target::FollowUp(id) => {
                let list: Vec<_> = self.session.follow_ups().iter().filter(|f| f.id == *id).collect();
                ux::print_follow_ups(&list);
            }
        }
    }

    fn activate(&mut self, target: &Target) {
        let (mode, title, options) = match target {
            Target::Question(q) => {
                let title = match q.ai {
                    AiHint::Short { prompt, .. } => prompt.to_string(),
                    _ => q.title.to_string(),
                };
                let options = (q.kind == QuestionKind::Dropdown)
                    .then(|| self.session.options_for(q))
                    .filter(|o| o.enabled)
                    .map(|o| o.options);
                (FetchMode::from(q.ai), title, options)
            }
            Target::Scene(id) => (FetchMode::Full, self.session.title_for(id), None),
            Target::FollowUp(id) => (FetchMode::Off, self.session.title_for(id), None),
        };
        let mode = if self.opts.suggestions && self.fetcher.is_some() { mode } else { FetchMode::Off };
        let ticket = self.board.activate(target.id(), mode.clone());
        if let Some(fetcher) = &self.fetcher {
            let query = suggest::query_for(&title, target.kind(), options, self.session.answers());
            fetcher.fetch(&ticket, &mode, query);
        }
    }

    fn invalidate(&mut self) {
        self.shown_step = None;
        self.shown_target = None;
    }

    fn is_optional(&self, target: &Target) -> bool {
        match target {
            Target::Question(q) => !q.required,
            Target::Scene(id) => self.session.scenes().ordinal(id).is_some_and(|n| n > MIN_SCENES),
            Target::FollowUp(_) => true,
        }
    }

    /// Stores a value for the target. Returns false when the value was refused.
    fn store(&mut self, target: &Target, value: &str, from_suggestion: bool) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        match target {
            Target::Question(q) if q.kind == QuestionKind::Dropdown => {
                let opts = self.session.options_for(q);
                let resolved = if from_suggestion && opts.enabled {
                    Ok(suggest::match_option(value, &opts.options))
                } else {
                    resolve_dropdown_input(value, &opts)
                };
                match resolved {
                    Ok(v) => self.session.answer(q.id, &v),
                    Err(msg) => {
                        ux::print_muted(&msg);
                        false
                    }
                }
            }
            Target::Question(q) => self.session.answer(q.id, value),
            Target::Scene(id) => self.session.update_scene(id, value),
            Target::FollowUp(id) => self.session.answer(id, value),
        }
    }

    async fn submit(&mut self, value: &str, from_suggestion: bool) -> Result<Option<Outcome>> {
        let Some(target) = self.current_target() else {
            ux::print_muted("nothing to answer here; :next, :goto <step> or :edit <id>");
            return Ok(None);
        };
        if !self.store(&target, value, from_suggestion) {
            return Ok(None);
        }
        if self.override_target.take().is_some() {
            return Ok(None);
        }
        self.settle_step().await
    }

    /// Moves on once the active step has nothing left to ask.
    async fn settle_step(&mut self) -> Result<Option<Outcome>> {
        let open = self.session.active_step().is_some_and(|s| !s.is_terminal());
        if open && self.current_target().is_none() {
            return self.advance().await;
        }
        Ok(None)
    }

    async fn advance(&mut self) -> Result<Option<Outcome>> {
        match self.session.advance() {
            Transition::Moved { to, .. } => {
                self.override_target = None;
                debug!(%to, "moved");
                Ok(None)
            }
            Transition::Completed => Ok(Some(self.finish().await)),
            Transition::Blocked(b) => {
                ux::print_blocked(&b);
                Ok(None)
            }
        }
    }

    /// Renders the brief once; a failing renderer falls back to local rendering.
    async fn finish(&mut self) -> Outcome {
        self.board.deactivate();
        let answers = self.session.previous_answers();
        let spinner = ux::spinner("writing the brief...");
        let rendered = self.renderer.generate_summary(&answers).await;
        spinner.finish_and_clear();
        let brief = match rendered {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "summary renderer failed, rendering locally");
                ux::print_muted("brief service unavailable, rendered locally");
                summary::render_markdown(&summary::preview(self.session.answers()))
            }
        };
        ux::print_brief(&brief);
        Outcome::Completed { brief }
    }

    async fn more_questions(&mut self) {
        let Some(provider) = self.fetcher.as_ref().map(|f| f.provider()).filter(|_| self.opts.follow_ups) else {
            ux::print_muted("additional questions are disabled");
            return;
        };
        if !self.session.follow_ups_available() {
            ux::print_muted("finish the basics step first");
            return;
        }
        let req = followup::request_for(self.session.answers());
        let spinner = ux::spinner("thinking of more questions...");
        let result = provider.generate_follow_up_questions(&req).await;
        spinner.finish_and_clear();
        match result {
            Ok(list) => {
                let warnings = self.session.accept_follow_ups(list);
                ux::print_warnings("Follow-up warnings:", &warnings);
                ux::print_follow_ups(&self.session.pending_follow_ups());
                self.shown_target = None;
            }
            Err(e) => {
                warn!(error = %e, "follow-up generation failed");
                ux::print_muted("additional questions unavailable right now");
            }
        }
    }

    async fn handle(&mut self, cmd: Command) -> Result<Option<Outcome>> {
        match cmd {
            Command::Answer(text) => return self.submit(&text, false).await,
            Command::Empty => {
                if let Some(t) = self.current_target().filter(|t| self.is_optional(t)) {
                    self.skip(&t);
                    return self.settle_step().await;
                }
            }
            Command::PickSuggestion(n) => {
                let pick = match self.current_target() {
                    Some(Target::FollowUp(id)) => self
                        .session
                        .follow_ups()
                        .iter()
                        .find(|f| f.id == id)
                        .and_then(|f| f.suggestions.get(n - 1).cloned()),
                    _ => self.board.candidate_list().get(n - 1).cloned(),
                };
                match pick {
                    Some(value) => return self.submit(&value, true).await,
                    None => ux::print_muted(&format!("no suggestion {n}")),
                }
            }
            Command::AcceptRecommendation => {
                let rec = match self.board.recommendation() {
                    FetchStatus::Ready(s) if !s.is_empty() => Some(s.clone()),
                    _ => None,
                };
                match (rec, self.current_target()) {
                    (Some(rec), Some(Target::Question(q))) if q.kind == QuestionKind::Dropdown => {
                        let opts = self.session.options_for(q);
                        let value = suggest::match_recommendation(&rec, &opts.options);
                        return self.submit(&value, true).await;
                    }
                    (Some(rec), Some(_)) => return self.submit(&rec, true).await,
                    _ => ux::print_muted("no recommendation yet"),
                }
            }
            Command::Next => return self.advance().await,
            Command::Back => {
                self.override_target = None;
                self.skipped.clear();
                self.session.back();
            }
            Command::GoTo(step) => {
                self.override_target = None;
                self.skipped.clear();
                if let Transition::Blocked(b) = self.session.go_to(step) {
                    ux::print_blocked(&b);
                }
            }
            Command::Edit(id) => match self.edit_target(&id) {
                Some(t) => {
                    if let Some(step) = catalog::step_of(&id).filter(|s| Some(*s) != self.session.active_step()) {
                        ux::print_muted(&format!("editing {id} from the {step} step"));
                    }
                    self.override_target = Some(t);
                }
                None => ux::print_muted(&format!("nothing to edit for '{id}'")),
            },
            Command::Skip => match self.current_target() {
                Some(t) if self.is_optional(&t) => {
                    self.skip(&t);
                    return self.settle_step().await;
                }
                Some(_) => ux::print_muted("this question is required"),
                None => {}
            },
            Command::SceneAdd | Command::SceneRemove(_) | Command::SceneEdit(_)
                if self.session.active_step() != Some(StepId::ContentRequirements) =>
            {
                ux::print_muted("scenes live in the content requirements step");
            }
            Command::SceneAdd => {
                if let Some(id) = self.session.add_scene() {
                    self.override_target = Some(Target::Scene(id));
                }
            }
            Command::SceneRemove(n) => {
                let id = scenes::scene_id(n);
                if self.session.remove_scene(&id) {
                    ux::print_info(&format!("removed scene {n}, {} left", self.session.scenes().len()));
                    self.override_target = None;
                    self.shown_target = None;
                } else {
                    ux::print_muted(&format!("scene {n} cannot be removed (at least {MIN_SCENES} are kept)"));
                }
            }
            Command::SceneEdit(n) => {
                let id = scenes::scene_id(n);
                if self.session.scenes().get(&id).is_some() {
                    self.override_target = Some(Target::Scene(id));
                } else {
                    ux::print_muted(&format!("no scene {n}"));
                }
            }
            Command::More => self.more_questions().await,
            Command::Preview => {
                ux::print_preview_dashboard(&summary::preview(self.session.answers()), self.session.progress());
            }
            Command::Reset => {
                self.session.reset();
                self.override_target = None;
                self.skipped.clear();
                self.board.deactivate();
                self.invalidate();
                ux::print_info("started over");
            }
            Command::Help => ux::print_help(),
            Command::Invalid(msg) => ux::print_muted(&msg),
            Command::Quit => return Ok(Some(Outcome::Quit)),
        }
        Ok(None)
    }

    fn skip(&mut self, target: &Target) {
        self.skipped.insert(target.id().to_string());
        if self.override_target.as_ref() == Some(target) {
            self.override_target = None;
        }
    }

    fn edit_target(&self, id: &str) -> Option<Target> {
        if id == catalog::SCENES_ID {
            return None;
        }
        if let Some(q) = catalog::question(id) {
            return Some(Target::Question(q));
        }
        if self.session.scenes().get(id).is_some() {
            return Some(Target::Scene(id.to_string()));
        }
        self.session
            .follow_ups()
            .iter()
            .any(|f| f.id == id)
            .then(|| Target::FollowUp(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{FollowUpKind, FollowUpQuestion, FollowUpRequest, PreviousAnswer, SuggestionQuery};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Quiet;

    #[async_trait]
    impl SuggestionProvider for Quiet {
        async fn get_suggestions(&self, _q: &SuggestionQuery) -> Result<Vec<String>> {
            Err(anyhow!("offline"))
        }

        async fn get_answer_suggestion(&self, _q: &SuggestionQuery) -> Result<String> {
            Err(anyhow!("offline"))
        }

        async fn generate_follow_up_questions(&self, _req: &FollowUpRequest) -> Result<Vec<FollowUpQuestion>> {
            Ok(vec![FollowUpQuestion {
                id: "budget".into(),
                label: "Budget range?".into(),
                placeholder: String::new(),
                kind: FollowUpKind::Text,
                suggestions: vec!["$1k".into(), "$5k".into()],
                answer: String::new(),
            }])
        }
    }

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SummaryRenderer for Counting {
        async fn generate_summary(&self, answers: &[PreviousAnswer]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("502"));
            }
            Ok(format!("brief with {} answers", answers.len()))
        }
    }

    fn wizard(renderer: Arc<Counting>) -> Wizard {
        let opts = WizardOptions { suggestions: true, follow_ups: true, max_suggestions: 5 };
        Wizard::new(BriefSession::new(), Some(Arc::new(Quiet)), renderer, opts)
    }

    const FULL_RUN: &str = "\
serum
dull skin
GlowSerum
organic
Gen Z
launch
Minimal
growth
:more
Brightens in a week
:skip
:2
1
1
1
2
1
1
1
A morning routine
Pour and smile
Scene one: unboxing
Scene two: applying
Link in bio
:skip
1
Casual
No logos
None
:next
";

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  GlowSerum "), Command::Answer("GlowSerum".into()));
        assert_eq!(parse_command(":3"), Command::PickSuggestion(3));
        assert!(matches!(parse_command(":0"), Command::Invalid(_)));
        assert_eq!(parse_command(":a"), Command::AcceptRecommendation);
        assert_eq!(parse_command(":goto video_information"), Command::GoTo(StepId::VideoInformation));
        assert_eq!(parse_command(":goto 4"), Command::GoTo(StepId::ContentRequirements));
        assert!(matches!(parse_command(":goto 9"), Command::Invalid(_)));
        assert_eq!(parse_command(":scene add"), Command::SceneAdd);
        assert_eq!(parse_command(":scene rm 3"), Command::SceneRemove(3));
        assert_eq!(parse_command(":scene 2"), Command::SceneEdit(2));
        assert!(matches!(parse_command(":scene rm x"), Command::Invalid(_)));
        assert_eq!(parse_command(":edit wardrobe"), Command::Edit("wardrobe".into()));
        assert_eq!(parse_command(":Quit"), Command::Quit);
        assert_eq!(parse_command("   "), Command::Empty);
        assert!(matches!(parse_command(":dance"), Command::Invalid(_)));
    }

    #[test]
    fn dropdown_input_resolution() {
        let opts = ResolvedOptions { options: vec!["Yes".into(), "No".into()], enabled: true };
        assert_eq!(resolve_dropdown_input("2", &opts), Ok("No".into()));
        assert_eq!(resolve_dropdown_input("yes please", &opts), Ok("Yes".into()));
        assert!(resolve_dropdown_input("3", &opts).is_err());
        assert!(resolve_dropdown_input("maybe", &opts).is_err());

        let disabled = ResolvedOptions { options: vec!["Please select a country first".into()], enabled: false };
        assert_eq!(resolve_dropdown_input("1", &disabled), Err("Please select a country first".into()));
    }

    #[tokio::test]
    async fn scripted_run_completes_and_renders_once() {
        let renderer = Arc::new(Counting::default());
        let mut w = wizard(renderer.clone());
        let outcome = w.run(FULL_RUN.as_bytes()).await.unwrap();

        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(outcome, Outcome::Completed { ref brief } if brief.starts_with("brief with")));
        let s = w.session();
        assert!(s.is_complete());
        assert_eq!(s.get_answer("main_problem").map(|a| a.value.as_str()), Some("dull skin"));
        assert_eq!(s.get_answer("budget").map(|a| a.value.as_str()), Some("$5k"));
        assert_eq!(s.get_answer("aspect_ratio").map(|a| a.value.as_str()), Some("4:5 (Instagram Feed)"));
        assert_eq!(s.get_answer("scene_2").map(|a| a.question_title.as_str()), Some("Scene 2"));
        assert!(s.get_answer("product_link").is_none());
        assert!(s.get_answer("city").is_some());
    }

    #[tokio::test]
    async fn failing_renderer_falls_back_to_local_brief() {
        let renderer = Arc::new(Counting { fail: true, ..Default::default() });
        let mut w = wizard(renderer.clone());
        let outcome = w.run(FULL_RUN.as_bytes()).await.unwrap();
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
        match outcome {
            Outcome::Completed { brief } => assert!(brief.contains("### Video Script")),
            Outcome::Quit => panic!("expected completion"),
        }
    }

    #[tokio::test]
    async fn scene_step_blocks_until_two_scenes() {
        let renderer = Arc::new(Counting::default());
        let mut w = wizard(renderer.clone());
        let script = ":goto 4\nOverview\nOpener\nOnly one scene\n:next\n:quit\n";
        assert_eq!(w.run(script.as_bytes()).await.unwrap(), Outcome::Quit);
        assert_eq!(w.session().active_step(), Some(StepId::ContentRequirements));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scenes_can_be_added_edited_and_removed() {
        let mut w = wizard(Arc::new(Counting::default()));
        let script = ":goto 4\n:scene add\nBonus outro\n:scene rm 1\n:scene rm 3\n:scene rm 1\n:quit\n";
        w.run(script.as_bytes()).await.unwrap();
        let s = w.session();
        assert_eq!(s.scenes().len(), 2);
        // Removing scene 1 renumbered the outro to scene 2; the floor stopped the last removal.
        assert_eq!(s.get_answer("scene_2").map(|a| a.value.as_str()), Some("Bonus outro"));
        assert!(s.get_answer("scene_3").is_none());
    }

    #[tokio::test]
    async fn scene_commands_only_work_on_the_scene_step() {
        let mut w = wizard(Arc::new(Counting::default()));
        let script = ":scene add\n:scene 1\n:scene rm 2\nserum\n:quit\n";
        w.run(script.as_bytes()).await.unwrap();
        let s = w.session();
        assert_eq!(s.scenes().len(), 2);
        assert!(s.get_answer("scene_1").is_none());
        assert_eq!(s.get_answer("product_description").map(|a| a.value.as_str()), Some("serum"));
        assert_eq!(s.active_step(), Some(StepId::Basics));
    }

    #[tokio::test]
    async fn location_dropdowns_cascade_through_wizard() {
        let mut w = wizard(Arc::new(Counting::default()));
        let script = ":goto 3\n1\n1\n1\n1\n1\n1\n1\n:edit country\n2\n:quit\n";
        w.run(script.as_bytes()).await.unwrap();
        let s = w.session();
        assert!(s.get_answer("country").is_some());
        assert!(s.get_answer("state").is_none());
        assert!(s.get_answer("city").is_none());
        // The edit happened after the step auto-advanced.
        assert_eq!(s.active_step(), Some(StepId::ContentRequirements));
    }

    #[tokio::test]
    async fn eof_quits_without_rendering() {
        let renderer = Arc::new(Counting::default());
        let mut w = wizard(renderer.clone());
        assert_eq!(w.run("serum\n".as_bytes()).await.unwrap(), Outcome::Quit);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
        assert!(!w.session().is_complete());
    }
}
