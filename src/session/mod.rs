//! One user's brief-building session: answers, scenes and flow position owned
//! together, with every mutation routed through here so cascades and the
//! completed-state freeze apply uniformly.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::locations::{LocationLookup, StaticLocations};
use crate::catalog::{self, Question, ResolvedOptions, StepId};
use crate::flow::{self, Blocked, FlowController, FlowState, StepStatus, Transition};
use crate::followup;
use crate::scenes::{self, Scene, SceneList};
use crate::store::{Answer, AnswerStore};
use crate::wire::{FollowUpQuestion, PreviousAnswer};

pub struct BriefSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    answers: AnswerStore,
    scenes: SceneList,
    flow: FlowController,
    follow_ups: Vec<FollowUpQuestion>,
    lookup: Box<dyn LocationLookup + Send + Sync>,
}

/// Serializable snapshot written alongside the rendered brief.
#[derive(Debug, Serialize)]
pub struct SessionRecord<'a> {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub saved_at: DateTime<Utc>,
    pub state: FlowState,
    pub answers: Vec<&'a Answer>,
    pub scenes: Vec<&'a Scene>,
    pub follow_ups: &'a [FollowUpQuestion],
}

impl Default for BriefSession {
    fn default() -> Self {
        Self::with_lookup(Box::new(StaticLocations))
    }
}

impl BriefSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lookup(lookup: Box<dyn LocationLookup + Send + Sync>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            answers: AnswerStore::new(),
            scenes: SceneList::new(),
            flow: FlowController::new(),
            follow_ups: Vec::new(),
            lookup,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn scenes(&self) -> &SceneList {
        &self.scenes
    }

    pub fn state(&self) -> FlowState {
        self.flow.state()
    }

    pub fn active_step(&self) -> Option<StepId> {
        self.flow.active_step()
    }

    pub fn is_complete(&self) -> bool {
        self.flow.is_complete()
    }

    fn frozen(&self, what: &str) -> bool {
        if self.flow.is_complete() {
            debug!(what, "ignoring mutation after completion");
            return true;
        }
        false
    }

    fn cascade(&mut self, question_id: &str) {
        for dep in catalog::dependents_of(question_id) {
            if self.answers.clear_answer(dep).is_some() {
                debug!(parent = question_id, cleared = dep, "cascading reset");
            }
        }
    }

    /// Upserts an answer. A changed value on a parent field clears its
    /// dependents in the same call. Returns false when ignored.
    pub fn set_answer(&mut self, question_id: &str, title: &str, value: &str) -> bool {
        if self.frozen("set_answer") {
            return false;
        }
        let changed = self.answers.value(question_id) != Some(value);
        self.answers.set_answer(question_id, title, value);
        if changed {
            self.cascade(question_id);
        }
        true
    }

    /// `set_answer` with the title taken from the catalog, scene ordinal or
    /// follow-up label.
    pub fn answer(&mut self, question_id: &str, value: &str) -> bool {
        let title = self.title_for(question_id);
        self.set_answer(question_id, &title, value)
    }

    /// Updates an existing answer only.
    pub fn update_answer(&mut self, question_id: &str, value: &str) -> bool {
        if self.frozen("update_answer") || self.answers.get_answer(question_id).is_none() {
            return false;
        }
        let changed = self.answers.value(question_id) != Some(value);
        self.answers.update_answer(question_id, value);
        if changed {
            self.cascade(question_id);
        }
        true
    }

    pub fn get_answer(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get_answer(question_id)
    }

    pub fn clear_answer(&mut self, question_id: &str) -> bool {
        if self.frozen("clear_answer") {
            return false;
        }
        let removed = self.answers.clear_answer(question_id).is_some();
        if removed {
            self.cascade(question_id);
        }
        removed
    }

    pub fn title_for(&self, question_id: &str) -> String {
        if let Some(q) = catalog::question(question_id) {
            return q.title.to_string();
        }
        if let Some(n) = self.scenes.ordinal(question_id) {
            return scenes::scene_title(n);
        }
        self.follow_ups
            .iter()
            .find(|f| f.id == question_id)
            .map(|f| f.label.clone())
            .unwrap_or_else(|| question_id.to_string())
    }

    pub fn add_scene(&mut self) -> Option<String> {
        if self.frozen("add_scene") {
            return None;
        }
        Some(self.scenes.add_scene())
    }

    pub fn remove_scene(&mut self, id: &str) -> bool {
        if self.frozen("remove_scene") {
            return false;
        }
        self.scenes.remove_scene(id, &mut self.answers)
    }

    pub fn update_scene(&mut self, id: &str, content: &str) -> bool {
        if self.frozen("update_scene") || self.scenes.get(id).is_none() {
            return false;
        }
        self.scenes.update_scene_content(id, content, &mut self.answers);
        true
    }

    pub fn advance(&mut self) -> Transition {
        let t = self.flow.advance(&self.answers, &self.scenes);
        debug!(?t, "advance");
        t
    }

    /// Moves back one step; stays put on the first step.
    pub fn back(&mut self) -> Transition {
        let Some(step) = self.flow.active_step() else {
            return Transition::Blocked(Blocked::AlreadyComplete);
        };
        let prev = StepId::from_number(step.number() - 1).unwrap_or(step);
        self.go_to(prev)
    }

    pub fn go_to(&mut self, target: StepId) -> Transition {
        self.flow.go_to(target)
    }

    pub fn complete(&mut self) -> Transition {
        self.flow.complete(&self.answers, &self.scenes)
    }

    /// Back to a fresh session with a new id.
    pub fn reset(&mut self) {
        self.id = Uuid::new_v4();
        self.started_at = Utc::now();
        self.answers.clear();
        self.scenes = SceneList::new();
        self.flow.reset();
        self.follow_ups.clear();
    }

    /// First required unanswered question of the active step.
    pub fn active_question(&self) -> Option<&'static Question> {
        let step = self.flow.active_step()?;
        flow::active_question(step, &self.answers, &self.scenes)
    }

    pub fn pending_optional(&self) -> Vec<&'static Question> {
        match self.flow.active_step() {
            Some(step) => flow::pending_optional(step, &self.answers),
            None => Vec::new(),
        }
    }

    pub fn step_status(&self, step: StepId) -> StepStatus {
        flow::step_status(step, &self.answers, &self.scenes)
    }

    /// Required questions answered across every step.
    pub fn progress(&self) -> (usize, usize) {
        StepId::ALL.iter().fold((0, 0), |(answered, required), step| {
            let s = self.step_status(*step);
            (answered + s.answered, required + s.required)
        })
    }

    pub fn options_for(&self, q: &Question) -> ResolvedOptions {
        catalog::resolve_options(q, &self.answers, self.lookup.as_ref())
    }

    /// Filled answers in the order they were first given.
    pub fn previous_answers(&self) -> Vec<PreviousAnswer> {
        self.answers.iter().filter(|a| a.is_filled()).map(PreviousAnswer::from).collect()
    }

    pub fn follow_ups_available(&self) -> bool {
        !self.flow.is_complete() && self.step_status(StepId::Basics).is_complete()
    }

    /// Sanitizes and appends a generated batch; returns sanitizer warnings.
    pub fn accept_follow_ups(&mut self, batch: Vec<FollowUpQuestion>) -> Vec<String> {
        if self.frozen("accept_follow_ups") {
            return Vec::new();
        }
        let offered: Vec<String> = self.follow_ups.iter().map(|f| f.id.clone()).collect();
        let (clean, warnings) = followup::sanitize(batch, &self.answers.ids(), &offered);
        self.follow_ups.extend(clean);
        warnings
    }

    pub fn follow_ups(&self) -> &[FollowUpQuestion] {
        &self.follow_ups
    }

    pub fn pending_follow_ups(&self) -> Vec<&FollowUpQuestion> {
        self.follow_ups.iter().filter(|f| !self.answers.is_answered(&f.id)).collect()
    }

    pub fn record(&self) -> SessionRecord<'_> {
        SessionRecord {
            session_id: self.id,
            started_at: self.started_at,
            saved_at: Utc::now(),
            state: self.flow.state(),
            answers: self.answers.iter().collect(),
            scenes: self.scenes.iter().collect(),
            follow_ups: &self.follow_ups,
        }
    }
}
