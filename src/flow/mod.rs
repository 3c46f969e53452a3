//! Step-level state machine: which step is active, whether it may be left, and
//! when the brief is complete.

use serde::Serialize;
use tracing::debug;

use crate::catalog::{self, Question, QuestionKind, StepId};
use crate::scenes::SceneList;
use crate::store::AnswerStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "step", rename_all = "snake_case")]
pub enum FlowState {
    InProgress(StepId),
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocked {
    /// Required questions of the active step are unanswered.
    StepIncomplete { missing: Vec<&'static str> },
    /// Scenes 1 and 2 are not both filled.
    ScenesIncomplete,
    NothingAnswered,
    NotAtFinalStep,
    AlreadyComplete,
}

/// Outcome of a navigation request. `Blocked` leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Moved { from: StepId, to: StepId },
    Completed,
    Blocked(Blocked),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepStatus {
    pub step: StepId,
    pub required: usize,
    pub answered: usize,
    pub missing: Vec<&'static str>,
}

impl StepStatus {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Scene-type questions are answered through the scene gate, everything else
/// through a non-empty trimmed answer.
pub fn is_answered(q: &Question, answers: &AnswerStore, scenes: &SceneList) -> bool {
    match q.kind {
        QuestionKind::Scene => scenes.gate_satisfied(),
        _ => answers.is_answered(q.id),
    }
}

pub fn step_status(step: StepId, answers: &AnswerStore, scenes: &SceneList) -> StepStatus {
    let required: Vec<_> = catalog::effective_sequence(step, answers)
        .into_iter()
        .filter(|q| q.required)
        .collect();
    let missing: Vec<_> = required
        .iter()
        .filter(|q| !is_answered(q, answers, scenes))
        .map(|q| q.id)
        .collect();
    StepStatus { step, required: required.len(), answered: required.len() - missing.len(), missing }
}

/// First required question of the step still unanswered.
pub fn active_question(step: StepId, answers: &AnswerStore, scenes: &SceneList) -> Option<&'static Question> {
    catalog::effective_sequence(step, answers)
        .into_iter()
        .find(|q| q.required && !is_answered(q, answers, scenes))
}

/// Optional questions of the step that have no answer yet.
pub fn pending_optional(step: StepId, answers: &AnswerStore) -> Vec<&'static Question> {
    catalog::effective_sequence(step, answers)
        .into_iter()
        .filter(|q| !q.required && !answers.is_answered(q.id))
        .collect()
}

#[derive(Debug, Clone)]
pub struct FlowController {
    state: FlowState,
}

impl Default for FlowController {
    fn default() -> Self {
        Self { state: FlowState::InProgress(StepId::first()) }
    }
}

impl FlowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn active_step(&self) -> Option<StepId> {
        match self.state {
            FlowState::InProgress(step) => Some(step),
            FlowState::Complete => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == FlowState::Complete
    }

    /// Moves to the next step once the active one is complete; from the final
    /// step this completes the flow.
    pub fn advance(&mut self, answers: &AnswerStore, scenes: &SceneList) -> Transition {
        let FlowState::InProgress(step) = self.state else {
            return Transition::Blocked(Blocked::AlreadyComplete);
        };
        let status = step_status(step, answers, scenes);
        if !status.is_complete() {
            let blocked = if status.missing.contains(&catalog::SCENES_ID) {
                Blocked::ScenesIncomplete
            } else {
                Blocked::StepIncomplete { missing: status.missing }
            };
            debug!(%step, ?blocked, "advance blocked");
            return Transition::Blocked(blocked);
        }
        match step.next() {
            Some(next) => {
                self.state = FlowState::InProgress(next);
                Transition::Moved { from: step, to: next }
            }
            None => self.complete(answers, scenes),
        }
    }

    /// Jumps to any step, answered or not.
    pub fn go_to(&mut self, target: StepId) -> Transition {
        match self.state {
            FlowState::Complete => Transition::Blocked(Blocked::AlreadyComplete),
            FlowState::InProgress(from) => {
                self.state = FlowState::InProgress(target);
                Transition::Moved { from, to: target }
            }
        }
    }

    /// Finishes the flow from the final step, provided something was answered.
    pub fn complete(&mut self, answers: &AnswerStore, scenes: &SceneList) -> Transition {
        let FlowState::InProgress(step) = self.state else {
            return Transition::Blocked(Blocked::AlreadyComplete);
        };
        if !step.is_terminal() {
            return Transition::Blocked(Blocked::NotAtFinalStep);
        }
        let status = step_status(step, answers, scenes);
        if !status.is_complete() {
            return Transition::Blocked(Blocked::StepIncomplete { missing: status.missing });
        }
        if answers.is_empty() {
            return Transition::Blocked(Blocked::NothingAnswered);
        }
        self.state = FlowState::Complete;
        Transition::Completed
    }

    pub fn reset(&mut self) {
        self.state = FlowState::InProgress(StepId::first());
    }
}
