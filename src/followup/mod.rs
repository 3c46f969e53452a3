use std::collections::HashSet;

use crate::catalog;
use crate::store::AnswerStore;
use crate::wire::{FollowUpQuestion, FollowUpRequest, PreviousAnswer};

pub const MIN_FOLLOW_UPS: usize = 3;
pub const MAX_FOLLOW_UPS: usize = 6;

/// Request payload listing every filled answer and every answered id.
pub fn request_for(answers: &AnswerStore) -> FollowUpRequest {
    let filled: Vec<_> = answers.iter().filter(|a| a.is_filled()).collect();
    FollowUpRequest {
        previous_answers: filled.iter().map(|a| PreviousAnswer::from(*a)).collect(),
        answered_question_ids: filled.iter().map(|a| a.question_id.clone()).collect(),
    }
}

/// Ids a follow-up may not take: catalog questions, the scene block and
/// every `scene_N` slot. Answering any of those goes through cascades or
/// scene mirroring.
pub fn is_reserved(id: &str) -> bool {
    if id == catalog::SCENES_ID || catalog::question(id).is_some() {
        return true;
    }
    id.strip_prefix("scene_")
        .map(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Cleans a model-generated follow-up list.
/// - Questions without a label are dropped
/// - Ids already answered, already offered, or repeated within the list are dropped
/// - Blank and reserved ids get the next free `q_extra_{n}`, counting on from
///   the follow-ups already offered
/// - At most `MAX_FOLLOW_UPS` are kept
pub fn sanitize(
    list: Vec<FollowUpQuestion>,
    answered_ids: &[String],
    existing_ids: &[String],
) -> (Vec<FollowUpQuestion>, Vec<String>) {
    let mut warnings = Vec::new();
    let answered: HashSet<&str> = answered_ids.iter().map(String::as_str).collect();
    let existing: HashSet<&str> = existing_ids.iter().map(String::as_str).collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<FollowUpQuestion> = Vec::new();
    let mut next_extra = existing_ids.len() + 1;

    for mut q in list {
        q.id = q.id.trim().to_string();
        q.label = q.label.trim().to_string();
        if q.label.is_empty() {
            let shown = if q.id.is_empty() { "(blank id)" } else { q.id.as_str() };
            warnings.push(format!("dropped follow-up {shown} (no label)"));
            continue;
        }
        if answered.contains(q.id.as_str()) {
            warnings.push(format!("dropped follow-up {} (already answered)", q.id));
            continue;
        }
        if existing.contains(q.id.as_str()) {
            warnings.push(format!("dropped follow-up {} (already offered)", q.id));
            continue;
        }
        if q.id.is_empty() || is_reserved(&q.id) {
            let fresh = loop {
                let candidate = format!("q_extra_{next_extra}");
                next_extra += 1;
                if !answered.contains(candidate.as_str())
                    && !existing.contains(candidate.as_str())
                    && !seen.contains(&candidate)
                {
                    break candidate;
                }
            };
            if !q.id.is_empty() {
                warnings.push(format!("renamed follow-up {} to {fresh} (reserved id)", q.id));
            }
            q.id = fresh;
        }
        if !seen.insert(q.id.clone()) {
            warnings.push(format!("dropped duplicate follow-up {}", q.id));
            continue;
        }
        if out.len() >= MAX_FOLLOW_UPS {
            warnings.push(format!("dropped follow-up {} (limit of {})", q.id, MAX_FOLLOW_UPS));
            continue;
        }
        q.suggestions.retain(|s| !s.trim().is_empty());
        out.push(q);
    }

    if out.len() < MIN_FOLLOW_UPS {
        warnings.push(format!("only {} follow-up question(s) generated", out.len()));
    }
    (out, warnings)
}
