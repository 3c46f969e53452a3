//! Sectioned rendering of the collected answers. Drives the final preview and
//! stands in for the remote renderer when it is unavailable.

use anyhow::Result;
use async_trait::async_trait;

use crate::catalog::{self, SCENES_ID};
use crate::provider::SummaryRenderer;
use crate::store::AnswerStore;
use crate::wire::PreviousAnswer;

pub const ADDITIONAL_SECTION: &str = "Additional Details";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSection {
    pub title: String,
    pub entries: Vec<PreviewEntry>,
}

fn scene_section() -> &'static str {
    catalog::question(SCENES_ID).map(|q| q.section).unwrap_or(ADDITIONAL_SECTION)
}

fn section_for_id(id: &str) -> &'static str {
    if id.starts_with("scene_") {
        return scene_section();
    }
    catalog::question(id).map(|q| q.section).unwrap_or(ADDITIONAL_SECTION)
}

fn section_for_title(title: &str) -> &'static str {
    if title.starts_with("Scene ") {
        return scene_section();
    }
    catalog::QUESTIONS
        .iter()
        .find(|q| q.title == title)
        .map(|q| q.section)
        .unwrap_or(ADDITIONAL_SECTION)
}

/// Groups (section, title, value) triples by section in first-appearance order,
/// skipping blank values. The additional section is always last.
fn group<'a>(items: impl Iterator<Item = (&'static str, &'a str, &'a str)>) -> Vec<PreviewSection> {
    let mut sections: Vec<PreviewSection> = Vec::new();
    for (section, title, value) in items {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let entry = PreviewEntry { title: title.to_string(), value: value.to_string() };
        match sections.iter_mut().find(|s| s.title == section) {
            Some(s) => s.entries.push(entry),
            None => sections.push(PreviewSection { title: section.to_string(), entries: vec![entry] }),
        }
    }
    if let Some(idx) = sections.iter().position(|s| s.title == ADDITIONAL_SECTION) {
        let extra = sections.remove(idx);
        sections.push(extra);
    }
    sections
}

/// Preview of the store grouped by catalog section.
pub fn preview(answers: &AnswerStore) -> Vec<PreviewSection> {
    group(answers.iter().map(|a| (section_for_id(&a.question_id), a.question_title.as_str(), a.value.as_str())))
}

pub fn preview_from_pairs(answers: &[PreviousAnswer]) -> Vec<PreviewSection> {
    group(answers.iter().map(|a| (section_for_title(&a.question), a.question.as_str(), a.answer.as_str())))
}

pub fn render_markdown(sections: &[PreviewSection]) -> String {
    let mut out = String::from("# UGC Creative Brief\n");
    for section in sections {
        out.push_str(&format!("\n### {}\n", section.title));
        for e in &section.entries {
            out.push_str(&format!("- **{}**: {}\n", e.title, e.value));
        }
    }
    out
}

/// Renders the brief without a model.
pub struct LocalRenderer;

#[async_trait]
impl SummaryRenderer for LocalRenderer {
    async fn generate_summary(&self, answers: &[PreviousAnswer]) -> Result<String> {
        Ok(render_markdown(&preview_from_pairs(answers)))
    }
}
