//! Static question catalog, the named steps that own those questions, and the
//! data-driven resolution of conditional questions and dynamic dropdowns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::store::AnswerStore;

pub mod locations;

use locations::LocationLookup;

/// Id of the catalog entry standing in for the whole scene sub-flow.
pub const SCENES_ID: &str = "scenes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Text,
    Textarea,
    Dropdown,
    Scene,
}

/// Where a dropdown gets its options from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSource {
    None,
    Fixed(&'static [&'static str]),
    Countries,
    /// Computed from the `country` answer.
    States,
    /// Computed from the `country` and `state` answers.
    Cities,
}

/// How the suggestion provider is consulted for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiHint {
    None,
    /// Single short candidate list with a static fallback.
    Short {
        prompt: &'static str,
        fallback: &'static [&'static str],
    },
    /// Candidate list plus a single recommended answer.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub id: &'static str,
    pub title: &'static str,
    pub section: &'static str,
    pub kind: QuestionKind,
    pub options: OptionSource,
    pub placeholder: &'static str,
    pub required: bool,
    pub ai: AiHint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionMode {
    All,
    Any,
}

/// Declarative predicate: the listed questions must be answered (all or any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub depends_on: &'static [&'static str],
    pub mode: ConditionMode,
}

impl Condition {
    pub fn holds(&self, answers: &AnswerStore) -> bool {
        match self.mode {
            ConditionMode::All => self.depends_on.iter().all(|id| answers.is_answered(id)),
            ConditionMode::Any => self.depends_on.iter().any(|id| answers.is_answered(id)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Spliced immediately after the anchor core question.
    After(&'static str),
    /// Appended after all core questions, if any anchor made it into the sequence.
    FinalPass(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conditional {
    pub question: &'static str,
    pub condition: Condition,
    pub placement: Placement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Basics,
    ProductDetails,
    VideoInformation,
    ContentRequirements,
    DeliveryTimeline,
    FinalPreview,
}

impl StepId {
    pub const ALL: [StepId; 6] = [
        StepId::Basics,
        StepId::ProductDetails,
        StepId::VideoInformation,
        StepId::ContentRequirements,
        StepId::DeliveryTimeline,
        StepId::FinalPreview,
    ];

    pub fn first() -> StepId {
        Self::ALL[0]
    }

    /// 1-based position.
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).map(|i| i + 1).unwrap_or(0)
    }

    pub fn from_number(n: usize) -> Option<StepId> {
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn next(self) -> Option<StepId> {
        Self::from_number(self.number() + 1)
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepId::Basics => "basics",
            StepId::ProductDetails => "product_details",
            StepId::VideoInformation => "video_information",
            StepId::ContentRequirements => "content_requirements",
            StepId::DeliveryTimeline => "delivery_timeline",
            StepId::FinalPreview => "final_preview",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = String;

    /// Accepts a step id (`video_information`) or a 1-based step number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return StepId::from_number(n).ok_or_else(|| format!("no step number {n}"));
        }
        StepId::ALL
            .iter()
            .copied()
            .find(|step| step.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown step '{s}'"))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StepDef {
    pub id: StepId,
    pub label: &'static str,
    pub headline: &'static str,
    pub core: &'static [&'static str],
    pub conditionals: &'static [Conditional],
}

const YES_NO: &[&str] = &["Yes", "No"];

const fn text(id: &'static str, title: &'static str, section: &'static str, placeholder: &'static str, ai: AiHint) -> Question {
    Question { id, title, section, kind: QuestionKind::Text, options: OptionSource::None, placeholder, required: true, ai }
}

const fn textarea(id: &'static str, title: &'static str, section: &'static str, placeholder: &'static str) -> Question {
    Question { id, title, section, kind: QuestionKind::Textarea, options: OptionSource::None, placeholder, required: true, ai: AiHint::Full }
}

const fn dropdown(id: &'static str, title: &'static str, section: &'static str, options: OptionSource) -> Question {
    Question { id, title, section, kind: QuestionKind::Dropdown, options, placeholder: "", required: true, ai: AiHint::None }
}

const fn optional(q: Question) -> Question {
    Question { required: false, ..q }
}

const CONTEXT: &str = "Context Building";
const EDUCATION: &str = "Product / Service Education";
const VIDEO_INFO: &str = "Video Information";
const SCRIPT: &str = "Video Script";
const RULES: &str = "Production Rules";

pub const QUESTIONS: &[Question] = &[
    text("product_description", "Tell the creator about the product or service.", CONTEXT, "e.g., brightening serum",
        AiHint::Short { prompt: "Tell the creator about the product or service in 1-3 words", fallback: &["skincare serum", "fintech app", "eco cleaner", "fitness plan"] }),
    text("product_name", "What is the name of your product or service?", CONTEXT, "e.g., GlowSerum",
        AiHint::Short { prompt: "Suggest a concise product name (1-2 words)", fallback: &["GlowSerum", "NugVerse", "TaskFlow", "BrightDrop"] }),
    text("target_audience", "Who is your target audience or ideal user?", CONTEXT, "e.g., Gen Z women",
        AiHint::Short { prompt: "Describe the target audience in 1-2 words", fallback: &["Gen Z", "Busy moms", "Founders", "Designers"] }),
    text("product_vibe", "Preferred visual style or color guideline?", CONTEXT, "e.g., Minimal neutrals",
        AiHint::Short { prompt: "Suggest a visual style or color guideline in 1-2 words", fallback: &["Minimal", "Vibrant", "Pastel", "Bold neon"] }),
    text("main_problem", "What main problem does your product or service solve?", CONTEXT, "e.g., dull skin",
        AiHint::Short { prompt: "Describe the main problem in 1-2 words", fallback: &["dull skin", "time management", "waste reduction", "fitness motivation"] }),
    text("differentiator", "What makes your product or service different from competitors?", CONTEXT, "e.g., organic ingredients",
        AiHint::Short { prompt: "Describe what makes it different in 1-2 words", fallback: &["organic ingredients", "AI-powered", "zero waste", "personalized plans"] }),
    text("current_stage", "What stage are you currently in?", CONTEXT, "e.g., ready to launch",
        AiHint::Short { prompt: "Describe current stage in 1-2 words", fallback: &["ready to launch", "early users", "prototype", "idea"] }),
    text("primary_goal", "What is your primary goal right now?", CONTEXT, "e.g., growth",
        AiHint::Short { prompt: "Describe primary goal in 1-2 words", fallback: &["growth", "awareness", "sales", "validation"] }),
    textarea("product_selling_points", "Product selling points, key messages", EDUCATION,
        "What makes your product unique? Key messages to highlight..."),
    optional(text("product_link", "Link to product or service page", EDUCATION, "https://...", AiHint::None)),
    dropdown("platform", "Select Platform", VIDEO_INFO,
        OptionSource::Fixed(&["Instagram", "TikTok", "YouTube", "Facebook", "LinkedIn", "Twitter/X"])),
    dropdown("aspect_ratio", "Select Aspect Ratio", VIDEO_INFO,
        OptionSource::Fixed(&["4:5 (Instagram Feed)", "9:16 (Stories/Reels)", "1:1 (Square)", "16:9 (Landscape)"])),
    dropdown("shipping_product", "Shipping product?", VIDEO_INFO, OptionSource::Fixed(YES_NO)),
    dropdown("creator_stipend", "Creator stipend needed?", VIDEO_INFO, OptionSource::Fixed(YES_NO)),
    dropdown("country", "Creator country", VIDEO_INFO, OptionSource::Countries),
    dropdown("state", "Creator state / region", VIDEO_INFO, OptionSource::States),
    dropdown("city", "Creator city", VIDEO_INFO, OptionSource::Cities),
    textarea("video_overview", "Video Overview", SCRIPT, "Describe the overall concept and flow of the video..."),
    textarea("video_opener", "Opener / Hook", SCRIPT, "How should the video start? What hook will grab attention?"),
    Question {
        id: SCENES_ID,
        title: "Scenes",
        section: SCRIPT,
        kind: QuestionKind::Scene,
        options: OptionSource::None,
        placeholder: "Describe what happens in this scene...",
        required: true,
        ai: AiHint::Full,
    },
    textarea("video_ending", "Ending / CTA", SCRIPT, "How should the video end? What call-to-action?"),
    optional(text("references", "Link to references (optional)", SCRIPT, "Links to reference videos, inspiration, etc...", AiHint::None)),
    dropdown("adlib_rules", "Can the creator ad-lib or must they read the script verbatim?", RULES,
        OptionSource::Fixed(&["Can ad-lib", "Must follow script verbatim", "Can ad-lib with key points"])),
    textarea("wardrobe", "Wardrobe direction", RULES, "What should the creator wear? Any style guidelines?"),
    textarea("creative_direction", "Do's & Don'ts / Creative Direction", RULES, "Any specific do's and don'ts for the creator..."),
    textarea("legal_disclaimers", "Legal Disclaimers", RULES, "Any legal disclaimers or compliance requirements..."),
];

const BASICS_CONDITIONALS: &[Conditional] = &[
    Conditional {
        question: "main_problem",
        condition: Condition { depends_on: &["product_description"], mode: ConditionMode::All },
        placement: Placement::After("product_description"),
    },
    Conditional {
        question: "differentiator",
        condition: Condition { depends_on: &["product_name"], mode: ConditionMode::All },
        placement: Placement::After("product_name"),
    },
    Conditional {
        question: "current_stage",
        condition: Condition { depends_on: &["target_audience"], mode: ConditionMode::All },
        placement: Placement::After("target_audience"),
    },
    Conditional {
        question: "primary_goal",
        condition: Condition { depends_on: &["product_vibe", "main_problem"], mode: ConditionMode::Any },
        placement: Placement::FinalPass(&["product_vibe", "main_problem"]),
    },
];

pub const STEPS: &[StepDef] = &[
    StepDef {
        id: StepId::Basics,
        label: "Basics",
        headline: "Tell us about the product",
        core: &["product_description", "product_name", "target_audience", "product_vibe"],
        conditionals: BASICS_CONDITIONALS,
    },
    StepDef {
        id: StepId::ProductDetails,
        label: "Product Details",
        headline: "What should creators highlight?",
        core: &["product_selling_points", "product_link"],
        conditionals: &[],
    },
    StepDef {
        id: StepId::VideoInformation,
        label: "Video Information",
        headline: "Where will the video run?",
        core: &["platform", "aspect_ratio", "shipping_product", "creator_stipend", "country", "state", "city"],
        conditionals: &[],
    },
    StepDef {
        id: StepId::ContentRequirements,
        label: "Content Requirements",
        headline: "Craft the storyline & talking points",
        core: &["video_overview", "video_opener", SCENES_ID, "video_ending", "references"],
        conditionals: &[],
    },
    StepDef {
        id: StepId::DeliveryTimeline,
        label: "Delivery & Timeline",
        headline: "Finalize requirements & guardrails",
        core: &["adlib_rules", "wardrobe", "creative_direction", "legal_disclaimers"],
        conditionals: &[],
    },
    StepDef {
        id: StepId::FinalPreview,
        label: "Final Preview",
        headline: "Review before generating the brief",
        core: &[],
        conditionals: &[],
    },
];

/// Upstream field -> fields whose value space depends on it, in clearing order.
const CASCADES: &[(&str, &[&str])] = &[("country", &["state", "city"]), ("state", &["city"])];

pub fn question(id: &str) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

pub fn step(id: StepId) -> &'static StepDef {
    // STEPS mirrors StepId::ALL one-to-one.
    &STEPS[id.number() - 1]
}

/// The step whose (core or conditional) questions include `question_id`.
pub fn step_of(question_id: &str) -> Option<StepId> {
    STEPS
        .iter()
        .find(|s| s.core.contains(&question_id) || s.conditionals.iter().any(|c| c.question == question_id))
        .map(|s| s.id)
}

pub fn dependents_of(question_id: &str) -> &'static [&'static str] {
    CASCADES
        .iter()
        .find(|(parent, _)| *parent == question_id)
        .map(|(_, deps)| *deps)
        .unwrap_or(&[])
}

/// Effective ordered question sequence for a step given the current answers.
///
/// Core questions are walked in order; each conditional anchored to a core
/// question is spliced in right after it when its predicate holds. Conditionals
/// placed in the final pass are appended once every anchor has been walked.
/// The result never contains duplicates and is a pure function of the answers.
pub fn effective_sequence(step_id: StepId, answers: &AnswerStore) -> Vec<&'static Question> {
    let def = step(step_id);
    let mut ids: Vec<&'static str> = Vec::with_capacity(def.core.len() + def.conditionals.len());

    for core in def.core {
        if ids.contains(core) {
            continue;
        }
        ids.push(*core);
        for cond in def.conditionals {
            if cond.placement == Placement::After(*core)
                && !ids.contains(&cond.question)
                && cond.condition.holds(answers)
            {
                ids.push(cond.question);
            }
        }
    }

    for cond in def.conditionals {
        if let Placement::FinalPass(anchors) = cond.placement {
            let anchored = anchors.iter().any(|a| ids.contains(a));
            if anchored && !ids.contains(&cond.question) && cond.condition.holds(answers) {
                ids.push(cond.question);
            }
        }
    }

    ids.into_iter().filter_map(question).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub options: Vec<String>,
    /// False when the list is only a "select the prerequisite first" sentinel.
    pub enabled: bool,
}

impl ResolvedOptions {
    fn ready(options: Vec<String>) -> Self {
        Self { options, enabled: true }
    }

    fn sentinel(msg: &str) -> Self {
        Self { options: vec![msg.to_string()], enabled: false }
    }
}

/// Options for a dropdown, computed from the current answers on every call.
pub fn resolve_options(q: &Question, answers: &AnswerStore, lookup: &dyn LocationLookup) -> ResolvedOptions {
    let filled = |id: &str| answers.value(id).map(str::trim).filter(|v| !v.is_empty());
    match q.options {
        OptionSource::None => ResolvedOptions::ready(Vec::new()),
        OptionSource::Fixed(list) => ResolvedOptions::ready(list.iter().map(|s| s.to_string()).collect()),
        OptionSource::Countries => ResolvedOptions::ready(lookup.countries()),
        OptionSource::States => match filled("country") {
            Some(country) => ResolvedOptions::ready(lookup.states_for(country)),
            None => ResolvedOptions::sentinel("Please select a country first"),
        },
        OptionSource::Cities => match (filled("country"), filled("state")) {
            (Some(country), Some(state)) => ResolvedOptions::ready(lookup.cities_for(country, state)),
            (_, None) => ResolvedOptions::sentinel("Please select a state first"),
            (None, Some(_)) => ResolvedOptions::sentinel("Please select a country and state first"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::locations::StaticLocations;
    use super::*;

    fn ids(seq: &[&Question]) -> Vec<&'static str> {
        seq.iter().map(|q| q.id).collect()
    }

    #[test]
    fn catalog_ids_are_unique_and_steps_resolve() {
        for (i, q) in QUESTIONS.iter().enumerate() {
            assert!(QUESTIONS[i + 1..].iter().all(|o| o.id != q.id), "duplicate id {}", q.id);
        }
        for s in STEPS {
            assert_eq!(step(s.id).id, s.id);
            for id in s.core {
                assert!(question(id).is_some(), "missing question {id}");
            }
        }
    }

    #[test]
    fn empty_store_yields_only_core_questions() {
        let seq = effective_sequence(StepId::Basics, &AnswerStore::new());
        assert_eq!(ids(&seq), vec!["product_description", "product_name", "target_audience", "product_vibe"]);
    }

    #[test]
    fn main_problem_follows_product_description() {
        let mut answers = AnswerStore::new();
        answers.set_answer("product_description", "t", "X");
        let seq = effective_sequence(StepId::Basics, &answers);
        assert_eq!(
            ids(&seq),
            vec!["product_description", "main_problem", "product_name", "target_audience", "product_vibe"]
        );
    }

    #[test]
    fn late_conditional_is_spliced_at_its_anchor() {
        let mut answers = AnswerStore::new();
        answers.set_answer("product_vibe", "t", "Minimal");
        answers.set_answer("target_audience", "t", "Founders");
        let seq = effective_sequence(StepId::Basics, &answers);
        assert_eq!(
            ids(&seq),
            vec!["product_description", "product_name", "target_audience", "current_stage", "product_vibe", "primary_goal"]
        );

        // product_name answered after product_vibe: differentiator still lands after product_name.
        answers.set_answer("product_name", "t", "GlowSerum");
        let seq = effective_sequence(StepId::Basics, &answers);
        let pos = |id: &str| seq.iter().position(|q| q.id == id).unwrap();
        assert_eq!(pos("differentiator"), pos("product_name") + 1);
        assert_eq!(seq.last().unwrap().id, "primary_goal");
    }

    #[test]
    fn or_conditional_included_once_via_either_anchor() {
        let mut answers = AnswerStore::new();
        answers.set_answer("product_description", "t", "serum");
        answers.set_answer("main_problem", "t", "dull skin");
        answers.set_answer("product_vibe", "t", "Pastel");
        let seq = effective_sequence(StepId::Basics, &answers);
        assert_eq!(seq.iter().filter(|q| q.id == "primary_goal").count(), 1);
    }

    #[test]
    fn whitespace_answer_does_not_satisfy_condition() {
        let mut answers = AnswerStore::new();
        answers.set_answer("product_description", "t", "   ");
        let seq = effective_sequence(StepId::Basics, &answers);
        assert!(!ids(&seq).contains(&"main_problem"));
    }

    #[test]
    fn sequence_is_deterministic() {
        let mut answers = AnswerStore::new();
        answers.set_answer("product_name", "t", "TaskFlow");
        answers.set_answer("product_description", "t", "todo app");
        let a = ids(&effective_sequence(StepId::Basics, &answers));
        let b = ids(&effective_sequence(StepId::Basics, &answers));
        assert_eq!(a, b);
    }

    #[test]
    fn dynamic_options_depend_on_upstream_answers() {
        let state = question("state").unwrap();
        let city = question("city").unwrap();
        let mut answers = AnswerStore::new();

        let r = resolve_options(state, &answers, &StaticLocations);
        assert!(!r.enabled);
        assert_eq!(r.options, vec!["Please select a country first"]);

        let r = resolve_options(city, &answers, &StaticLocations);
        assert!(!r.enabled);
        assert_eq!(r.options, vec!["Please select a state first"]);

        answers.set_answer("country", "t", "Canada");
        let r = resolve_options(state, &answers, &StaticLocations);
        assert!(r.enabled);
        assert!(r.options.contains(&"Quebec".to_string()));

        answers.set_answer("state", "t", "Quebec");
        let r = resolve_options(city, &answers, &StaticLocations);
        assert!(r.enabled);
        assert_eq!(r.options[0], "Montreal");

        answers.clear_answer("country");
        let r = resolve_options(city, &answers, &StaticLocations);
        assert_eq!(r.options, vec!["Please select a country and state first"]);
    }

    #[test]
    fn step_ids_parse_from_names_and_numbers() {
        assert_eq!("3".parse::<StepId>(), Ok(StepId::VideoInformation));
        assert_eq!("final_preview".parse::<StepId>(), Ok(StepId::FinalPreview));
        assert!("7".parse::<StepId>().is_err());
        assert!("0".parse::<StepId>().is_err());
        assert!(StepId::FinalPreview.is_terminal());
        assert_eq!(StepId::Basics.next(), Some(StepId::ProductDetails));
    }

    #[test]
    fn cascade_rules_and_step_lookup() {
        assert_eq!(dependents_of("country"), &["state", "city"]);
        assert_eq!(dependents_of("state"), &["city"]);
        assert!(dependents_of("city").is_empty());
        assert_eq!(step_of("primary_goal"), Some(StepId::Basics));
        assert_eq!(step_of(SCENES_ID), Some(StepId::ContentRequirements));
        assert_eq!(step_of("q_extra_1"), None);
    }
}
