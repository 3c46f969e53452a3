use crate::catalog::QuestionKind;
use crate::wire::{PreviousAnswer, SuggestionQuery};

fn strategist() -> &'static str {
r#"You are a professional UGC campaign strategist with expertise in creating realistic, high-quality campaign briefs.
You generate specific, detailed, and professional suggestions that sound authentic and ready-to-use.
You always include concrete details and real-world scenarios, and avoid generic or filler content."#
}

fn brief_writer() -> &'static str {
    "You are a professional creative brief writer. Generate clear, well-structured UGC campaign briefs."
}

fn context_block(previous: &[PreviousAnswer]) -> String {
    if previous.is_empty() {
        return "(no previous answers yet)".to_string();
    }
    previous
        .iter()
        .map(|p| format!("Q: {}\nA: {}", p.question, p.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn type_instructions(kind: QuestionKind, options: Option<&[String]>) -> String {
    match (kind, options) {
        (QuestionKind::Dropdown, Some(opts)) if !opts.is_empty() => format!(
r#"This is a DROPDOWN question with the following options: {}.
Recommend specific options based on the context, formatted as:
"Select [Option Name] - [specific, realistic reason]""#,
            opts.join(", ")
        ),
        (QuestionKind::Textarea, _) => r#"This is a TEXTAREA question.
Each suggestion is a complete 2-4 sentence answer with concrete details (names, numbers, audiences, benefits)."#
            .to_string(),
        (QuestionKind::Scene, _) => r#"This is a SCENE of a short UGC video script.
Each suggestion describes what happens on screen and what the creator says, in 1-3 sentences."#
            .to_string(),
        _ => r#"This is a TEXT question (single line).
Each suggestion is a concise, specific answer (1-2 sentences at most)."#
            .to_string(),
    }
}

pub fn system_prompt_suggestions() -> String {
    strategist().to_string()
}

pub fn user_prompt_suggestions(q: &SuggestionQuery) -> String {
    format!(
r#"Previous answers:
{context}

Current question: {question}

{instructions}

Return up to 5 distinct suggestions, one per line.
Do not number them or add bullet points."#,
        context = context_block(&q.previous_answers),
        question = q.current_question,
        instructions = type_instructions(q.question_type, q.options.as_deref()),
    )
}

pub fn user_prompt_answer_suggestion(q: &SuggestionQuery) -> String {
    let mut extra = String::new();
    if let Some(profile) = &q.user_profile {
        extra.push_str(&format!("\nUser profile: {profile}"));
    }
    if let Some(meta) = &q.metadata {
        extra.push_str(&format!("\nMetadata: {meta}"));
    }
    let answer_rule = match q.options.as_deref() {
        Some(opts) if !opts.is_empty() => format!(
            "Reply with exactly one of these options and nothing else: {}",
            opts.join(" | ")
        ),
        _ => "Reply with the single best answer only, without quotes or commentary.".to_string(),
    };
    format!(
r#"Previous answers:
{context}{extra}

Current question: {question}

{instructions}

{answer_rule}"#,
        context = context_block(&q.previous_answers),
        question = q.current_question,
        instructions = type_instructions(q.question_type, q.options.as_deref()),
    )
}

pub fn user_prompt_follow_ups(previous: &[PreviousAnswer], answered_ids: &[String]) -> String {
    format!(
r#"Based on what we know so far about this UGC campaign, propose 3 to 6 short follow-up questions
that would help a creator deliver a better video.

Known answers:
{context}

Do not ask again about these question ids: {answered}

Respond with one JSON object:
{{"questions":[{{"id":"snake_case_id","label":"Question?","placeholder":"e.g., ...","type":"text"|"select","suggestions":["..."]}}]}}"#,
        context = context_block(previous),
        answered = if answered_ids.is_empty() { "(none)".to_string() } else { answered_ids.join(", ") },
    )
}

pub fn system_prompt_summary() -> String {
    brief_writer().to_string()
}

pub fn user_prompt_summary(all: &[PreviousAnswer]) -> String {
    let answers = all
        .iter()
        .map(|p| format!("**{}**\n{}", p.question, p.answer))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
r#"Create a professional UGC creative brief from the form responses below.

Use these section headings in this exact order:
- ### Product / Service Education
- ### Video Information
- ### Video Script
- ### Production Rules

Organize the answers under each section with clear labels. Include ALL provided information.

Form responses:

{answers}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(kind: QuestionKind, options: Option<Vec<String>>) -> SuggestionQuery {
        SuggestionQuery {
            current_question: "Select Platform".into(),
            question_type: kind,
            options,
            previous_answers: vec![PreviousAnswer { question: "Product name".into(), answer: "GlowSerum".into() }],
            user_profile: None,
            metadata: None,
        }
    }

    #[test]
    fn suggestions_prompt_carries_context_and_options() {
        let p = user_prompt_suggestions(&query(QuestionKind::Dropdown, Some(vec!["TikTok".into(), "YouTube".into()])));
        assert!(p.contains("Q: Product name\nA: GlowSerum"));
        assert!(p.contains("TikTok, YouTube"));
    }

    #[test]
    fn answer_prompt_pins_dropdown_to_options() {
        let p = user_prompt_answer_suggestion(&query(QuestionKind::Dropdown, Some(vec!["Yes".into(), "No".into()])));
        assert!(p.contains("Yes | No"));
    }
}
