use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::catalog::{self, Question, QuestionKind, ResolvedOptions, StepId};
use crate::flow::{Blocked, StepStatus};
use crate::scenes::Scene;
use crate::suggest::{FetchStatus, SuggestionBoard};
use crate::summary::PreviewSection;
use crate::wire::FollowUpQuestion;

pub fn print_step_header(step: StepId, status: &StepStatus, progress: (usize, usize)) {
    let def = catalog::step(step);
    println!(
        "\n{}  {}  {}",
        format!("Step {} of {}", step.number(), StepId::ALL.len()).bold(),
        def.label.cyan().bold(),
        def.headline.dimmed()
    );
    println!(
        "  {} {}/{} required on this step, {}/{} overall",
        "progress:".dimmed(),
        status.answered,
        status.required,
        progress.0,
        progress.1
    );
    print_step_chips(step);
}

pub fn print_step_chips(active: StepId) {
    let chips: Vec<String> = StepId::ALL
        .iter()
        .map(|s| {
            let label = format!("{}.{}", s.number(), s.as_str());
            if *s == active { label.green().bold().to_string() } else { label.dimmed().to_string() }
        })
        .collect();
    println!("  {}", chips.join("  "));
}

pub fn print_question(q: &Question, options: Option<&ResolvedOptions>, current: Option<&str>) {
    let marker = if q.required { "*".red().to_string() } else { "(optional)".dimmed().to_string() };
    println!("\n{} {}", q.title.bold(), marker);
    if !q.placeholder.is_empty() {
        println!("  {}", q.placeholder.dimmed());
    }
    if let Some(opts) = options {
        if opts.enabled {
            for (i, o) in opts.options.iter().enumerate() {
                println!("  {}) {}", i + 1, o);
            }
        } else {
            for o in &opts.options {
                println!("  {}", o.dimmed().italic());
            }
        }
    }
    if let Some(v) = current.filter(|v| !v.trim().is_empty()) {
        println!("  {} {}", "current:".dimmed(), v);
    }
}

pub fn print_scene(ordinal: usize, scene: &Scene, required: bool) {
    let tag = if required { "*".red().to_string() } else { "(optional)".dimmed().to_string() };
    println!("\n{} {}", format!("Scene {ordinal}").bold(), tag);
    if !scene.content.trim().is_empty() {
        println!("  {} {}", "current:".dimmed(), scene.content);
    }
}

pub fn print_suggestions(board: &SuggestionBoard, kind: QuestionKind) {
    match board.candidates() {
        FetchStatus::Idle | FetchStatus::Loading => {}
        FetchStatus::Ready(list) if list.is_empty() => {}
        FetchStatus::Ready(list) => {
            println!("  {}", "suggestions (type :N to use one):".magenta());
            for (i, s) in list.iter().enumerate() {
                println!("   :{} {}", i + 1, s);
            }
        }
        FetchStatus::Unavailable(_) => println!("  {}", "suggestions unavailable right now".dimmed()),
    }
    match board.recommendation() {
        FetchStatus::Ready(s) if !s.is_empty() => {
            let shown = if kind == QuestionKind::Dropdown { s.clone() } else { truncate(s, 160) };
            println!("  {} {} {}", "recommended:".magenta(), shown, "(:a to accept)".dimmed());
        }
        FetchStatus::Unavailable(_) => println!("  {}", "recommendation unavailable".dimmed()),
        _ => {}
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max).collect();
    format!("{cut}...")
}

pub fn print_blocked(blocked: &Blocked) {
    let msg = match blocked {
        Blocked::StepIncomplete { missing } => {
            let titles: Vec<&str> = missing
                .iter()
                .map(|id| catalog::question(id).map(|q| q.title).unwrap_or(*id))
                .collect();
            format!("answer the required questions first: {}", titles.join(", "))
        }
        Blocked::ScenesIncomplete => "scenes 1 and 2 need content before moving on".to_string(),
        Blocked::NothingAnswered => "nothing answered yet, the brief would be empty".to_string(),
        Blocked::NotAtFinalStep => "go to the final preview to finish".to_string(),
        Blocked::AlreadyComplete => "the brief is already complete".to_string(),
    };
    println!("{} {}", "blocked:".yellow().bold(), msg);
}

pub fn print_follow_ups(list: &[&FollowUpQuestion]) {
    if list.is_empty() {
        return;
    }
    println!("\n{}", "Additional questions".bold());
    for f in list {
        println!("  {} {}", format!("[{}]", f.id).dimmed(), f.label);
        if !f.suggestions.is_empty() {
            println!("    {} {}", "ideas:".dimmed(), f.suggestions.join(" | "));
        }
    }
}

pub fn print_preview_dashboard(sections: &[PreviewSection], progress: (usize, usize)) {
    println!("\n{}", "┏━━━━━━━━━━━━━━━━━━━━━━━━ Preview ━━━━━━━━━━━━━━━━━━━━━━━━┓".bold());
    println!(
        "  {}: {}   {}: {}/{}",
        "Sections".cyan().bold(),
        sections.len(),
        "Required answered".green().bold(),
        progress.0,
        progress.1
    );
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold());

    if sections.is_empty() {
        println!("{}", "(no answers yet)".dimmed());
        return;
    }
    for s in sections {
        println!("\n{}", s.title.cyan().bold());
        for e in &s.entries {
            println!("  {}\n{}", e.title.bold(), indent(&e.value, 4));
        }
    }
    println!();
}

pub fn print_brief(text: &str) {
    println!("\n{}\n", "=== CREATIVE BRIEF ===".green().bold());
    println!("{text}\n");
}

pub fn print_warnings(title: &str, warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("\n{}", title.yellow());
    for w in warnings {
        println!(" - {w}");
    }
}

pub fn print_help() {
    println!(
        "{}",
        [
            "  <text>        answer the current question (number picks a dropdown option)",
            "  :N / :a       use suggestion N / accept the recommendation",
            "  :next :back   move between steps; :goto <step name or number>",
            "  :skip         skip an optional question",
            "  :scene add | :scene rm N | :scene N   manage scenes",
            "  :more         generate additional questions",
            "  :preview      show the answers so far",
            "  :edit <id>    revisit an answered question",
            "  :reset        start over",
            "  :quit         leave without generating",
        ]
        .join("\n")
        .dimmed()
    );
}

pub fn print_prompt() {
    print!("{} ", ">".green().bold());
    let _ = io::stdout().flush();
}

pub fn print_info(msg: &str) {
    println!("{}", msg.cyan());
}

pub fn print_muted(msg: &str) {
    println!("  {}", msg.dimmed());
}

pub fn spinner(msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.magenta} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn indent(s: &str, n: usize) -> String {
    let pad = " ".repeat(n);
    s.lines()
        .map(|l| format!("{}{}", pad, l))
        .collect::<Vec<_>>()
        .join("\n")
}
