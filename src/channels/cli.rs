//! CLI channel — stdin/stdout chat for the website wizard.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::Result;
use crate::wizard::{
    AnswerMode, AnswerValue, ConversationEvent, EventKind, GenerationState, Outcome, Question,
    SessionSnapshot, WizardManager,
};

const HELP: &str = "\
Commands:
  <number> or <label>  pick an option
  <numbers>            toggle options of a multi-choice question (e.g. 1 3 4)
  done / empty line    continue with the selected options
  /generate            generate the website once the prompt is ready
  /save                write the generated HTML to disk
  /reset               start over
  /quit                exit";

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Answer(AnswerValue),
    Toggle(Vec<String>),
    SubmitSelection,
    Generate,
    Save,
    Reset,
    Help,
    Quit,
    Invalid(String),
}

/// Interpret `line` against what the session is currently waiting for.
pub fn parse_input(line: &str, snapshot: &SessionSnapshot) -> CliCommand {
    let line = line.trim();
    match line {
        "/quit" | "/exit" => return CliCommand::Quit,
        "/reset" => return CliCommand::Reset,
        "/help" => return CliCommand::Help,
        "/generate" => return CliCommand::Generate,
        "/save" => return CliCommand::Save,
        _ => {}
    }

    let Some(question) = &snapshot.pending_question else {
        return match (snapshot.state, line.to_lowercase().as_str()) {
            (GenerationState::Composing, "" | "y" | "yes" | "generate") => CliCommand::Generate,
            (GenerationState::Succeeded, "save") => CliCommand::Save,
            (_, "reset") => CliCommand::Reset,
            _ => CliCommand::Invalid(format!("Nothing to answer right now ({})", snapshot.state)),
        };
    };

    match question.mode {
        AnswerMode::FreeText => CliCommand::Answer(AnswerValue::Text(line.to_string())),
        AnswerMode::SingleChoice => match resolve_choice(question, line) {
            Some(choice) => CliCommand::Answer(AnswerValue::Text(choice)),
            None => CliCommand::Invalid(format!("Pick 1-{} or type an option", question.choices.len())),
        },
        AnswerMode::MultiChoice => {
            if line.is_empty() || line.eq_ignore_ascii_case("done") {
                return CliCommand::SubmitSelection;
            }
            if let Some(choice) = resolve_label(question, line) {
                return CliCommand::Toggle(vec![choice]);
            }
            let picks: Option<Vec<String>> = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(|t| resolve_number(question, t))
                .collect();
            match picks {
                Some(picks) if !picks.is_empty() => CliCommand::Toggle(picks),
                _ => CliCommand::Invalid(format!(
                    "Toggle options with numbers 1-{}, then press Enter",
                    question.choices.len()
                )),
            }
        }
    }
}

fn resolve_number(question: &Question, token: &str) -> Option<String> {
    let n: usize = token.parse().ok()?;
    question.choices.get(n.checked_sub(1)?).cloned()
}

fn resolve_label(question: &Question, text: &str) -> Option<String> {
    question
        .choices
        .iter()
        .find(|c| c.eq_ignore_ascii_case(text))
        .cloned()
}

fn resolve_choice(question: &Question, text: &str) -> Option<String> {
    resolve_number(question, text).or_else(|| resolve_label(question, text))
}

/// One transcript line.
pub fn format_event(event: &ConversationEvent) -> String {
    let content = event.content();
    match &event.kind {
        EventKind::SystemNotice { .. } => format!("🤖 {}", content),
        EventKind::QuestionPosed { .. } => format!("❓ {}", content),
        EventKind::AnswerRecorded { .. } if content.is_empty() => "   › (none)".to_string(),
        EventKind::AnswerRecorded { .. } => format!("   › {}", content),
    }
}

/// Numbered options for the pending question, marking staged picks.
pub fn format_options(question: &Question, staging: Option<&[String]>) -> String {
    if !question.mode.has_choices() {
        return "   Type your answer (Enter to skip)".to_string();
    }
    let mut lines: Vec<String> = question
        .choices
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let mark = match staging {
                Some(staged) if staged.contains(choice) => "[x] ",
                Some(_) => "[ ] ",
                None => "",
            };
            format!("   {}. {}{}", i + 1, mark, choice)
        })
        .collect();
    if let Some(staged) = staging {
        lines.push(format!(
            "   Continue with Selected ({}): press Enter",
            staged.len()
        ));
    }
    lines.join("\n")
}

/// Lines for events appended since `printed`, then whatever the user can do
/// next, plus a hint for stderr.
fn render_lines(
    snapshot: &SessionSnapshot,
    printed: &mut usize,
) -> (Vec<String>, Option<&'static str>) {
    let mut lines: Vec<String> = snapshot
        .events
        .iter()
        .skip(*printed)
        .map(format_event)
        .collect();
    *printed = snapshot.events.len();

    if let Some(question) = &snapshot.pending_question {
        lines.push(format_options(question, snapshot.staging.as_deref()));
        return (lines, None);
    }
    let hint = match snapshot.state {
        GenerationState::Composing => {
            if let Some(request) = &snapshot.request {
                lines.push(format!("\n{}\n", request));
            }
            Some("Press Enter or type /generate to build it, /reset to start over.")
        }
        GenerationState::Succeeded => {
            Some("Type /save to write the HTML file, /reset to create another website.")
        }
        state if state.is_terminal() => Some("Type /reset to start over."),
        _ => None,
    };
    (lines, hint)
}

fn render(snapshot: &SessionSnapshot, printed: &mut usize) {
    let (lines, hint) = render_lines(snapshot, printed);
    for line in lines {
        println!("{}", line);
    }
    if let Some(hint) = hint {
        eprintln!("{}", hint);
    }
}

/// Run the wizard chat on stdin/stdout until EOF or `/quit`.
pub async fn run(manager: Arc<WizardManager>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut printed = 0;

    render(&manager.snapshot().await, &mut printed);
    eprint!("> ");

    while let Some(line) = lines.next_line().await? {
        let snapshot = manager.snapshot().await;
        match parse_input(&line, &snapshot) {
            CliCommand::Quit => break,
            CliCommand::Help => println!("{}", HELP),
            CliCommand::Invalid(message) => eprintln!("⚠️  {}", message),
            CliCommand::Reset => {
                manager.reset_session().await;
                printed = 0;
                println!();
            }
            CliCommand::Answer(value) => {
                if let Some(question) = &snapshot.pending_question {
                    if let Err(e) = manager.submit_answer(question.key, value).await {
                        eprintln!("⚠️  {}", e);
                    }
                }
            }
            CliCommand::Toggle(options) => {
                for option in options {
                    if let Err(e) = manager.toggle_selection(&option).await {
                        eprintln!("⚠️  {}", e);
                    }
                }
                let snapshot = manager.snapshot().await;
                if let Some(question) = &snapshot.pending_question {
                    println!("{}", format_options(question, snapshot.staging.as_deref()));
                }
                eprint!("> ");
                continue;
            }
            CliCommand::SubmitSelection => {
                if let Err(e) = manager.submit_selection().await {
                    eprintln!("⚠️  {}", e);
                }
            }
            CliCommand::Generate => match manager.start_generation().await {
                Ok(handle) => {
                    render(&manager.snapshot().await, &mut printed);
                    if let Ok(Outcome::Discarded) = handle.await {
                        tracing::debug!("Generation result discarded");
                    }
                }
                Err(e) => eprintln!("⚠️  {}", e),
            },
            CliCommand::Save => match manager.export_artifact().await {
                Ok(path) => println!("💾 Saved {}", path.display()),
                Err(e) => eprintln!("⚠️  {}", e),
            },
        }
        render(&manager.snapshot().await, &mut printed);
        eprint!("> ");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::prompt::GENERATING_MESSAGE;
    use crate::wizard::{FieldKey, WizardEngine};

    fn snapshot_at(answers: usize) -> SessionSnapshot {
        let mut engine = WizardEngine::website();
        let steps: [(FieldKey, AnswerValue); 4] = [
            (FieldKey::BusinessType, "Blog".into()),
            (FieldKey::Colors, "Custom".into()),
            (FieldKey::Layout, "Grid-based".into()),
            (FieldKey::Sections, vec!["Footer".to_string()].into()),
        ];
        for (key, value) in steps.into_iter().take(answers) {
            engine.submit_answer(key, value).unwrap();
        }
        engine.session().snapshot()
    }

    #[test]
    fn single_choice_by_number_or_label() {
        let snapshot = snapshot_at(0);
        assert_eq!(
            parse_input("1", &snapshot),
            CliCommand::Answer(AnswerValue::Text("Restaurant".into()))
        );
        assert_eq!(
            parse_input(" tech startup ", &snapshot),
            CliCommand::Answer(AnswerValue::Text("Tech Startup".into()))
        );
        assert!(matches!(parse_input("99", &snapshot), CliCommand::Invalid(_)));
        assert!(matches!(parse_input("0", &snapshot), CliCommand::Invalid(_)));
    }

    #[test]
    fn multi_choice_toggles_and_submits() {
        let snapshot = snapshot_at(3);
        assert_eq!(
            parse_input("2, 6", &snapshot),
            CliCommand::Toggle(vec!["Hero Section".into(), "Contact Form".into()])
        );
        assert_eq!(
            parse_input("about us", &snapshot),
            CliCommand::Toggle(vec!["About Us".into()])
        );
        assert_eq!(parse_input("", &snapshot), CliCommand::SubmitSelection);
        assert_eq!(parse_input("done", &snapshot), CliCommand::SubmitSelection);
        assert!(matches!(parse_input("1 x", &snapshot), CliCommand::Invalid(_)));
    }

    #[test]
    fn slash_commands_win() {
        let snapshot = snapshot_at(0);
        assert_eq!(parse_input("/quit", &snapshot), CliCommand::Quit);
        assert_eq!(parse_input("/reset", &snapshot), CliCommand::Reset);
        assert_eq!(parse_input("/help", &snapshot), CliCommand::Help);
    }

    #[test]
    fn composing_accepts_enter_to_generate() {
        let mut engine = WizardEngine::website();
        engine.submit_answer(FieldKey::BusinessType, "Blog").unwrap();
        engine.submit_answer(FieldKey::Colors, "Custom").unwrap();
        engine.submit_answer(FieldKey::Layout, "Grid-based").unwrap();
        engine
            .submit_answer(FieldKey::Sections, vec!["Footer".to_string()])
            .unwrap();
        engine.submit_answer(FieldKey::Style, "Modern").unwrap();

        let free_text = engine.session().snapshot();
        let question = free_text.pending_question.as_ref().unwrap();
        assert!(format_options(question, None).contains("Type your answer"));
        assert_eq!(
            parse_input("dark mode toggle", &free_text),
            CliCommand::Answer(AnswerValue::Text("dark mode toggle".into()))
        );

        engine.submit_answer(FieldKey::AdditionalFeatures, "").unwrap();
        let composing = engine.session().snapshot();
        assert_eq!(parse_input("", &composing), CliCommand::Generate);
        assert_eq!(parse_input("reset", &composing), CliCommand::Reset);
        assert!(matches!(parse_input("save", &composing), CliCommand::Invalid(_)));
    }

    #[test]
    fn options_show_staged_marks() {
        let mut engine = WizardEngine::website();
        engine.submit_answer(FieldKey::BusinessType, "Blog").unwrap();
        engine.submit_answer(FieldKey::Colors, "Custom").unwrap();
        engine.submit_answer(FieldKey::Layout, "Grid-based").unwrap();
        engine.toggle_selection("About Us").unwrap();

        let snapshot = engine.session().snapshot();
        let question = snapshot.pending_question.as_ref().unwrap();
        let rendered = format_options(question, snapshot.staging.as_deref());
        assert!(rendered.contains("3. [x] About Us"));
        assert!(rendered.contains("1. [ ] Header/Navigation"));
        assert!(rendered.contains("Continue with Selected (1)"));
    }

    #[test]
    fn confirming_prints_request_once() {
        let mut engine = WizardEngine::website();
        engine.submit_answer(FieldKey::BusinessType, "Blog").unwrap();
        engine.submit_answer(FieldKey::Colors, "Custom").unwrap();
        engine.submit_answer(FieldKey::Layout, "Grid-based").unwrap();
        engine
            .submit_answer(FieldKey::Sections, vec!["Footer".to_string()])
            .unwrap();
        engine.submit_answer(FieldKey::Style, "Modern").unwrap();

        let mut printed = 0;
        render_lines(&engine.session().snapshot(), &mut printed);
        engine.submit_answer(FieldKey::AdditionalFeatures, "").unwrap();

        let composing = engine.session().snapshot();
        let request = composing.request.clone().unwrap();
        let (lines, hint) = render_lines(&composing, &mut printed);
        assert!(lines.iter().any(|l| l.contains(&request)));
        assert!(hint.unwrap().contains("/generate"));

        engine.confirm_generation().unwrap();
        let (lines, hint) = render_lines(&engine.session().snapshot(), &mut printed);
        assert_eq!(lines, vec![format!("🤖 {}", GENERATING_MESSAGE)]);
        assert!(hint.is_none());
    }

    #[test]
    fn terminal_states_hint_at_reset() {
        let mut engine = WizardEngine::website();
        engine.submit_answer(FieldKey::BusinessType, "Blog").unwrap();
        engine.submit_answer(FieldKey::Colors, "Custom").unwrap();
        engine.submit_answer(FieldKey::Layout, "Grid-based").unwrap();
        engine
            .submit_answer(FieldKey::Sections, vec!["Footer".to_string()])
            .unwrap();
        engine.submit_answer(FieldKey::Style, "Modern").unwrap();
        engine.submit_answer(FieldKey::AdditionalFeatures, "").unwrap();
        let ticket = engine.confirm_generation().unwrap();
        engine
            .settle_generation(
                ticket.token,
                Err(crate::error::LlmError::AuthFailed {
                    provider: "openrouter".to_string(),
                }),
            )
            .unwrap();

        let mut printed = 0;
        let (_, hint) = render_lines(&engine.session().snapshot(), &mut printed);
        assert_eq!(hint, Some("Type /reset to start over."));
    }

    #[test]
    fn empty_answer_renders_as_none() {
        let event = ConversationEvent {
            id: 3,
            at: chrono::Utc::now(),
            kind: EventKind::AnswerRecorded {
                key: FieldKey::AdditionalFeatures,
                content: String::new(),
            },
        };
        assert_eq!(format_event(&event), "   › (none)");
    }
}
