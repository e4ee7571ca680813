//! Interactive shell: the read loop, control commands, and the model
//! picker.
//!
//! The shell owns the outer loop. Agent failures end only the in-flight
//! query; control always returns to the prompt.

use std::io::Write;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use uuid::Uuid;

use crate::agent::{Agent, AgentError, RunOutcome};
use crate::models::{ModelId, ModelSelector};
use crate::ui;

/// What one line of user input asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command<'a> {
    Exit,
    Clear,
    Help,
    Model,
    Empty,
    Query(&'a str),
}

/// Control tokens are case-insensitive; anything else non-empty is a query.
fn parse_command(input: &str) -> Command<'_> {
    let trimmed = input.trim();
    match trimmed.to_lowercase().as_str() {
        "exit" | "quit" => Command::Exit,
        "clear" => Command::Clear,
        "help" => Command::Help,
        "model" => Command::Model,
        "" => Command::Empty,
        _ => Command::Query(trimmed),
    }
}

/// Canned answers for greetings and smalltalk, served without a model call.
fn simple_response(query: &str) -> Option<&'static str> {
    match query.to_lowercase().as_str() {
        "hello" | "hi" | "hey" => Some("Hello! I'm CODEX AI, ready to help you with coding tasks."),
        "thanks" | "thank you" => Some("You're welcome! Happy to help with your coding needs."),
        "how are you" => Some("Running smoothly and ready to help with your coding projects."),
        "what can you do" | "capabilities" => Some(
            "I can scaffold React projects, clone websites into React apps, \
             manage files, run shell commands and tests, and handle git workflows. \
             Just describe the task.",
        ),
        _ => None,
    }
}

/// The interactive read loop.
pub struct Shell {
    agent: Agent,
    selector: ModelSelector,
    session_id: String,
}

impl Shell {
    pub fn new(agent: Agent, selector: ModelSelector) -> Self {
        Self {
            agent,
            selector,
            session_id: format!("session-{}", Uuid::new_v4()),
        }
    }

    /// Run until `exit`/`quit` or end of input.
    pub async fn run(&self) -> anyhow::Result<()> {
        ui::print_banner(self.selector.current().await);
        ui::print_welcome();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            prompt("What can I help you with?");
            let Some(line) = lines.next_line().await? else {
                // End of input behaves like exit.
                ui::print_farewell();
                break;
            };

            match parse_command(&line) {
                Command::Exit => {
                    ui::print_farewell();
                    break;
                }
                Command::Clear => {
                    ui::print_banner(self.selector.current().await);
                    ui::print_welcome();
                }
                Command::Help => ui::print_help(),
                Command::Model => self.model_picker(&mut lines).await?,
                Command::Empty => {
                    println!("{}", "Please enter a valid query.".red());
                }
                Command::Query(query) => {
                    if let Some(reply) = simple_response(query) {
                        ui::print_simple_response(reply);
                        continue;
                    }
                    self.run_query(query).await;
                }
            }
        }

        Ok(())
    }

    async fn run_query(&self, query: &str) {
        ui::print_query_header(query, self.selector.current().await);

        match self.agent.run(query, &self.session_id).await {
            Ok(RunOutcome::Completed) => {}
            Ok(RunOutcome::StepBudgetExhausted) => {
                println!(
                    "{}",
                    "Stopped: the step budget ran out before a final answer. \
                     Try a narrower request."
                        .yellow()
                );
            }
            Err(error) => self.report_error(error),
        }
    }

    fn report_error(&self, error: AgentError) {
        println!("{} {}", "✖".red(), error.to_string().red());
        if let AgentError::Llm(llm_error) = &error {
            if let Some(env_var) = llm_error.credential_hint() {
                println!(
                    "{}",
                    format!(
                        "Add {}=<your key> to your environment or .env file, \
                         or type \"model\" to switch backends.",
                        env_var
                    )
                    .yellow()
                );
            }
        }
        println!();
    }

    /// Numbered model selection; reselecting the active model is a no-op.
    async fn model_picker(&self, lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<()> {
        let current = self.selector.current().await;

        println!("{}", "AI MODEL SELECTOR".cyan().bold());
        for (index, model) in ModelId::ALL.iter().enumerate() {
            let marker = if *model == current { " (current)" } else { "" };
            println!(
                "   {}. {} - {}{}",
                index + 1,
                model.display_name(),
                model.description().dimmed(),
                marker.green()
            );
        }
        prompt("Select a model (number or id, empty to cancel):");

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let choice = line.trim();
        if choice.is_empty() || choice.eq_ignore_ascii_case("back") {
            println!("{}", "Model selection cancelled".dimmed());
            println!();
            return Ok(());
        }

        let selected = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| ModelId::ALL.get(n.checked_sub(1)?).copied())
            .or_else(|| ModelId::parse(choice));

        match selected {
            Some(model) if self.selector.switch(model).await => {
                ui::print_banner(model);
                println!(
                    "{}",
                    format!("Switched to {}", model.display_name()).green()
                );
                println!("{}", "Ready to accept queries with the new model.".dimmed());
                println!();
            }
            Some(_) => {
                println!("{}", "Already using this model - nothing changed.".yellow());
                println!();
            }
            None => {
                println!("{}", format!("Unknown model: {}", choice).red());
                println!();
            }
        }

        Ok(())
    }
}

fn prompt(question: &str) {
    print!("{} {} ", "❯".cyan(), question.bold());
    let _ = std::io::stdout().flush();
}
