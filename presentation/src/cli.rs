use application::chat_engine::DocumentChatEngine;
use application::response_service::ResponseService;
use application::summary_service::SummaryService;
use clap::Parser;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input};
use domain::envelope::Envelope;
use domain::models::History;
use domain::phrases;
use infrastructure::completion_client::CompletionClient;
use infrastructure::config::Config;
use shared::confirmation::ask_confirmation;
use shared::telemetry::Telemetry;
use shared::types::Result;

const COPILOT_PERSONA: &str = "You are CoPilot, a thoughtful conversational assistant. \
    Help the user develop their idea with concrete, specific guidance, \
    and keep the tone warm and encouraging.";

#[derive(Parser)]
#[command(name = "copilot")]
#[command(about = "Conversational CoPilot assistant with document-grounded answers")]
pub struct Cli {
    /// Enter interactive chat mode
    #[arg(long)]
    pub chat: bool,

    /// Compress every reply into three brief bullet points
    #[arg(long)]
    pub bullets: bool,

    /// Ground answers in this document directory (builds the index if needed)
    #[arg(long)]
    pub docs: Option<String>,

    /// Rebuild the document index before answering
    #[arg(long)]
    pub index: bool,

    /// Model identifier override
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature override
    #[arg(long)]
    pub temperature: Option<f32>,

    /// The question to ask (one-shot mode)
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}

pub struct CliApp {
    config: Config,
    responses: ResponseService<CompletionClient>,
    summaries: SummaryService<CompletionClient>,
    engine: Option<DocumentChatEngine>,
    bullets: bool,
}

impl CliApp {
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = Config::load();
        if let Some(model) = &cli.model {
            config.model = model.clone();
        }
        if let Some(temperature) = cli.temperature {
            config.temperature = temperature;
        }
        if let Some(docs) = &cli.docs {
            config.docs_path = docs.clone();
        }

        let client = CompletionClient::new(&config)?;
        let engine = if cli.docs.is_some() || cli.index {
            Some(DocumentChatEngine::new(
                &config.docs_path,
                &config.db_path,
                client.clone(),
                &config,
            )?)
        } else {
            None
        };

        Ok(Self {
            config,
            responses: ResponseService::new(client.clone()),
            summaries: SummaryService::new(client),
            engine,
            bullets: cli.bullets,
        })
    }

    pub async fn run(&mut self, cli: Cli) -> Result<()> {
        if let Some(engine) = &self.engine {
            let indexed = engine.indexed_chunks()?;
            let rebuild = if cli.index && indexed > 0 {
                ask_confirmation(
                    &format!("Index already holds {indexed} chunks. Re-scan documents?"),
                    true,
                )?
            } else {
                cli.index || indexed == 0
            };
            if rebuild {
                let added = engine.build_index().await?;
                println!(
                    "{}",
                    format!("Document index ready ({added} new chunks).").green()
                );
            }
        }

        if cli.chat {
            self.run_chat().await
        } else {
            let question = cli.args.join(" ");
            if question.trim().is_empty() {
                println!("{}", "Nothing to ask. Pass a question or use --chat.".yellow());
                return Ok(());
            }
            self.run_one_shot(&question).await
        }
    }

    async fn run_chat(&self) -> Result<()> {
        let mut rng = rand::thread_rng();
        println!("{}", phrases::initial_message(&mut rng).cyan());
        println!("{}", "Type 'exit' to quit.".dimmed());

        let mut history = History::new();
        history.push_system(COPILOT_PERSONA);

        loop {
            let input: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("You")
                .interact_text()?;
            let trimmed = input.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
                break;
            }

            history.push_user(trimmed);
            let reply = self.reply(&history).await;
            if reply.is_error() {
                // Error replies stay out of the history so a transient
                // failure doesn't poison later prompts.
                println!("{}", reply.content.red());
                continue;
            }

            history.push_assistant(&reply.content);
            let shown = if self.bullets {
                self.summaries.transform_bullets(&reply.content).await
            } else {
                reply.content
            };
            if trimmed.to_lowercase().contains("thank") {
                println!("{}", phrases::thanks_phrase(&mut rng).cyan());
            }
            println!("{} {}", "CoPilot:".cyan().bold(), shown);
        }
        Ok(())
    }

    async fn run_one_shot(&self, question: &str) -> Result<()> {
        let mut history = History::new();
        history.push_system(COPILOT_PERSONA);
        history.push_user(question);

        let envelope = self.reply(&history).await;
        if envelope.is_error() {
            println!("{}", envelope.content.red());
            return Ok(());
        }

        let shown = if self.bullets {
            self.summaries.transform_bullets(&envelope.content).await
        } else {
            envelope.content
        };
        println!("{shown}");
        Ok(())
    }

    async fn reply(&self, history: &History) -> Envelope {
        let timer = Telemetry::new();
        eprintln!("Thinking...");
        let envelope = match &self.engine {
            Some(engine) => {
                self.responses
                    .generate_with_context(
                        engine,
                        COPILOT_PERSONA,
                        history,
                        &self.config.model,
                        self.config.temperature,
                    )
                    .await
            }
            None => {
                self.responses
                    .generate(
                        COPILOT_PERSONA,
                        history,
                        &self.config.model,
                        self.config.temperature,
                    )
                    .await
            }
        };
        eprintln!("{}", format!("({} ms)", timer.elapsed().as_millis()).dimmed());
        envelope
    }
}
