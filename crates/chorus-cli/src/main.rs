use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tracing_subscriber::EnvFilter;

use chorus_application::{ChatUseCase, SubmitOutcome};
use chorus_core::config::ChorusConfig;
use chorus_core::credential::{CredentialSource, CredentialState};
use chorus_core::persona::PersonaRegistry;
use chorus_core::secret::SecretService;
use chorus_core::session::PersonaSwitch;
use chorus_infrastructure::{ChorusPaths, ConfigService, FileRecordStore, SecretServiceImpl};
use chorus_interaction::GeminiApiProvider;

mod command;
mod credential;
mod helper;
mod render;

use command::Command;
use credential::TerminalKeyPrompt;
use helper::CliHelper;

#[derive(Parser)]
#[command(name = "chorus")]
#[command(about = "Chorus - a multi-persona chat client for the terminal", long_about = None)]
struct Cli {
    /// Path to config.toml (default: ~/.config/chorus/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding the session and settings records
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Persona for new sessions
    #[arg(long, value_name = "ID")]
    persona: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

enum Flow {
    Continue,
    Quit,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Everything the REPL needs besides the use case itself.
struct App {
    chat: ChatUseCase,
    secrets: Arc<SecretServiceImpl>,
    config: ChorusConfig,
}

impl App {
    fn registry(&self) -> &PersonaRegistry {
        self.chat.registry()
    }

    /// Prompts for a key, then rebuilds the provider with it.
    async fn acquire_key(&self) {
        match self.chat.acquire_credential().await {
            Ok(_) => match self.rebuild_provider().await {
                Ok(()) => println!("{}", "API key saved.".bright_green()),
                Err(e) => eprintln!("{}", format!("Failed to use the new key: {}", e).red()),
            },
            Err(e) => eprintln!("{}", format!("{}", e).red()),
        }
    }

    async fn rebuild_provider(&self) -> Result<()> {
        let api_key = self.secrets.gemini_api_key().await?.unwrap_or_default();
        let provider = GeminiApiProvider::new(api_key, self.config.provider.clone())?;
        self.chat.replace_provider(Arc::new(provider)).await;
        Ok(())
    }

    async fn session_id_at(&self, index: usize) -> Option<String> {
        let snapshot = self.chat.snapshot().await;
        snapshot
            .store
            .sessions()
            .get(index - 1)
            .map(|session| session.id.clone())
    }

    async fn show_active(&self) {
        match self.chat.active_session().await {
            Some(session) => render::print_session(&session, self.registry()),
            None => println!("{}", "No active session. Use /new to start one.".bright_black()),
        }
    }

    async fn handle(&self, command: Command) -> Result<Flow> {
        match command {
            Command::Submit(text) => self.submit(&text).await?,
            Command::New(persona) => {
                self.chat.create_session(persona.as_deref()).await?;
                self.show_active().await;
            }
            Command::Sessions => {
                render::print_sessions(&self.chat.snapshot().await, self.registry());
            }
            Command::Switch(index) => match self.session_id_at(index).await {
                Some(id) => {
                    self.chat.switch_session(&id).await?;
                    self.show_active().await;
                }
                None => println!("{}", format!("No session #{}", index).yellow()),
            },
            Command::Delete(index) => match self.session_id_at(index).await {
                Some(id) => {
                    self.chat.delete_session(&id).await?;
                    println!("{}", format!("Deleted session #{}", index).bright_black());
                }
                None => println!("{}", format!("No session #{}", index).yellow()),
            },
            Command::Rename(title) => match self.chat.active_session().await {
                Some(session) => {
                    self.chat.rename_session(&session.id, &title).await?;
                }
                None => println!("{}", "No active session.".yellow()),
            },
            Command::Persona(id) => match self.chat.switch_persona(&id).await? {
                PersonaSwitch::Retargeted { .. } => {
                    println!("{}", format!("This session now talks to {}.", id).bright_black());
                }
                PersonaSwitch::Created { .. } => self.show_active().await,
            },
            Command::Personas => {
                let active = self.chat.active_session().await.map(|s| s.persona_id);
                render::print_personas(self.registry(), active.as_deref());
            }
            Command::Image(on) => render::print_settings(&self.chat.set_use_image_gen(on).await),
            Command::Search(on) => {
                render::print_settings(&self.chat.set_use_live_search(on).await)
            }
            Command::Theme(theme) => render::print_settings(&self.chat.set_theme(theme).await),
            Command::Key => self.acquire_key().await,
            Command::Wipe => {
                self.chat.wipe().await?;
                println!("{}", "All sessions deleted.".bright_black());
                self.show_active().await;
            }
            Command::Help => render::print_help(),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn submit(&self, text: &str) -> Result<()> {
        println!("{}", "...".bright_black());
        match self.chat.submit(text).await? {
            SubmitOutcome::Replied { session_id, reply } => {
                let snapshot = self.chat.snapshot().await;
                let persona = match snapshot.store.get(&session_id) {
                    Some(session) => self.registry().get(&session.persona_id)?,
                    None => self.registry().default_persona(),
                };
                render::print_message(&reply, persona);
            }
            SubmitOutcome::Busy => println!("{}", "Still working on the last message.".yellow()),
            SubmitOutcome::Ignored => {
                println!("{}", "No active session. Use /new to start one.".bright_black())
            }
            SubmitOutcome::Discarded { .. } => {
                println!("{}", "The session was deleted; reply dropped.".bright_black())
            }
        }
        Ok(())
    }
}

async fn bootstrap(cli: Cli) -> Result<App> {
    let paths = ChorusPaths::new(None).context("Failed to resolve the config directory")?;

    let config_service = match cli.config {
        Some(path) => ConfigService::new(path),
        None => ConfigService::from_paths(&paths),
    };
    let mut config = config_service
        .load_or_create()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;
    if let Some(persona) = cli.persona {
        config.default_persona = persona;
    }

    let data_dir = cli.data_dir.or_else(|| config.storage.data_dir.clone());
    let paths = paths.with_data_dir(data_dir);
    tracing::info!("[Bootstrap] Records in {}", paths.data_dir().display());

    let registry = PersonaRegistry::builtin_with_default(&config.default_persona)?;

    let secrets = Arc::new(SecretServiceImpl::from_paths(&paths));
    let api_key = match secrets.gemini_api_key().await {
        Ok(key) => key.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("[Bootstrap] Could not read secrets: {}", e);
            String::new()
        }
    };
    let provider = Arc::new(GeminiApiProvider::new(api_key, config.provider.clone())?);
    let records = Arc::new(FileRecordStore::from_paths(&paths));
    let prompt: Arc<dyn CredentialSource> = Arc::new(TerminalKeyPrompt::new(secrets.clone()));

    let chat = ChatUseCase::load(
        registry,
        provider,
        config.to_dispatch_config(),
        records,
        Some(prompt),
    )
    .await;

    Ok(App {
        chat,
        secrets,
        config,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let app = bootstrap(cli).await?;

    println!("{}", "=== Chorus ===".bright_magenta().bold());
    render::print_settings(&app.chat.settings().await);
    println!("{}", "Type /help for commands, /quit to exit.".bright_black());
    println!();

    if app.chat.credential_state().await != CredentialState::Authorized {
        println!("{}", "No Gemini API key found.".yellow());
        app.acquire_key().await;
    }
    app.show_active().await;

    let persona_ids = app.registry().all().iter().map(|p| p.id.clone()).collect();
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new(persona_ids)));

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                let command = match command::parse(&line) {
                    Ok(command) => command,
                    Err(usage) => {
                        println!("{}", usage.yellow());
                        continue;
                    }
                };

                match app.handle(command).await {
                    Ok(Flow::Quit) => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Ok(Flow::Continue) => {}
                    Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
