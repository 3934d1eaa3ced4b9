/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`          — Interactive chat session
- `conversations` — List, show, create and delete conversations
- `auth`          — Login, signup and logout
- `theme`         — Display theme preference

Handlers open the session store, build an HTTP backend with the stored
token, and drive a `ChatController`.
*/

use crate::api::{ChatBackend, HttpBackend};
use crate::chat::ChatController;
use crate::config::Config;
use crate::error::Result;
use crate::session::{AuthSession, SessionContext};
use crate::storage::SqliteStorage;
use std::sync::Arc;

// Conversation management commands
pub mod conversations;

// Terminal rendering helpers
pub mod render;

// Slash command parser for the chat session
pub mod special_commands;

/// Open the session store configured for this run
pub fn open_session(config: &Config) -> Result<SessionContext> {
    let storage = SqliteStorage::open(config.storage.path.as_deref())?;
    Ok(SessionContext::new(storage))
}

/// Build a controller for the logged-in user
///
/// # Errors
///
/// Returns `NotAuthenticated` when no session is stored
pub fn connect(config: &Config, session: &SessionContext) -> Result<(ChatController, AuthSession)> {
    let auth = session.require_auth()?;
    let backend: Arc<dyn ChatBackend> =
        Arc::new(HttpBackend::new(&config.api, Some(auth.token.clone()))?);
    let controller = ChatController::from_config(backend, config, session.dark_mode());
    Ok((controller, auth))
}

// Chat command handler
pub mod chat {
    //! Interactive chat session handler.
    //!
    //! Runs a readline loop: slash commands manage conversations and the
    //! session, everything else is sent to the assistant.

    use super::render::{print_message, print_sidebar, print_transcript, Palette};
    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::api::User;
    use crate::chat::{ChatState, SendReport};
    use crate::cli::ThemeMode;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start the interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `conversation` - Optional conversation to continue
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a stored session, or an error if
    /// the requested conversation cannot be loaded
    pub async fn run_chat(config: Config, conversation: Option<String>) -> Result<()> {
        let session = open_session(&config)?;
        let (controller, auth) = connect(&config, &session)?;

        if let Err(e) = controller.load_conversations().await {
            eprintln!("{}", e.to_string().yellow());
        }

        let palette = Palette::new(controller.snapshot().dark_mode);
        print_welcome_banner(&auth.user, palette);

        if let Some(id) = conversation {
            controller.open_conversation(&id).await?;
            print_transcript(&controller.snapshot().messages, palette);
        }

        let mut rl = DefaultEditor::new()?;

        loop {
            let palette = Palette::new(controller.snapshot().dark_mode);
            match rl.readline(&palette.prompt()) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    rl.add_history_entry(trimmed)?;

                    match command {
                        SpecialCommand::NewConversation => {
                            controller.new_conversation();
                            println!("{}\n", "Started a new conversation.".green());
                        }
                        SpecialCommand::ListConversations(term) => {
                            if let Err(e) = controller.load_conversations().await {
                                eprintln!("{}", e.to_string().yellow());
                            }
                            controller.set_search(term.as_deref().unwrap_or_default());
                            let view = controller.sidebar(&chrono::Local::now());
                            print_sidebar(&view, term.as_deref(), palette);
                        }
                        SpecialCommand::OpenConversation(id) => {
                            match controller.open_conversation(&id).await {
                                Ok(_) => print_transcript(&controller.snapshot().messages, palette),
                                Err(e) => eprintln!("{}", e.to_string().red()),
                            }
                        }
                        SpecialCommand::DeleteConversation(id) => {
                            match controller.delete_conversation(&id).await {
                                Ok(()) => {
                                    println!("{}", format!("Deleted conversation {}", id).green())
                                }
                                Err(_) => {
                                    if let Some(notice) = controller.take_notification() {
                                        eprintln!("{}", notice.red());
                                    }
                                }
                            }
                        }
                        SpecialCommand::Theme(mode) => {
                            let result = match mode {
                                Some(mode) => controller
                                    .set_dark_mode(&session, mode == ThemeMode::Dark)
                                    .map(|_| mode == ThemeMode::Dark),
                                None => controller.toggle_dark_mode(&session),
                            };
                            match result {
                                Ok(dark) => {
                                    let palette = Palette::new(dark);
                                    println!("Theme set to {}\n", palette.accent(palette.name()));
                                }
                                Err(e) => eprintln!("{}", e.to_string().red()),
                            }
                        }
                        SpecialCommand::ShowStatus => {
                            print_status_display(&auth.user, &controller.snapshot(), &config);
                        }
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            send_with_progress(&controller, &line, palette).await;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted. Type 'exit' to quit.");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    break;
                }
            }
        }

        tracing::info!("Chat session ended");
        Ok(())
    }

    /// Send a message, announcing when it runs past the slow-response threshold
    async fn send_with_progress(controller: &ChatController, text: &str, palette: Palette) {
        let mut slow = controller.watch_slow_response();
        let send = controller.send_message(text);
        tokio::pin!(send);

        println!("{}", palette.muted("Thinking..."));
        let report = loop {
            tokio::select! {
                report = &mut send => break report,
                changed = slow.changed() => {
                    if changed.is_err() {
                        break (&mut send).await;
                    }
                    if *slow.borrow_and_update() {
                        println!("{}", "This is taking a bit longer than usual...".yellow());
                    }
                }
            }
        };

        if let SendReport::Settled(_) = report {
            if let Some(reply) = controller.snapshot().messages.last() {
                print_message(reply, palette);
            }
        }
    }

    fn print_welcome_banner(user: &User, palette: Palette) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                chatline - Interactive Session                ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Signed in as {} <{}>", palette.accent(&user.username), user.email);
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Display status information about the current session
    ///
    /// Shows the account, the current conversation, and the backend in use.
    /// This is called when the user types '/status'.
    fn print_status_display(user: &User, state: &ChatState, config: &Config) {
        let palette = Palette::new(state.dark_mode);

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    chatline Session Status                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Account:           {} <{}>", user.username, user.email);
        println!("Backend:           {}", config.api.base_url);
        println!(
            "Conversation:      {}",
            state
                .current_conversation_id
                .as_deref()
                .map(|id| palette.accent(id).to_string())
                .unwrap_or_else(|| palette.muted("new").to_string())
        );
        println!("Messages:          {}", state.messages.len());
        println!("Conversations:     {}", state.conversations.len());
        println!("Theme:             {}", palette.name());
        println!();
    }
}

// Authentication commands
pub mod auth {
    use super::*;
    use colored::Colorize;

    fn resolve_password(password: Option<String>) -> Result<String> {
        if let Some(password) = password {
            return Ok(password);
        }
        if let Ok(password) = std::env::var("CHATLINE_PASSWORD") {
            return Ok(password);
        }
        let mut rl = rustyline::DefaultEditor::new()?;
        Ok(rl.readline("Password: ")?)
    }

    /// Log in and persist the session token
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `email` - Account email
    /// * `password` - Password; read from `CHATLINE_PASSWORD` or prompted when absent
    pub async fn login(config: Config, email: String, password: Option<String>) -> Result<()> {
        tracing::info!("Logging in as {}", email);
        let session = open_session(&config)?;
        let password = resolve_password(password)?;

        let backend = HttpBackend::new(&config.api, None)?;
        match backend.login(&email, &password).await {
            Ok(response) => {
                session.store_login(&response)?;
                println!(
                    "{}",
                    format!("Logged in as {}", response.user.username).green()
                );
                Ok(())
            }
            Err(e) => {
                eprintln!("Login failed: {}", e.detail().unwrap_or("invalid credentials"));
                Err(e.into())
            }
        }
    }

    /// Register a new account
    pub async fn signup(
        config: Config,
        username: String,
        email: String,
        password: Option<String>,
    ) -> Result<()> {
        tracing::info!("Creating account for {}", email);
        let password = resolve_password(password)?;

        let backend = HttpBackend::new(&config.api, None)?;
        let user = backend.signup(&username, &email, &password).await?;
        println!("{}", format!("Account created for {}", user.username).green());
        println!(
            "Run {} to start chatting.",
            format!("chatline login --email {}", user.email).cyan()
        );
        Ok(())
    }

    /// Forget the stored token and user record
    pub fn logout(config: Config) -> Result<()> {
        let session = open_session(&config)?;
        session.clear_auth()?;
        println!("{}", "Logged out.".green());
        Ok(())
    }
}

// Theme preference command
pub mod theme {
    use super::render::Palette;
    use super::*;
    use crate::cli::ThemeMode;

    /// Show, set or toggle the persisted display theme
    ///
    /// Returns the theme now in effect.
    pub fn set_theme(config: Config, mode: Option<ThemeMode>) -> Result<bool> {
        let session = open_session(&config)?;
        let dark = match mode {
            Some(mode) => mode == ThemeMode::Dark,
            None => !session.dark_mode(),
        };
        session.set_dark_mode(dark)?;

        let palette = Palette::new(dark);
        println!("Theme set to {}", palette.accent(palette.name()));
        Ok(dark)
    }
}
