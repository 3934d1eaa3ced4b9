//! chatline - terminal client for a conversational AI backend
//!
#![doc = "Main entry point for the chatline application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatline::cli::{Cli, Commands};
use chatline::commands;
use chatline::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Chat { conversation } => {
            tracing::info!("Starting interactive chat session");
            if let Some(id) = &conversation {
                tracing::debug!("Continuing conversation: {}", id);
            }
            commands::chat::run_chat(config, conversation).await?;
            Ok(())
        }
        Commands::Conversations { command } => {
            tracing::info!("Starting conversations command");
            commands::conversations::handle_conversations(config, command).await?;
            Ok(())
        }
        Commands::Login { email, password } => {
            commands::auth::login(config, email, password).await?;
            Ok(())
        }
        Commands::Signup {
            username,
            email,
            password,
        } => {
            commands::auth::signup(config, username, email, password).await?;
            Ok(())
        }
        Commands::Logout => {
            commands::auth::logout(config)?;
            Ok(())
        }
        Commands::Theme { mode } => {
            commands::theme::set_theme(config, mode)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` raises the default level
/// from info to debug.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "chatline=debug"
    } else {
        "chatline=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
