//! Command-line interface definition for chatline
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chatting, managing conversations, and the session.

use clap::{Parser, Subcommand, ValueEnum};

/// chatline - terminal client for a conversational AI backend
///
/// Chat with the assistant, browse past conversations grouped by recency,
/// and manage your session from the command line.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL
    #[arg(long, env = "CHATLINE_API_URL")]
    pub api_url: Option<String>,

    /// Override the session database path
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for chatline
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Continue an existing conversation
        #[arg(long)]
        conversation: Option<String>,
    },

    /// Manage conversations
    Conversations {
        /// Conversation subcommand
        #[command(subcommand)]
        command: ConversationCommand,
    },

    /// Log in and store the session token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create a new account
    Signup {
        /// Display name
        #[arg(short, long)]
        username: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Show or set the display theme
    Theme {
        /// Theme to switch to; toggles when omitted
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },
}

/// Conversation management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConversationCommand {
    /// List conversations grouped by recency
    List {
        /// Only show conversations whose title or last message contains TERM
        #[arg(short, long)]
        search: Option<String>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show every message of a conversation
    Show {
        /// Conversation id
        id: String,
    },

    /// Delete a conversation
    Delete {
        /// Conversation id
        id: String,
    },

    /// Create an empty conversation
    New {
        /// Conversation title
        title: String,
    },
}

/// Display theme
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    Light,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            api_url: None,
            storage_path: None,
            command: Commands::Chat { conversation: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(cli.api_url.is_none());
        assert!(matches!(cli.command, Commands::Chat { conversation: None }));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["chatline", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { conversation: None }));
    }

    #[test]
    fn test_cli_parse_chat_with_conversation() {
        let cli = Cli::try_parse_from(["chatline", "chat", "--conversation", "c1"]).unwrap();
        if let Commands::Chat { conversation } = cli.command {
            assert_eq!(conversation.as_deref(), Some("c1"));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_conversations_list() {
        let cli =
            Cli::try_parse_from(["chatline", "conversations", "list", "--search", "rust"]).unwrap();
        if let Commands::Conversations {
            command: ConversationCommand::List { search, json },
        } = cli.command
        {
            assert_eq!(search.as_deref(), Some("rust"));
            assert!(!json);
        } else {
            panic!("Expected Conversations List command");
        }
    }

    #[test]
    fn test_cli_parse_conversations_list_json() {
        let cli = Cli::try_parse_from(["chatline", "conversations", "list", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Conversations {
                command: ConversationCommand::List { json: true, .. }
            }
        ));
    }

    #[test]
    fn test_cli_parse_conversations_show_requires_id() {
        assert!(Cli::try_parse_from(["chatline", "conversations", "show"]).is_err());
        let cli = Cli::try_parse_from(["chatline", "conversations", "show", "c7"]).unwrap();
        if let Commands::Conversations {
            command: ConversationCommand::Show { id },
        } = cli.command
        {
            assert_eq!(id, "c7");
        } else {
            panic!("Expected Conversations Show command");
        }
    }

    #[test]
    fn test_cli_parse_conversations_delete_and_new() {
        let cli = Cli::try_parse_from(["chatline", "conversations", "delete", "c7"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Conversations {
                command: ConversationCommand::Delete { .. }
            }
        ));

        let cli = Cli::try_parse_from(["chatline", "conversations", "new", "Trip plans"]).unwrap();
        if let Commands::Conversations {
            command: ConversationCommand::New { title },
        } = cli.command
        {
            assert_eq!(title, "Trip plans");
        } else {
            panic!("Expected Conversations New command");
        }
    }

    #[test]
    fn test_cli_parse_login() {
        let cli = Cli::try_parse_from(["chatline", "login", "--email", "ana@example.com"]).unwrap();
        if let Commands::Login { email, password } = cli.command {
            assert_eq!(email, "ana@example.com");
            assert!(password.is_none());
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    fn test_cli_parse_login_requires_email() {
        assert!(Cli::try_parse_from(["chatline", "login"]).is_err());
    }

    #[test]
    fn test_cli_parse_signup() {
        let cli = Cli::try_parse_from([
            "chatline",
            "signup",
            "--username",
            "ana",
            "--email",
            "ana@example.com",
            "--password",
            "pw",
        ])
        .unwrap();
        if let Commands::Signup {
            username,
            email,
            password,
        } = cli.command
        {
            assert_eq!(username, "ana");
            assert_eq!(email, "ana@example.com");
            assert_eq!(password.as_deref(), Some("pw"));
        } else {
            panic!("Expected Signup command");
        }
    }

    #[test]
    fn test_cli_parse_theme() {
        let cli = Cli::try_parse_from(["chatline", "theme", "dark"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Theme {
                mode: Some(ThemeMode::Dark)
            }
        ));

        let cli = Cli::try_parse_from(["chatline", "theme"]).unwrap();
        assert!(matches!(cli.command, Commands::Theme { mode: None }));

        assert!(Cli::try_parse_from(["chatline", "theme", "sepia"]).is_err());
    }

    #[test]
    fn test_cli_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "chatline",
            "--config",
            "custom.yaml",
            "--storage-path",
            "/tmp/s.db",
            "-v",
            "logout",
        ])
        .unwrap();
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
        assert_eq!(cli.storage_path.as_deref(), Some("/tmp/s.db"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Logout));
    }

    #[test]
    fn test_cli_parse_missing_command() {
        assert!(Cli::try_parse_from(["chatline"]).is_err());
    }

    #[test]
    fn test_cli_parse_invalid_command() {
        assert!(Cli::try_parse_from(["chatline", "invalid"]).is_err());
    }
}
