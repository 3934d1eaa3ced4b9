//! Slash command parser for the interactive chat session
//!
//! Lines starting with `/` are session commands rather than messages:
//! - Start a new conversation or open an existing one
//! - List, search and delete conversations
//! - Switch the display theme
//! - View session status and help
//! - Exit the session
//!
//! Command names are case-insensitive; arguments (ids, search terms) keep
//! their case.

use crate::cli::ThemeMode;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Commands that can be executed during an interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Clear the screen; the next message starts a new conversation
    NewConversation,

    /// Show the sidebar, optionally filtered by a search term
    ListConversations(Option<String>),

    /// Load a conversation and make it current
    OpenConversation(String),

    /// Delete a conversation
    DeleteConversation(String),

    /// Set the theme, or toggle it when no theme is given
    Theme(Option<ThemeMode>),

    /// Display session status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the session
    Exit,

    /// Not a command; the line is a chat message
    None,
}

fn required_arg(command: &str, usage: &str, rest: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        });
    }
    Ok(rest.to_string())
}

/// Parse a line entered in the chat session
///
/// # Returns
///
/// `SpecialCommand::None` for regular chat text, or the parsed command
///
/// # Errors
///
/// Returns `CommandError` for unknown commands and bad arguments
///
/// # Examples
///
/// ```
/// use chatline::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(
///     parse_special_command("/open c42").unwrap(),
///     SpecialCommand::OpenConversation("c42".to_string())
/// );
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') {
        return match lower.as_str() {
            "exit" | "quit" => Ok(SpecialCommand::Exit),
            _ => Ok(SpecialCommand::None),
        };
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/new" => Ok(SpecialCommand::NewConversation),
        "/list" | "/ls" => Ok(SpecialCommand::ListConversations(
            (!rest.is_empty()).then(|| rest.to_string()),
        )),
        "/open" => required_arg("/open", "/open <conversation_id>", rest)
            .map(SpecialCommand::OpenConversation),
        "/delete" | "/rm" => required_arg("/delete", "/delete <conversation_id>", rest)
            .map(SpecialCommand::DeleteConversation),
        "/theme" => match rest.to_lowercase().as_str() {
            "" => Ok(SpecialCommand::Theme(None)),
            "dark" => Ok(SpecialCommand::Theme(Some(ThemeMode::Dark))),
            "light" => Ok(SpecialCommand::Theme(Some(ThemeMode::Light))),
            _ => Err(CommandError::UnsupportedArgument {
                command: "/theme".to_string(),
                arg: rest.to_string(),
            }),
        },
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Display help for the interactive session
pub fn print_help() {
    println!(
        r#"
Commands for the Interactive Chat Session
=========================================

CONVERSATIONS:
  /new              - Start a new conversation
  /list [term]      - Show conversations grouped by recency
  /ls [term]        - Same as /list
  /open <id>        - Open a conversation
  /delete <id>      - Delete a conversation
  /rm <id>          - Same as /delete

DISPLAY:
  /theme            - Toggle between dark and light
  /theme dark|light - Set the theme

SESSION INFORMATION:
  /status           - Show the current conversation and account
  /help             - Show this help message
  /?                - Same as /help

SESSION CONTROL:
  exit              - Exit the session
  quit              - Same as exit

NOTES:
  - Command names are case-insensitive
  - Regular text (not starting with /) is sent to the assistant
  - Your first message in a new conversation creates it on the server
"#
    );
}
