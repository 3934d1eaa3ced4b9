//! Terminal rendering for messages and the conversation sidebar

use crate::chat::SidebarView;
use crate::conversation::{Conversation, Message};
use crate::format::render_ai_message_ansi;
use colored::{ColoredString, Colorize};
use prettytable::{format, Table};

const TITLE_WIDTH: usize = 40;
const PREVIEW_WIDTH: usize = 48;

/// Colors for the active display theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    dark: bool,
}

impl Palette {
    pub fn new(dark: bool) -> Self {
        Self { dark }
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    /// Theme name as shown to the user
    pub fn name(&self) -> &'static str {
        if self.dark {
            "dark"
        } else {
            "light"
        }
    }

    pub fn accent(&self, text: &str) -> ColoredString {
        if self.dark {
            text.bright_cyan()
        } else {
            text.blue()
        }
    }

    pub fn muted(&self, text: &str) -> ColoredString {
        if self.dark {
            text.bright_black()
        } else {
            text.dimmed()
        }
    }

    pub fn user_label(&self) -> ColoredString {
        if self.dark {
            "You".bright_green().bold()
        } else {
            "You".green().bold()
        }
    }

    pub fn ai_label(&self) -> ColoredString {
        if self.dark {
            "Assistant".bright_magenta().bold()
        } else {
            "Assistant".magenta().bold()
        }
    }

    /// Prompt string for the line editor
    pub fn prompt(&self) -> String {
        format!("{} ", self.accent(">"))
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Print one chat message
pub fn print_message(message: &Message, palette: Palette) {
    let label = if message.is_ai() {
        palette.ai_label()
    } else {
        palette.user_label()
    };
    match &message.timestamp {
        Some(ts) => println!("{} {}", label, palette.muted(ts)),
        None => println!("{}", label),
    }
    if message.is_ai() {
        println!("{}\n", render_ai_message_ansi(&message.content));
    } else {
        println!("{}\n", message.content);
    }
}

/// Print every message of a conversation
pub fn print_transcript(messages: &[Message], palette: Palette) {
    if messages.is_empty() {
        println!("{}", palette.muted("No messages yet."));
        return;
    }
    for message in messages {
        print_message(message, palette);
    }
}

fn add_conversation_row(table: &mut Table, conversation: &Conversation, palette: Palette) {
    let preview = conversation
        .last_message
        .as_deref()
        .map(|m| truncate(&m.replace('\n', " "), PREVIEW_WIDTH))
        .unwrap_or_else(|| "-".to_string());
    let updated = conversation
        .updated_at
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M")
        .to_string();

    table.add_row(prettytable::row![
        palette.accent(&conversation.id),
        truncate(&conversation.title, TITLE_WIDTH),
        preview,
        updated
    ]);
}

/// Print the sidebar: one table per non-empty recency bucket
pub fn print_sidebar(view: &SidebarView, search: Option<&str>, palette: Palette) {
    if view.loading {
        println!("{}", palette.muted("Loading conversations..."));
    }

    if !view.has_conversations {
        println!("{}", "No conversations yet.".yellow());
        return;
    }

    if !view.has_results {
        println!(
            "{}",
            format!("No conversations match \"{}\".", search.unwrap_or_default()).yellow()
        );
        return;
    }

    for (bucket, conversations) in view.buckets.non_empty() {
        println!("\n{}", bucket.label().bold());

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
        table.add_row(prettytable::row![
            "ID".bold(),
            "Title".bold(),
            "Last Message".bold(),
            "Updated".bold()
        ]);
        for conversation in conversations {
            add_conversation_row(&mut table, conversation, palette);
        }
        table.printstd();
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_long_text_on_char_boundary() {
        let text = "ééééééééééééé";
        let out = truncate(text, 8);
        assert_eq!(out.chars().count(), 8);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_palette_names() {
        assert_eq!(Palette::new(true).name(), "dark");
        assert_eq!(Palette::new(false).name(), "light");
        assert!(Palette::new(true).is_dark());
    }
}
