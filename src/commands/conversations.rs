use crate::cli::ConversationCommand;
use crate::commands::render::{print_sidebar, print_transcript, Palette};
use crate::commands::{connect, open_session};
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;

/// Handle conversation commands
pub async fn handle_conversations(config: Config, command: ConversationCommand) -> Result<()> {
    let session = open_session(&config)?;
    let (controller, _auth) = connect(&config, &session)?;
    let palette = Palette::new(controller.snapshot().dark_mode);

    match command {
        ConversationCommand::List { search, json } => {
            controller.load_conversations().await?;
            controller.set_search(search.as_deref().unwrap_or_default());
            let view = controller.sidebar(&chrono::Local::now());

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }

            print_sidebar(&view, search.as_deref(), palette);
            println!(
                "Use {} to continue a conversation.",
                "chatline chat --conversation <ID>".cyan()
            );
            println!();
        }
        ConversationCommand::Show { id } => {
            controller.open_conversation(&id).await?;
            print_transcript(&controller.snapshot().messages, palette);
        }
        ConversationCommand::Delete { id } => {
            controller.delete_conversation(&id).await?;
            println!("{}", format!("Deleted conversation {}", id).green());
        }
        ConversationCommand::New { title } => {
            let conversation = controller.create_conversation(&title).await?;
            println!(
                "{} {}",
                "Created conversation".green(),
                palette.accent(&conversation.id)
            );
        }
    }

    Ok(())
}
