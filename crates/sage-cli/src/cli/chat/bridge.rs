//! Command bridge: offer commands found in a reply for execution.
//!
//! Each chosen command may be edited, then it is handed to the configured
//! terminal emulator. Successful dispatches leave a system note in the
//! conversation; the command output itself is never read back.

use anyhow::Result;
use console::style;
use dialoguer::{Input, Select};

use sage_core::command::dispatch_and_record;
use sage_types::conversation::Conversation;

use crate::state::AppState;

pub const RETURN_ITEM: &str = "Return to conversation";

/// Menu entries: the commands in reply order, then the return item.
pub fn menu_items(commands: &[String]) -> Vec<String> {
    commands
        .iter()
        .cloned()
        .chain(std::iter::once(RETURN_ITEM.to_string()))
        .collect()
}

/// Let the user pick and run commands until they return to the conversation.
pub fn offer_commands(
    state: &AppState,
    conversation: &mut Conversation,
    commands: &[String],
) -> Result<()> {
    let items = menu_items(commands);
    println!();

    loop {
        let choice = Select::new()
            .with_prompt("  Run a suggested command?")
            .items(&items)
            .default(0)
            .interact_opt()?;

        let Some(index) = choice.filter(|&i| i < commands.len()) else {
            return Ok(());
        };

        let edited: String = Input::new()
            .with_prompt("  Command (edit, or clear to skip)")
            .with_initial_text(commands[index].as_str())
            .allow_empty(true)
            .interact_text()?;
        let command = edited.trim();
        if command.is_empty() {
            continue;
        }

        match dispatch_and_record(&state.dispatcher, conversation, command, &state.options) {
            Ok(()) => println!(
                "  {} Running in {}: {}",
                style("✓").green().bold(),
                style(&state.options.terminal_emulator).dim(),
                style(command).cyan()
            ),
            Err(e) => println!("  {} {e}", style("!").red().bold()),
        }
    }
}
