//! Command words recognized by the chat loop.
//!
//! A command is a whole line consisting of exactly one known word
//! (case-insensitive). Anything else is passthrough or a user turn.

use console::style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Open the options editor.
    Options,
    /// View, replace, or remove the API key.
    Api,
    /// Capture a screen region and ask about it.
    Capture,
    /// Delete the saved conversation and start fresh.
    Clear,
    /// Save and leave.
    Exit,
}

/// Parse a line as a chat command.
///
/// Returns `None` for anything that is not a single known word.
pub fn parse(input: &str) -> Option<ChatCommand> {
    match input.trim().to_lowercase().as_str() {
        "help" => Some(ChatCommand::Help),
        "options" => Some(ChatCommand::Options),
        "api" => Some(ChatCommand::Api),
        "capture" => Some(ChatCommand::Capture),
        "clear" => Some(ChatCommand::Clear),
        "exit" | "quit" => Some(ChatCommand::Exit),
        _ => None,
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}     {}", style("help").cyan(), "Show this help message");
    println!("  {}  {}", style("options").cyan(), "Change model, provider, and other settings");
    println!("  {}      {}", style("api").cyan(), "View, replace, or remove the API key");
    println!("  {}  {}", style("capture").cyan(), "Capture part of the screen and ask about it");
    println!("  {}    {}", style("clear").cyan(), "Forget the saved conversation and start fresh");
    println!("  {}     {}", style("exit").cyan(), "Save the conversation and leave");
    println!();
    println!(
        "  {}",
        style("Lines starting with a program on your PATH run directly in this terminal.").dim()
    );
    println!("  {}", style("Ctrl+D or Ctrl+C also save and exit.").dim());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_words() {
        assert_eq!(parse("help"), Some(ChatCommand::Help));
        assert_eq!(parse("options"), Some(ChatCommand::Options));
        assert_eq!(parse("api"), Some(ChatCommand::Api));
        assert_eq!(parse("capture"), Some(ChatCommand::Capture));
        assert_eq!(parse("clear"), Some(ChatCommand::Clear));
        assert_eq!(parse("exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("quit"), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!(parse("  HELP "), Some(ChatCommand::Help));
        assert_eq!(parse("Exit"), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_sentences_are_not_commands() {
        assert_eq!(parse("help me fix wifi"), None);
        assert_eq!(parse("clear the cache"), None);
        assert_eq!(parse(""), None);
    }
}
