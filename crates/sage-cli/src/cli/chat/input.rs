//! Async readline input handling for the chat loop.
//!
//! Wraps `rustyline_async::Readline` and maps its events onto the loop's
//! three outcomes. The line editor holds the terminal in raw mode while it
//! lives, so the loop creates one per prompt and drops it before menus or
//! spinners take over the screen.

use rustyline_async::{Readline, ReadlineError, ReadlineEvent};

/// Events produced by the input handler.
#[derive(Debug, PartialEq)]
pub enum InputEvent {
    /// User submitted a line.
    Message(String),
    /// End of file (Ctrl+D).
    Eof,
    /// Interrupt signal (Ctrl+C).
    Interrupted,
}

impl From<Result<ReadlineEvent, ReadlineError>> for InputEvent {
    fn from(result: Result<ReadlineEvent, ReadlineError>) -> Self {
        match result {
            Ok(ReadlineEvent::Line(line)) => InputEvent::Message(line.trim().to_string()),
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(e) => {
                tracing::debug!(error = %e, "readline failed, treating as end of input");
                InputEvent::Eof
            }
        }
    }
}

pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    pub fn new(prompt: String) -> Result<Self, ReadlineError> {
        let (rl, _writer) = Readline::new(prompt)?;
        Ok(Self { rl })
    }

    /// Read one line.
    pub async fn read_line(&mut self) -> InputEvent {
        self.rl.readline().await.into()
    }
}

/// Read a single line with a fresh editor.
///
/// A terminal that cannot host the editor is treated as end of input.
pub async fn prompt_line(prompt: &str) -> InputEvent {
    match ChatInput::new(prompt.to_string()) {
        Ok(mut input) => input.read_line().await,
        Err(e) => {
            tracing::warn!(error = %e, "could not start the line editor");
            InputEvent::Eof
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_is_trimmed() {
        let event: InputEvent = Ok(ReadlineEvent::Line("  uptime \n".to_string())).into();
        assert_eq!(event, InputEvent::Message("uptime".to_string()));
    }

    #[test]
    fn test_signals_map_to_exit_events() {
        let eof: InputEvent = Ok(ReadlineEvent::Eof).into();
        let interrupted: InputEvent = Ok(ReadlineEvent::Interrupted).into();
        assert_eq!(eof, InputEvent::Eof);
        assert_eq!(interrupted, InputEvent::Interrupted);
    }
}
