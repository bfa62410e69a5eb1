//! Dispatch of a single command to a terminal-spawning collaborator.

use sage_types::config::Options;
use sage_types::conversation::Conversation;
use sage_types::error::ExecutionError;

/// Spawns a command in a separate terminal window.
///
/// Fire-and-forget: the child is not awaited and its output never reaches
/// the conversation.
pub trait CommandDispatcher: Send + Sync {
    fn dispatch(&self, command: &str, terminal_emulator: &str) -> Result<(), ExecutionError>;
}

/// The system note recorded after a command was handed to a terminal.
pub fn executed_note(command: &str) -> String {
    format!("Command executed: {command} (output handled in separate terminal)")
}

/// Dispatch `command` and, on success, append a system note so later turns
/// know it ran. On failure the conversation is left untouched.
pub fn dispatch_and_record<D: CommandDispatcher + ?Sized>(
    dispatcher: &D,
    conversation: &mut Conversation,
    command: &str,
    options: &Options,
) -> Result<(), ExecutionError> {
    dispatcher.dispatch(command, &options.terminal_emulator)?;
    tracing::info!(terminal = %options.terminal_emulator, command, "command dispatched");
    conversation.push_system(executed_note(command));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingDispatcher {
        fail: bool,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl CommandDispatcher for RecordingDispatcher {
        fn dispatch(&self, command: &str, terminal: &str) -> Result<(), ExecutionError> {
            if self.fail {
                return Err(ExecutionError::TerminalNotFound(terminal.to_string()));
            }
            self.seen
                .lock()
                .unwrap()
                .push((command.to_string(), terminal.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_success_appends_system_note() {
        let dispatcher = RecordingDispatcher {
            fail: false,
            seen: Mutex::new(Vec::new()),
        };
        let mut conv = Conversation::primed("p", "s", None);
        let options = Options {
            terminal_emulator: "xterm".to_string(),
            ..Options::default()
        };

        dispatch_and_record(&dispatcher, &mut conv, "ls -la", &options).unwrap();

        assert_eq!(conv.len(), 3);
        let last = conv.last().unwrap();
        assert!(last.is_system());
        assert_eq!(
            last.content,
            "Command executed: ls -la (output handled in separate terminal)"
        );
        assert_eq!(
            dispatcher.seen.lock().unwrap().as_slice(),
            &[("ls -la".to_string(), "xterm".to_string())]
        );
    }

    #[test]
    fn test_failure_leaves_conversation_untouched() {
        let dispatcher = RecordingDispatcher {
            fail: true,
            seen: Mutex::new(Vec::new()),
        };
        let mut conv = Conversation::primed("p", "s", None);
        let before = conv.clone();

        let err = dispatch_and_record(&dispatcher, &mut conv, "ls", &Options::default());

        assert!(matches!(err, Err(ExecutionError::TerminalNotFound(_))));
        assert_eq!(conv, before);
    }
}
