//! Command extraction and execution bridge.
//!
//! Assistant replies may carry shell code blocks. `extract` pulls the
//! candidate commands out; `dispatch` hands one to a terminal-spawning
//! collaborator and records the fact in the conversation.

pub mod dispatch;
pub mod extract;
pub mod path;

pub use dispatch::{CommandDispatcher, dispatch_and_record, executed_note};
pub use extract::extract_commands;
