//! Interactive chat session.
//!
//! The loop reads a line, routes recognized commands and shell passthrough,
//! and sends everything else through the windowed backend turn.

pub mod banner;
pub mod bridge;
pub mod commands;
pub mod input;
pub mod interrupt;
pub mod loop_runner;
pub mod renderer;
