//! Infrastructure layer for Sage.
//!
//! Contains implementations of the ports defined in `sage-core`: the JSON
//! conversation store, option files, the encrypted credential store, the
//! OpenAI and Ollama backends, the system inspector, terminal dispatch, and
//! screen capture.

pub mod capture;
pub mod config;
pub mod conversation;
pub mod crypto;
pub mod filesystem;
pub mod llm;
pub mod secret;
pub mod system;
pub mod terminal;
