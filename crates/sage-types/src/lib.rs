//! Shared domain types for Sage.
//!
//! Messages, the conversation record, session options, and the error
//! taxonomy shared by every other crate.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
