//! Conversation lifecycle logic and port traits for Sage.
//!
//! This crate defines the "ports" (store, backend, inspector, dispatcher traits)
//! that the infrastructure layer implements, plus the pure conversation
//! logic: bootstrap, context windowing, summarization, and command
//! extraction. It depends only on `sage-types` -- never on `sage-infra`
//! or any file/network crate.

pub mod agent;
pub mod command;
pub mod conversation;
pub mod llm;
pub mod repository;
pub mod system;
