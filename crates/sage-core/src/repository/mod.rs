//! Storage port traits implemented by sage-infra.

pub mod conversation;
pub mod credential;
