//! Per-request views over the canonical conversation.

pub mod window;
