//! Model backend abstractions for Sage.
//!
//! - `LlmProvider`: RPITIT trait for concrete backends
//! - `BoxLlmProvider`: object-safe wrapper so the backend can be chosen at
//!   runtime from `Options::model_provider`

pub mod box_provider;
pub mod provider;

#[cfg(test)]
pub(crate) mod testing;
