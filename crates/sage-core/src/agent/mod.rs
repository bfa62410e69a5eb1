//! Session orchestration: bootstrap, turn execution, and summarization.

pub mod bootstrap;
pub mod engine;
pub mod summarizer;

pub use bootstrap::{BootstrapOutcome, SessionBootstrapper};
pub use engine::{AgentEngine, IMAGE_REQUEST_PREFIX, PendingTurn};
pub use summarizer::ConversationSummarizer;
