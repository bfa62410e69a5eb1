//! Application state wiring the infrastructure together.
//!
//! The Ctrl+C listener is installed first thing in `init`, so an interrupt
//! at any later point reaches the chat loop instead of killing the process.
//!
//! AppState owns the options record, the resolved paths, and one concrete
//! instance of every collaborator. The backend is not stored: it is built
//! from the current options on every call, so an options change applies to
//! the next request.

use std::path::Path;

use anyhow::Context;
use console::style;
use secrecy::SecretString;

use sage_core::agent::AgentEngine;
use sage_infra::capture::ExternalScreenCapture;
use sage_infra::config::{load_available_models, load_options};
use sage_infra::conversation::JsonConversationStore;
use sage_infra::crypto::vault::VaultCrypto;
use sage_infra::filesystem::SagePaths;
use sage_infra::llm::select_provider;
use sage_infra::secret::EncryptedFileCredentialStore;
use sage_infra::secret::chain::CredentialChain;
use sage_infra::secret::env::EnvCredentialStore;
use sage_infra::system::LocalSystemInspector;
use sage_infra::terminal::TerminalDispatcher;
use sage_types::config::Options;
use sage_types::llm::BackendError;

use crate::cli::chat::interrupt::InterruptWatch;

pub struct AppState {
    pub paths: SagePaths,
    pub options: Options,
    pub available_models: Vec<String>,
    pub store: JsonConversationStore,
    pub credentials: CredentialChain,
    pub api_key: Option<SecretString>,
    pub dispatcher: TerminalDispatcher,
    pub inspector: LocalSystemInspector,
    pub capture: ExternalScreenCapture,
    pub interrupts: InterruptWatch,
}

impl AppState {
    /// Resolve paths, load options, and open the credential vault.
    pub async fn init(data_dir: Option<&Path>) -> anyhow::Result<Self> {
        let interrupts = InterruptWatch::install();
        let paths = SagePaths::resolve(data_dir);
        tokio::fs::create_dir_all(&paths.data_dir)
            .await
            .with_context(|| format!("could not create {}", paths.data_dir.display()))?;

        let (options, problems) = load_options(&paths).await;
        for problem in &problems {
            eprintln!("  {} {problem}", style("!").yellow().bold());
        }
        let available_models = load_available_models(&paths).await;

        let crypto = VaultCrypto::open(&paths.secret_key_file, &paths.api_key_file)
            .await
            .context("could not open the credential vault")?;
        let credentials = CredentialChain::new(
            EnvCredentialStore::new(),
            EncryptedFileCredentialStore::new(&paths.api_key_file, crypto),
        );

        tracing::info!(
            data_dir = %paths.data_dir.display(),
            model = %options.model,
            provider = %options.model_provider,
            "state initialized"
        );

        Ok(Self {
            store: JsonConversationStore::new(&paths.conversation_file),
            capture: ExternalScreenCapture::new(&paths.capture_file),
            paths,
            options,
            available_models,
            credentials,
            api_key: None,
            dispatcher: TerminalDispatcher::new(),
            inspector: LocalSystemInspector::new(),
            interrupts,
        })
    }

    /// Build an engine for the backend the current options name.
    pub fn engine(&self) -> Result<AgentEngine, BackendError> {
        select_provider(&self.options, self.api_key.as_ref()).map(AgentEngine::new)
    }
}
