//! Startup resolution of the cloud backend API key.

use anyhow::{Result, bail};
use console::style;
use dialoguer::Password;
use secrecy::SecretString;

use sage_core::repository::credential::{CredentialStore, mask_secret};
use sage_types::config::ModelProvider;

use crate::state::AppState;

/// Resolve the API key into `state`, prompting for one when the OpenAI
/// backend is selected and none is stored.
///
/// A key that exists but cannot be decrypted is fatal.
pub async fn load_api_key(state: &mut AppState) -> Result<()> {
    match state.credentials.resolve().await {
        Ok(Some((value, source))) => {
            tracing::debug!(source, "API key resolved");
            state.api_key = Some(SecretString::from(value));
        }
        Ok(None) if state.options.model_provider == ModelProvider::OpenAi => {
            println!();
            println!(
                "  {} No OpenAI API key found. It will be stored encrypted in {}",
                style("i").blue().bold(),
                style(state.paths.api_key_file.display()).dim()
            );
            let key = Password::new()
                .with_prompt("  Enter your OpenAI API key")
                .allow_empty_password(true)
                .interact()?;
            let key = key.trim().to_string();
            if key.is_empty() {
                bail!(
                    "an OpenAI API key is required; set OPENAI_API_KEY or choose the ollama provider in {}",
                    state.paths.user_config_file.display()
                );
            }

            state.credentials.set(&key).await?;
            println!(
                "  {} API key saved ({})",
                style("✓").green().bold(),
                mask_secret(&key)
            );
            state.api_key = Some(SecretString::from(key));
        }
        Ok(None) => {
            tracing::debug!("no API key stored; not needed for {}", state.options.model_provider);
        }
        Err(e) => {
            bail!(
                "could not read the stored API key ({e}); remove {} and run sage again to enter a new one",
                state.paths.api_key_file.display()
            );
        }
    }
    Ok(())
}
