//! The `api` command: view, replace, or remove the stored key.

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Password, Select};
use secrecy::SecretString;

use sage_core::repository::credential::{CredentialStore, mask_secret};

use crate::state::AppState;

pub async fn manage_api_key(state: &mut AppState) -> Result<()> {
    let items = [
        "View current API key",
        "Replace API key",
        "Remove stored API key",
        "Return to conversation",
    ];
    let choice = Select::new()
        .with_prompt("  API key")
        .items(&items)
        .default(0)
        .interact_opt()?;

    match choice {
        Some(0) => match state.credentials.resolve().await {
            Ok(Some((value, source))) => println!(
                "\n  {} {} (from {source})\n",
                style("Current key:").bold(),
                style(mask_secret(&value)).cyan()
            ),
            Ok(None) => println!("\n  {} No API key is stored.\n", style("i").blue().bold()),
            Err(e) => println!("\n  {} {e}\n", style("!").red().bold()),
        },
        Some(1) => {
            let key = Password::new()
                .with_prompt("  Enter the new API key")
                .allow_empty_password(true)
                .interact()?;
            let key = key.trim().to_string();
            if key.is_empty() {
                println!("\n  {} Nothing entered, key unchanged.\n", style("i").blue().bold());
                return Ok(());
            }
            state.credentials.set(&key).await?;
            println!(
                "\n  {} API key replaced ({})\n",
                style("✓").green().bold(),
                mask_secret(&key)
            );
            state.api_key = Some(SecretString::from(key));
        }
        Some(2) => {
            let confirmed = Confirm::new()
                .with_prompt("  Remove the stored API key?")
                .default(false)
                .interact()?;
            if !confirmed {
                return Ok(());
            }
            if state.credentials.remove().await? {
                println!("\n  {} Stored API key removed.\n", style("✓").green().bold());
            } else {
                println!("\n  {} No stored API key to remove.\n", style("i").blue().bold());
            }
            // The environment may still supply one.
            state.api_key = state.credentials.get().await?.map(SecretString::from);
            if state.api_key.is_some() {
                println!(
                    "  {} OPENAI_API_KEY is still set in the environment and remains in use.\n",
                    style("i").blue().bold()
                );
            }
        }
        _ => {}
    }
    Ok(())
}
