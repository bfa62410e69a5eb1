//! The `options` command: edit session options interactively.
//!
//! Edits go to a draft; nothing changes until the user saves, at which
//! point the draft replaces the live options and is written to the user
//! options file. Values pass the same validation as the option files.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Input, Select};

use sage_infra::config::save_options;
use sage_types::config::{ModelProvider, Options, OptionsLayer};

use crate::state::AppState;

const OTHER_MODEL: &str = "Other (type a model name)";

/// Editable settings, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Model,
    Provider,
    Temperature,
    MaxTokens,
    ContextWindowSize,
    TerminalEmulator,
}

impl Setting {
    pub const ALL: [Setting; 6] = [
        Setting::Model,
        Setting::Provider,
        Setting::Temperature,
        Setting::MaxTokens,
        Setting::ContextWindowSize,
        Setting::TerminalEmulator,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Setting::Model => "Model",
            Setting::Provider => "Provider",
            Setting::Temperature => "Temperature",
            Setting::MaxTokens => "Max tokens",
            Setting::ContextWindowSize => "Context window size",
            Setting::TerminalEmulator => "Terminal emulator",
        }
    }

    pub fn current(self, options: &Options) -> String {
        match self {
            Setting::Model => options.model.clone(),
            Setting::Provider => options.model_provider.to_string(),
            Setting::Temperature => options.temperature.to_string(),
            Setting::MaxTokens => options.max_tokens.to_string(),
            Setting::ContextWindowSize => options.context_window_size.to_string(),
            Setting::TerminalEmulator => options.terminal_emulator.clone(),
        }
    }
}

/// Parse `raw` for `setting` and apply it to `draft`.
///
/// On error `draft` is unchanged and the message says why.
pub fn apply_edit(draft: &mut Options, setting: Setting, raw: &str) -> Result<(), String> {
    let raw = raw.trim();
    let number = |field: &str| {
        raw.parse::<i64>()
            .map_err(|_| format!("{field}: '{raw}' is not a whole number"))
    };

    let mut layer = OptionsLayer::default();
    match setting {
        Setting::Model => layer.model = Some(raw.to_string()),
        Setting::Provider => layer.model_provider = Some(raw.parse::<ModelProvider>()?),
        Setting::Temperature => {
            layer.temperature = Some(
                raw.parse::<f64>()
                    .map_err(|_| format!("temperature: '{raw}' is not a number"))?,
            )
        }
        Setting::MaxTokens => layer.max_tokens = Some(number("max_tokens")?),
        Setting::ContextWindowSize => layer.context_window_size = Some(number("context_window_size")?),
        Setting::TerminalEmulator => layer.terminal_emulator = Some(raw.to_string()),
    }

    match draft.apply_layer(layer).into_iter().next() {
        Some(problem) => Err(problem.to_string()),
        None => Ok(()),
    }
}

pub fn options_table(options: &Options) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Setting").fg(Color::White),
        Cell::new("Value").fg(Color::White),
    ]);
    for setting in Setting::ALL {
        table.add_row(vec![
            Cell::new(setting.label()).fg(Color::Cyan),
            Cell::new(setting.current(options)),
        ]);
    }
    table
}

pub async fn edit_options(state: &mut AppState) -> Result<()> {
    let mut draft = state.options.clone();

    loop {
        println!();
        println!("{}", options_table(&draft));

        let mut items: Vec<String> = Setting::ALL
            .iter()
            .map(|s| format!("Change {}", s.label().to_lowercase()))
            .collect();
        items.push("Save and return".to_string());
        items.push("Cancel".to_string());

        let choice = Select::new()
            .with_prompt("  Options")
            .items(&items)
            .default(0)
            .interact_opt()?;

        let setting = match choice {
            Some(i) if i < Setting::ALL.len() => Setting::ALL[i],
            Some(i) if i == Setting::ALL.len() => {
                save_options(&state.paths, &draft).await?;
                state.options = draft;
                println!(
                    "\n  {} Options saved to {}\n",
                    style("✓").green().bold(),
                    style(state.paths.user_config_file.display()).dim()
                );
                if state.options.model_provider == ModelProvider::OpenAi && state.api_key.is_none() {
                    println!(
                        "  {} No API key is set for openai; use the 'api' command to add one.\n",
                        style("!").yellow().bold()
                    );
                }
                return Ok(());
            }
            _ => {
                println!("\n  {} Changes discarded.\n", style("i").blue().bold());
                return Ok(());
            }
        };

        let Some(raw) = prompt_value(setting, &draft, &state.available_models)? else {
            continue;
        };
        if let Err(reason) = apply_edit(&mut draft, setting, &raw) {
            println!("  {} {reason}", style("!").yellow().bold());
        }
    }
}

fn prompt_value(
    setting: Setting,
    draft: &Options,
    available_models: &[String],
) -> Result<Option<String>> {
    match setting {
        Setting::Model => {
            let mut items: Vec<&str> = available_models.iter().map(String::as_str).collect();
            items.push(OTHER_MODEL);
            let default = available_models
                .iter()
                .position(|m| *m == draft.model)
                .unwrap_or(0);
            let Some(index) = Select::new()
                .with_prompt("  Model")
                .items(&items)
                .default(default)
                .interact_opt()?
            else {
                return Ok(None);
            };
            if index < available_models.len() {
                return Ok(Some(available_models[index].clone()));
            }
            let typed: String = Input::new()
                .with_prompt("  Model name")
                .with_initial_text(draft.model.as_str())
                .interact_text()?;
            Ok(Some(typed))
        }
        Setting::Provider => {
            let providers = [ModelProvider::OpenAi, ModelProvider::Ollama];
            let names: Vec<String> = providers.iter().map(|p| p.to_string()).collect();
            let default = providers
                .iter()
                .position(|p| *p == draft.model_provider)
                .unwrap_or(0);
            Ok(Select::new()
                .with_prompt("  Provider")
                .items(&names)
                .default(default)
                .interact_opt()?
                .map(|i| names[i].clone()))
        }
        other => {
            let typed: String = Input::new()
                .with_prompt(format!("  {}", other.label()))
                .with_initial_text(other.current(draft))
                .interact_text()?;
            Ok(Some(typed))
        }
    }
}
