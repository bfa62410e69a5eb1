//! The interactive chat loop.
//!
//! Startup: banner, bootstrap (previous-session summary and greeting).
//! Each line is then a command, a shell passthrough, or a user turn. End of
//! input, an interrupt, or `exit` all leave through the same path: the
//! canonical conversation is saved and the process ends. An interrupt
//! during startup leaves the previous record untouched, and one during a
//! shell passthrough only stops the child.

use std::future::Future;

use anyhow::Result;
use console::style;
use dialoguer::Confirm;

use sage_core::agent::{IMAGE_REQUEST_PREFIX, PendingTurn, SessionBootstrapper};
use sage_core::command::extract_commands;
use sage_core::command::path::resolve_on_path;
use sage_core::repository::conversation::ConversationStore;
use sage_core::system::SystemInspector;
use sage_infra::filesystem::load_system_prompt;
use sage_infra::terminal::run_inline;
use sage_types::config::ModelProvider;
use sage_types::conversation::Conversation;

use super::banner::print_welcome_banner;
use super::bridge;
use super::commands::{self, ChatCommand};
use super::input::{self, InputEvent};
use super::interrupt::InterruptWatch;
use super::renderer::{self, ChatRenderer};
use crate::cli::{api_key, capture, options};
use crate::state::AppState;

const PROMPT: &str = "you> ";
pub const PONDERING: &str = "Sage is pondering...";

/// Whether the loop should keep going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub async fn run_chat_loop(state: &mut AppState, greet: bool) -> Result<()> {
    check_configured_model(state).await?;

    print_welcome_banner(
        &state.options.model,
        &state.options.model_provider.to_string(),
        &state.paths.data_dir,
    );

    let renderer = ChatRenderer::new();
    let system_prompt = load_system_prompt(&state.paths).await;
    let Some(mut conversation) = bootstrap(state, &system_prompt, greet, &renderer).await? else {
        // Nothing new to save; the previous record is left as it was.
        return Ok(());
    };

    loop {
        let line = match input::prompt_line(PROMPT).await {
            InputEvent::Message(line) => line,
            InputEvent::Eof | InputEvent::Interrupted => break,
        };
        if line.is_empty() {
            continue;
        }

        let flow = if let Some(command) = commands::parse(&line) {
            handle_command(command, state, &mut conversation, &renderer, &system_prompt).await
        } else if resolve_on_path(&line).is_some() {
            run_passthrough(&mut conversation, &line).await;
            Ok(Flow::Continue)
        } else {
            run_turn(state, &mut conversation, &renderer, &line).await
        };

        match flow {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => println!("  {} {e:#}", style("!").red().bold()),
        }
    }

    persist(state, &conversation).await;
    Ok(())
}

/// Warn about a cloud model that is not in the installed catalog.
async fn check_configured_model(state: &mut AppState) -> Result<()> {
    if state.options.model_provider != ModelProvider::OpenAi
        || state.available_models.contains(&state.options.model)
    {
        return Ok(());
    }

    println!();
    println!(
        "  {} The configured model '{}' is not among the available models.",
        style("!").yellow().bold(),
        state.options.model
    );
    let edit = Confirm::new()
        .with_prompt("  Open the options editor now?")
        .default(true)
        .interact()?;
    if edit {
        options::edit_options(state).await?;
    }
    Ok(())
}

/// Returns `None` when interrupted before the session was ready.
async fn bootstrap(
    state: &AppState,
    system_prompt: &str,
    greet: bool,
    renderer: &ChatRenderer,
) -> Result<Option<Conversation>> {
    let engine = state.engine()?;
    let snapshot = state.inspector.snapshot();

    let bootstrapper = SessionBootstrapper::new(&state.store, &engine);
    let Some(outcome) = await_backend(
        &state.interrupts,
        "Recalling our last conversation...",
        bootstrapper.run(&state.options, system_prompt, &snapshot, greet),
    )
    .await
    else {
        return Ok(None);
    };

    if let Some(e) = &outcome.load_error {
        println!(
            "  {} {e}; starting a fresh conversation.",
            style("!").yellow().bold()
        );
    }
    if let Some(summary) = &outcome.summary {
        renderer::print_summary(summary);
    }
    if let Some(greeting) = &outcome.greeting {
        renderer.print_reply(greeting);
    }
    if let Some(e) = &outcome.greeting_error {
        println!("  {} Could not fetch a greeting.", style("!").yellow().bold());
        renderer::print_backend_error(e);
    }

    Ok(Some(outcome.conversation))
}

async fn handle_command(
    command: ChatCommand,
    state: &mut AppState,
    conversation: &mut Conversation,
    renderer: &ChatRenderer,
    system_prompt: &str,
) -> Result<Flow> {
    match command {
        ChatCommand::Help => commands::print_help(),
        ChatCommand::Options => options::edit_options(state).await?,
        ChatCommand::Api => api_key::manage_api_key(state).await?,
        ChatCommand::Capture => return capture::capture_and_ask(state, conversation, renderer).await,
        ChatCommand::Clear => {
            if let Err(e) = state.store.clear().await {
                println!("  {} {e}", style("!").red().bold());
            }
            *conversation = Conversation::primed(system_prompt, &state.inspector.snapshot(), None);
            println!(
                "\n  {} Conversation cleared. Starting fresh.\n",
                style("✓").green().bold()
            );
        }
        ChatCommand::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

/// Note recorded after a line ran directly in this terminal.
pub fn passthrough_note(line: &str, code: Option<i32>) -> String {
    match code {
        Some(code) => format!("User ran shell command: {line} (exit status {code})"),
        None => format!("User ran shell command: {line} (terminated by signal)"),
    }
}

async fn run_passthrough(conversation: &mut Conversation, line: &str) {
    match run_inline(line).await {
        Ok(status) => {
            if !status.success() {
                println!("  {} {status}", style("!").yellow().bold());
            }
            conversation.push_system(passthrough_note(line, status.code()));
        }
        Err(e) => println!("  {} {e}", style("!").red().bold()),
    }
}

async fn run_turn(
    state: &AppState,
    conversation: &mut Conversation,
    renderer: &ChatRenderer,
    text: &str,
) -> Result<Flow> {
    let engine = match state.engine() {
        Ok(engine) => engine,
        Err(e) => {
            renderer::print_backend_error(&e);
            return Ok(Flow::Continue);
        }
    };

    let turn = PendingTurn::new(conversation, text, state.options.context_window_size);
    if let Some(advisory) = turn.window.advisory() {
        renderer::print_advisory(&advisory);
    }

    let Some(result) = await_backend(
        &state.interrupts,
        PONDERING,
        engine.execute(&turn, &state.options),
    )
    .await
    else {
        return Ok(Flow::Exit);
    };

    match result {
        Ok(reply) => {
            renderer.print_reply(&reply);
            let commands = extract_commands(&reply);
            turn.commit(conversation, &reply);
            if !commands.is_empty() {
                bridge::offer_commands(state, conversation, &commands)?;
            }
        }
        Err(e) => renderer::print_backend_error(&e),
    }
    Ok(Flow::Continue)
}

/// Await a backend call behind a spinner. An interrupt while waiting
/// yields `None`, which callers treat as the exit path.
pub async fn await_backend<F: Future>(
    interrupts: &InterruptWatch,
    message: &str,
    call: F,
) -> Option<F::Output> {
    let spinner = renderer::thinking_spinner(message);
    let result = tokio::select! {
        output = call => Some(output),
        _ = interrupts.interrupted() => None,
    };
    spinner.finish_and_clear();
    if result.is_none() {
        println!("\n  {} Interrupted.", style("!").yellow().bold());
    }
    result
}

/// Record an answered image question without the image itself.
pub fn record_image_exchange(conversation: &mut Conversation, question: &str, answer: &str) {
    conversation.push_user(format!("{IMAGE_REQUEST_PREFIX}{question}"));
    conversation.push_assistant(answer);
}

async fn persist(state: &AppState, conversation: &Conversation) {
    match state.store.save(conversation).await {
        Ok(()) => {
            tracing::info!(messages = conversation.len(), "conversation saved");
            println!(
                "\n  {} Our conversation is kept for next time. Farewell.\n",
                style("✓").green().bold()
            );
        }
        Err(e) => println!("\n  {} {e}\n", style("!").red().bold()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sage_types::llm::MessageRole;

    #[test]
    fn test_passthrough_note() {
        assert_eq!(
            passthrough_note("uptime", Some(0)),
            "User ran shell command: uptime (exit status 0)"
        );
        assert!(passthrough_note("sleep 9", None).contains("terminated by signal"));
    }

    #[test]
    fn test_image_exchange_records_marker_and_answer() {
        let mut conv = Conversation::primed("p", "s", None);
        record_image_exchange(&mut conv, "what app is this?", "A text editor.");

        let messages = conv.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].role, MessageRole::User);
        assert_eq!(
            messages[2].content,
            "[Image analysis request] what app is this?"
        );
        assert_eq!(messages[3].content, "A text editor.");
    }

    #[tokio::test]
    async fn test_await_backend_returns_output() {
        let interrupts = InterruptWatch::new();
        let output = await_backend(&interrupts, PONDERING, async { 42 }).await;
        assert_eq!(output, Some(42));
    }

    #[tokio::test]
    async fn test_interrupt_abandons_pending_call() {
        let interrupts = InterruptWatch::new();
        let trigger = interrupts.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.trigger();
        });

        let output = await_backend(&interrupts, PONDERING, async {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            "late reply"
        })
        .await;

        assert_eq!(output, None);
    }

    #[tokio::test]
    async fn test_interrupt_during_passthrough_is_not_replayed() {
        let interrupts = InterruptWatch::new();
        // A Ctrl+C aimed at a foreground child earlier in the session.
        interrupts.trigger();

        let output = await_backend(&interrupts, PONDERING, async { "reply" }).await;
        assert_eq!(output, Some("reply"));
    }
}
