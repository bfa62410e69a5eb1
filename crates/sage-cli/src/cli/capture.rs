//! The `capture` command: ask the model about a region of the screen.
//!
//! The image travels only on the single request; the conversation keeps a
//! marker with the question plus the answer.

use anyhow::Result;
use console::style;
use dialoguer::Input;

use sage_core::system::ScreenCapture;
use sage_infra::capture::load_attachment;
use sage_types::conversation::Conversation;

use super::chat::bridge;
use super::chat::loop_runner::{Flow, PONDERING, await_backend, record_image_exchange};
use super::chat::renderer::{self, ChatRenderer};
use crate::state::AppState;

const DEFAULT_QUESTION: &str = "What is shown in this image?";

pub async fn capture_and_ask(
    state: &AppState,
    conversation: &mut Conversation,
    renderer: &ChatRenderer,
) -> Result<Flow> {
    println!(
        "\n  {} Select a region of the screen to capture.",
        style("i").blue().bold()
    );
    let path = match state.capture.capture().await {
        Ok(path) => path,
        Err(e) => {
            println!("  {} {e}\n", style("!").yellow().bold());
            return Ok(Flow::Continue);
        }
    };

    let question: String = Input::new()
        .with_prompt("  What would you like to know about this image?")
        .default(DEFAULT_QUESTION.to_string())
        .interact_text()?;

    let image = match load_attachment(&path).await {
        Ok(image) => image,
        Err(e) => {
            println!(
                "  {} could not read {}: {e}\n",
                style("!").red().bold(),
                path.display()
            );
            return Ok(Flow::Continue);
        }
    };

    let engine = match state.engine() {
        Ok(engine) => engine,
        Err(e) => {
            renderer::print_backend_error(&e);
            return Ok(Flow::Continue);
        }
    };

    let Some(result) = await_backend(
        &state.interrupts,
        PONDERING,
        engine.ask_about_image(&question, image, &state.options),
    )
    .await
    else {
        return Ok(Flow::Exit);
    };

    match result {
        Ok(answer) => {
            renderer.print_reply(&answer);
            record_image_exchange(conversation, &question, &answer);
            let commands = sage_core::command::extract_commands(&answer);
            if !commands.is_empty() {
                bridge::offer_commands(state, conversation, &commands)?;
            }
        }
        Err(e) => renderer::print_backend_error(&e),
    }
    Ok(Flow::Continue)
}
