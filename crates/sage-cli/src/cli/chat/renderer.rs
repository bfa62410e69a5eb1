//! Terminal rendering for assistant replies and session notices.
//!
//! `ChatRenderer` combines `termimad` for prose and `syntect` for fenced
//! code blocks. Replies are rendered once, after the backend answers.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

use sage_types::llm::BackendError;

const CODE_THEME: &str = "base16-ocean.dark";

pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(termimad::crossterm::style::Color::Cyan);
        skin.headers[0].set_fg(termimad::crossterm::style::Color::Cyan);
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Render a markdown reply with syntax-highlighted code blocks.
    pub fn render_final(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_buf = String::new();

        for line in markdown.lines() {
            let fence = line.trim_start().starts_with("```");
            if fence && !in_code_block {
                in_code_block = true;
                code_lang = line.trim().trim_start_matches('`').trim().to_string();
                code_buf.clear();
            } else if fence {
                in_code_block = false;
                output.push_str(&self.highlight_code(&code_buf, &code_lang));
                output.push('\n');
            } else if in_code_block {
                code_buf.push_str(line);
                code_buf.push('\n');
            } else {
                output.push_str(&self.skin.term_text(line).to_string());
            }
        }

        // Unclosed fence
        if in_code_block && !code_buf.is_empty() {
            output.push_str(&self.highlight_code(&code_buf, &code_lang));
        }

        output
    }

    /// Print an assistant reply under the speaker label.
    pub fn print_reply(&self, reply: &str) {
        println!();
        println!("  {}", style("Sage:").cyan().bold());
        println!("{}", self.render_final(reply));
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = if lang.is_empty() {
            self.syntax_set.find_syntax_plain_text()
        } else {
            self.syntax_set
                .find_syntax_by_token(lang)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        };

        let mut output = String::new();
        output.push_str(&format!("  {}\n", style(format!("--- {lang} ---")).dim()));

        let Some(theme) = self.theme_set.themes.get(CODE_THEME) else {
            for line in code.lines() {
                output.push_str(&format!("  {line}\n"));
            }
            return output;
        };

        let mut h = HighlightLines::new(syntax, theme);
        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("  {escaped}\x1b[0m\n"));
        }

        output
    }
}

/// Spinner shown while waiting on the backend.
pub fn thinking_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Print the digest of the previous session in a framed block.
pub fn print_summary(summary: &str) {
    let rule = "─".repeat(60);
    println!();
    println!(
        "  {}",
        style(format!("╭─ Previous conversation summary {}", "─".repeat(27))).cyan()
    );
    for line in summary.lines() {
        println!("  {} {}", style("│").cyan(), line);
    }
    println!("  {}", style(format!("╰{rule}")).cyan());
    println!();
}

/// Print the notice that older turns were left out of this request.
pub fn print_advisory(advisory: &str) {
    println!("  {} {}", style("!").yellow().bold(), style(advisory).yellow());
}

/// Print a backend failure inline; the turn has been abandoned.
pub fn print_backend_error(error: &BackendError) {
    println!();
    println!("  {} {error}", style("!").red().bold());
    if error.is_connection_refused() {
        println!(
            "  {}",
            style("Is the local model server running? Start it with 'ollama serve'.").dim()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_gets_language_header() {
        let renderer = ChatRenderer::new();
        let out = renderer.render_final("Try this:\n```bash\nuptime\n```\nDone.");
        assert!(out.contains("--- bash ---"));
        assert!(out.contains("uptime"));
        assert!(out.contains("Done."));
    }

    #[test]
    fn test_unclosed_fence_still_rendered() {
        let renderer = ChatRenderer::new();
        let out = renderer.render_final("```\nfree -h");
        assert!(out.contains("free -h"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let renderer = ChatRenderer::new();
        let out = renderer.render_final("```nosuchlang\nhello\n```");
        assert!(out.contains("--- nosuchlang ---"));
        assert!(out.contains("hello"));
    }
}
