//! Welcome banner display for chat sessions.

use std::path::Path;

use console::style;

/// Print the banner shown once at startup.
pub fn print_welcome_banner(model: &str, provider: &str, data_dir: &Path) {
    println!();
    println!("  {}", style("Sage").cyan().bold());
    println!("  {}", style("A wise advisor for your system").dim());
    println!();
    println!("  {}     {}", style("Model:").bold(), style(model).dim());
    println!("  {}  {}", style("Provider:").bold(), style(provider).dim());
    println!("  {}      {}", style("Data:").bold(), style(data_dir.display()).dim());
    println!();
    println!("  {}", style("Type help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
