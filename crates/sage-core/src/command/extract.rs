//! Shell command extraction from assistant replies.

/// Fence tags treated as shell content (compared case-insensitively).
const SHELL_TAGS: &[&str] = &["bash", "sh", "shell", "zsh"];

fn is_shell_tag(tag: &str) -> bool {
    SHELL_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Extract candidate shell commands from fenced code blocks tagged as shell.
///
/// Each non-empty line inside a ```` ```bash ```` (or `sh`/`shell`/`zsh`)
/// block is one command, in source order, duplicates preserved. Lines that
/// merely repeat the tag are skipped. Untagged blocks and blocks in other
/// languages are ignored; an unterminated block runs to the end of the text.
pub fn extract_commands(text: &str) -> Vec<String> {
    let mut commands = Vec::new();
    let mut in_block = false;
    let mut is_shell = false;

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some(fence_rest) = trimmed.strip_prefix("```") {
            if in_block {
                in_block = false;
                is_shell = false;
            } else {
                in_block = true;
                let tag = fence_rest.trim().trim_start_matches('`');
                is_shell = is_shell_tag(tag.split_whitespace().next().unwrap_or(""));
            }
            continue;
        }

        if in_block && is_shell && !trimmed.is_empty() && !is_shell_tag(trimmed) {
            commands.push(trimmed.to_string());
        }
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_code_blocks() {
        assert!(extract_commands("no code blocks here").is_empty());
    }

    #[test]
    fn test_single_bash_block() {
        let commands = extract_commands("```bash\nls -la\necho hi\n```");
        assert_eq!(commands, vec!["ls -la", "echo hi"]);
    }

    #[test]
    fn test_ignores_other_languages_and_untagged() {
        let text = "```python\nprint('x')\n```\n```\nplain\n```\n```sh\nuname -a\n```";
        assert_eq!(extract_commands(text), vec!["uname -a"]);
    }

    #[test]
    fn test_multiple_blocks_in_order_with_duplicates() {
        let text = "First:\n```bash\nsudo apt update\n```\nThen:\n```Bash\nsudo apt update\n\ndf -h\n```";
        assert_eq!(
            extract_commands(text),
            vec!["sudo apt update", "sudo apt update", "df -h"]
        );
    }

    #[test]
    fn test_skips_tag_lines_and_blank_lines() {
        let text = "```bash\nbash\n\n   free -m   \n```";
        assert_eq!(extract_commands(text), vec!["free -m"]);
    }

    #[test]
    fn test_keeps_commands_that_start_with_bash() {
        let text = "```bash\nbash ./install.sh\n```";
        assert_eq!(extract_commands(text), vec!["bash ./install.sh"]);
    }

    #[test]
    fn test_unterminated_block() {
        assert_eq!(extract_commands("```shell\nwhoami"), vec!["whoami"]);
    }
}
