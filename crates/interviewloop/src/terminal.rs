//! Reading candidate turns from the terminal.

use anyhow::{bail, Context, Result};
use std::io::BufRead;
use std::path::PathBuf;
use tokio::sync::Notify;

const FENCE: &str = "```";

/// What the candidate asked for in one turn
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A conversational reply or inline code
    Say(String),
    /// Submit the code in a file for evaluation
    Submit(PathBuf),
    /// Share a resume from a file
    Resume(PathBuf),
    /// Run the final evaluation now
    Evaluate,
    Quit,
}

impl Command {
    /// Parse a turn. Only a leading `/` on the first line is treated as a command.
    pub fn parse(turn: &str) -> Result<Self> {
        let trimmed = turn.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Ok(Command::Say(trimmed.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "submit" | "resume" if arg.is_empty() => bail!("/{} needs a file path", name),
            "submit" => Ok(Command::Submit(PathBuf::from(arg))),
            "resume" => Ok(Command::Resume(PathBuf::from(arg))),
            "evaluate" => Ok(Command::Evaluate),
            "quit" | "exit" => Ok(Command::Quit),
            _ => bail!(
                "Unknown command /{}. Try /submit <file>, /resume <file>, /evaluate or /quit",
                name
            ),
        }
    }
}

/// Read one turn: lines up to the first blank line outside a ``` fence.
///
/// Returns `None` at end of input with nothing read. Leading blank lines are skipped.
pub fn read_turn<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut lines: Vec<String> = Vec::new();
    let mut in_fence = false;
    let mut buf = String::new();

    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\n', '\r']);

        if line.trim_start().starts_with(FENCE) {
            in_fence = !in_fence;
        }
        if line.trim().is_empty() && !in_fence {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        lines.push(line.to_string());
    }

    if lines.is_empty() {
        return Ok(None);
    }
    Ok(Some(lines.join("\n")))
}

/// What waiting for the next turn produced
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Turn(String),
    EndOfInput,
    Interrupted,
}

/// Run the blocking `read` off the runtime and race it against `interrupt`.
///
/// An interrupted read is abandoned; its thread finishes on its own.
pub async fn next_turn<F>(read: F, interrupt: &Notify) -> Result<Input>
where
    F: FnOnce() -> Result<Option<String>> + Send + 'static,
{
    let reader = tokio::task::spawn_blocking(read);
    tokio::select! {
        joined = reader => {
            let turn = joined.context("Terminal reader task failed")??;
            Ok(turn.map_or(Input::EndOfInput, Input::Turn))
        }
        _ = interrupt.notified() => Ok(Input::Interrupted),
    }
}

/// Read a turn from the process stdin
pub fn read_stdin_turn() -> Result<Option<String>> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    read_turn(&mut input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use interviewloop_core::heuristics::looks_like_code;
    use std::io::Cursor;
    use std::time::Duration;

    #[test]
    fn test_turn_ends_at_blank_line() {
        let mut input = Cursor::new("\nI mostly write Rust.\nSome Go too.\n\nNext turn\n");
        assert_eq!(
            read_turn(&mut input).unwrap().as_deref(),
            Some("I mostly write Rust.\nSome Go too.")
        );
        assert_eq!(read_turn(&mut input).unwrap().as_deref(), Some("Next turn"));
        assert_eq!(read_turn(&mut input).unwrap(), None);
    }

    #[test]
    fn test_blank_lines_inside_fence_are_kept() {
        let mut input = Cursor::new("```python\ndef f():\n\n    return 1\n```\n\n");
        assert_eq!(
            read_turn(&mut input).unwrap().as_deref(),
            Some("```python\ndef f():\n\n    return 1\n```")
        );
    }

    #[test]
    fn test_fenced_turn_keeps_code_signal() {
        let mut input = Cursor::new("```rust\nfn add(a: i32, b: i32) -> i32 { a + b }\n```\n\n");
        let turn = read_turn(&mut input).unwrap().unwrap();

        let Command::Say(text) = Command::parse(&turn).unwrap() else {
            panic!("fenced code should be a plain turn");
        };
        assert!(text.starts_with("```rust"));
        assert!(looks_like_code(&text));
    }

    #[test]
    fn test_eof_ends_turn() {
        let mut input = Cursor::new("no trailing newline");
        assert_eq!(
            read_turn(&mut input).unwrap().as_deref(),
            Some("no trailing newline")
        );
        assert_eq!(read_turn(&mut input).unwrap(), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("/submit solution.rs").unwrap(),
            Command::Submit(PathBuf::from("solution.rs"))
        );
        assert_eq!(
            Command::parse("/resume  cv.txt ").unwrap(),
            Command::Resume(PathBuf::from("cv.txt"))
        );
        assert_eq!(Command::parse("/evaluate").unwrap(), Command::Evaluate);
        assert_eq!(Command::parse("/exit").unwrap(), Command::Quit);
        assert_eq!(
            Command::parse("  hello there ").unwrap(),
            Command::Say("hello there".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_bad_commands() {
        assert!(Command::parse("/submit").is_err());
        assert!(Command::parse("/hint").is_err());
    }

    #[tokio::test]
    async fn test_next_turn_returns_read_turn() {
        let interrupt = Notify::new();
        let input = next_turn(|| Ok(Some("hello".to_string())), &interrupt)
            .await
            .unwrap();
        assert_eq!(input, Input::Turn("hello".to_string()));

        let input = next_turn(|| Ok(None), &interrupt).await.unwrap();
        assert_eq!(input, Input::EndOfInput);
    }

    #[tokio::test]
    async fn test_interrupt_ends_a_blocked_read() {
        let interrupt = Notify::new();
        interrupt.notify_one();

        let input = next_turn(
            || {
                std::thread::sleep(Duration::from_millis(300));
                Ok(Some("too late".to_string()))
            },
            &interrupt,
        )
        .await
        .unwrap();

        assert_eq!(input, Input::Interrupted);
    }
}
