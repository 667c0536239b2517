use std::io::{BufRead, Write};

use anyhow::Context;

/// Line oriented text channel the session talks to the user through
pub trait Console {
    /// Shows the question and blocks for one line of input.
    /// Returns `None` once the input has been closed.
    fn ask(&mut self, question: &str) -> anyhow::Result<Option<String>>;

    /// Writes a full line of output
    fn say(&mut self, msg: &str) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub struct LineConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Console for LineConsole<R, W> {
    fn ask(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{question}").context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush prompt")?;

        let mut buf = Vec::new();
        let bytes_read = self
            .input
            .read_until(b'\n', &mut buf)
            .context("Failed to read line from input")?;
        if bytes_read == 0 {
            return Ok(None);
        }

        // Only the line terminator is removed, the rest is the caller's business
        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }
        let line = String::from_utf8_lossy(&buf).into_owned();
        Ok(Some(line))
    }

    fn say(&mut self, msg: &str) -> anyhow::Result<()> {
        writeln!(self.output, "{msg}").context("Failed to write output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_whitespace_except_terminator() {
        // Arrange
        let mut console = LineConsole::new(" x \r\nlast".as_bytes(), Vec::new());

        // Act
        let first = console.ask("? ").unwrap();
        let second = console.ask("? ").unwrap();
        let third = console.ask("? ").unwrap();

        // Assert
        assert_eq!(first.as_deref(), Some(" x "));
        assert_eq!(second.as_deref(), Some("last"));
        assert_eq!(third, None);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let input: &[u8] = b"caf\xe9\nmilk\n";
        let mut console = LineConsole::new(input, Vec::new());

        let first = console.ask("? ").unwrap();
        let second = console.ask("? ").unwrap();

        assert_eq!(first.as_deref(), Some("caf\u{FFFD}"));
        assert_eq!(second.as_deref(), Some("milk"));
    }

    #[test]
    fn prompts_and_messages_are_written() {
        let mut console = LineConsole::new("answer\n".as_bytes(), Vec::new());

        console.say("hello").unwrap();
        console.ask("question: ").unwrap();

        let output = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(output, "hello\nquestion: ");
    }
}
