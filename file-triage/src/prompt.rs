use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// The person at the keyboard.
pub trait Operator {
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Default)]
pub struct ConsoleOperator;

impl Operator for ConsoleOperator {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt).context("Failed to write prompt")?;
        stdout.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            return Err(anyhow::anyhow!("stdin closed, stopping"));
        }
        Ok(line.trim().to_string())
    }
}
