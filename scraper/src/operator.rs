use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// A person at the console who can be asked things.
pub trait Operator {
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// Prompts on stdout, answers from stdin.
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
            return Err(anyhow::anyhow!("stdin closed while waiting for the operator"));
        }
        Ok(line.trim().to_string())
    }
}

/// What the operator said at a pause in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Continue,
    Abort,
}

impl Checkpoint {
    pub fn from_answer(answer: &str) -> Checkpoint {
        match answer.trim().to_lowercase().as_str() {
            "q" | "quit" => Checkpoint::Abort,
            _ => Checkpoint::Continue,
        }
    }
}

/// Hand the browser to the operator (to solve a CAPTCHA, dismiss a dialog)
/// and block until they say to carry on.
pub fn await_operator(operator: &mut dyn Operator, reason: &str) -> Result<Checkpoint> {
    println!("\n{}", "=".repeat(50));
    println!("{}", reason);
    let answer = operator.read_line("Press Enter to continue, or type q to stop: ")?;
    println!("{}\n", "=".repeat(50));
    Ok(Checkpoint::from_answer(&answer))
}
