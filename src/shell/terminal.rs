use std::io::{self, BufRead, Write};

use log::warn;

use crate::view::Prompter;

/// Dialogs on stdin/stdout. Both block until the user answers.
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_answer(prompt: &str) -> Option<String> {
        print!("{}", prompt);
        if let Err(e) = io::stdout().flush() {
            warn!("Failed to flush stdout: {}", e);
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(e) => {
                warn!("Failed to read from stdin: {}", e);
                None
            }
        }
    }
}

/// Accepts `y` or `yes` in any case; anything else declines.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str) -> bool {
        Self::read_answer(&format!("{} [y/N] ", message))
            .map(|answer| is_yes(&answer))
            .unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        println!("!! {}", message);
        Self::read_answer("(press Enter) ");
    }

    fn show_status(&self, status: &str) {
        println!("{}", status);
    }
}
