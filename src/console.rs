//! Log sink the extractor reports through.
//!
//! Mirrors the subset of the DevTools console the routine needs: a clear,
//! a styled title/value pair, and an error line.

use colored::Colorize;
use std::io::{IsTerminal, Write};

pub trait ConsoleSink {
    fn clear(&mut self);
    /// Bold heading line.
    fn title(&mut self, text: &str);
    /// Monospace value line.
    fn value(&mut self, text: &str);
    /// Error-level line.
    fn error(&mut self, text: &str);
}

/// Terminal rendition: stdout for title/value, stderr for errors.
pub struct TerminalConsole {
    clear_screen: bool,
}

impl TerminalConsole {
    /// Only clear when stdout is an interactive terminal, never a pipe.
    pub fn new() -> Self {
        Self {
            clear_screen: std::io::stdout().is_terminal(),
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSink for TerminalConsole {
    fn clear(&mut self) {
        if self.clear_screen {
            print!("\x1B[2J\x1B[1;1H");
            std::io::stdout().flush().ok();
        }
    }

    fn title(&mut self, text: &str) {
        println!("{}", text.bold());
    }

    fn value(&mut self, text: &str) {
        // Terminals are already monospace; dim background marks it as a code span.
        println!("{}", text.on_bright_black());
    }

    fn error(&mut self, text: &str) {
        eprintln!("{}", text.red().bold());
    }
}

/// Captures every sink call in order.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingConsole {
    pub lines: Vec<ConsoleLine>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleLine {
    Clear,
    Title(String),
    Value(String),
    Error(String),
}

#[cfg(test)]
impl ConsoleSink for RecordingConsole {
    fn clear(&mut self) {
        self.lines.push(ConsoleLine::Clear);
    }

    fn title(&mut self, text: &str) {
        self.lines.push(ConsoleLine::Title(text.to_string()));
    }

    fn value(&mut self, text: &str) {
        self.lines.push(ConsoleLine::Value(text.to_string()));
    }

    fn error(&mut self, text: &str) {
        self.lines.push(ConsoleLine::Error(text.to_string()));
    }
}
