//! Status indicators and message formatting.

use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
}

impl Status {
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Success => "✓",
            Status::Error => "✗",
            Status::Warning => "⚠",
            Status::Info => "→",
        }
    }

    pub fn colored_symbol(&self) -> String {
        match self {
            Status::Success => self.symbol().green().to_string(),
            Status::Error => self.symbol().red().to_string(),
            Status::Warning => self.symbol().yellow().to_string(),
            Status::Info => self.symbol().cyan().to_string(),
        }
    }

    /// Formats a status message with symbol and color.
    pub fn format(&self, message: &str) -> String {
        format!("{} {}", self.colored_symbol(), self.colorize_text(message))
    }

    fn colorize_text(&self, text: &str) -> String {
        match self {
            Status::Success => text.green().bold().to_string(),
            Status::Error => text.red().bold().to_string(),
            Status::Warning => text.yellow().bold().to_string(),
            Status::Info => text.cyan().to_string(),
        }
    }
}

pub fn print_success(message: &str) {
    println!("  {}", Status::Success.format(message));
}

pub fn print_warning(message: &str) {
    println!("  {}", Status::Warning.format(message));
}
