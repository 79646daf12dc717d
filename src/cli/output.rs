//! Colored output helpers for CLI
//!
//! Status lines go to stdout except errors, which go to stderr. Answers and
//! chunks are printed raw so they can be piped.

use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Info,
    Warn,
    Error,
}

impl Status {
    fn tag(self) -> &'static str {
        match self {
            Status::Ok => "[OK]",
            Status::Info => "[INFO]",
            Status::Warn => "[WARN]",
            Status::Error => "[ERROR]",
        }
    }
}

/// Output style configuration
pub struct Output {
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    fn render(&self, status: Status, message: &str) -> String {
        if !self.colored {
            return format!("  {} {}", status.tag(), message);
        }
        match status {
            Status::Ok => format!("  {} {}", "✓".green().bold(), message.green()),
            Status::Info => format!("  {} {}", "•".blue(), message),
            Status::Warn => format!("  {} {}", "⚠".yellow().bold(), message.yellow()),
            Status::Error => format!("  {} {}", "✗".red().bold(), message.red()),
        }
    }

    fn status(&self, status: Status, message: &str) {
        let line = self.render(status, message);
        if status == Status::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!("\n   {} {}\n", "Policy Analyzer".bright_cyan().bold(), version.dimmed());
        } else {
            println!("\n   Policy Analyzer {}\n", version);
        }
    }

    pub fn success(&self, message: &str) {
        self.status(Status::Ok, message);
    }

    pub fn info(&self, message: &str) {
        self.status(Status::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.status(Status::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.status(Status::Error, message);
    }

    /// Section title
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// One chunk with its position in the document
    pub fn chunk(&self, index: usize, chunk: &str) {
        if self.colored {
            println!("{} {}", format!("{:>4}", index).dimmed(), chunk);
        } else {
            println!("{:>4} {}", index, chunk);
        }
    }
}
