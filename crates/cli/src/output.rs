//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output. Colors are applied only when
//! the target stream supports them and `owo_colors::set_override` allows it.

use owo_colors::{OwoColorize, Stream};

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!(
            "{} {}",
            "✓".if_supports_color(Stream::Stdout, |t| t.green()),
            message
        );
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!(
            "{} {}",
            "✗".if_supports_color(Stream::Stderr, |t| t.red()),
            message
        );
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!(
            "{} {}",
            "⚠".if_supports_color(Stream::Stderr, |t| t.yellow()),
            message
        );
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!(
            "{} {}",
            "ℹ".if_supports_color(Stream::Stdout, |t| t.blue()),
            message
        );
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.if_supports_color(Stream::Stdout, |t| t.bold()));
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print an aligned `label: value` line
    pub fn field(label: &str, value: &str) {
        let label = format!("{}:", label);
        println!(
            "  {:<18} {}",
            label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
            value
        );
    }
}

/// Render an optional value, showing a dimmed placeholder when unset
pub fn display_optional(value: Option<&str>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => unset(),
    }
}

/// Render a secret without revealing it
pub fn display_secret(is_set: bool) -> String {
    if is_set {
        "********".to_string()
    } else {
        unset()
    }
}

fn unset() -> String {
    "(unset)"
        .if_supports_color(Stream::Stdout, |t| t.dimmed())
        .to_string()
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
