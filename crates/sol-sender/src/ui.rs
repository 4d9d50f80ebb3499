//! Operator-facing console output.
//!
//! Progress goes to stdout; diagnostics go through `tracing` on stderr.

use owo_colors::OwoColorize;

pub fn banner(text: &str) {
    println!("\n{}\n", text.cyan().bold());
}

pub fn step(text: &str) {
    println!("{}", text.blue());
}

/// Indented `• label: value` bullet.
pub fn detail(label: &str, value: impl std::fmt::Display) {
    println!("{}", format!("   • {label}: {value}").dimmed());
}

pub fn success(text: &str) {
    println!("{}", text.green().bold());
}

pub fn warn(text: &str) {
    println!("{}", text.yellow());
}

/// Red error line on stderr.
pub fn error(text: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), text.red());
}
