//! qlink demo suite
//!
//! Terminal demonstrations of the qlink helpers:
//!
//! - **Entanglement swapping**: teleport a qubit across two noisy links and
//!   report fidelity against hop distance for each noise model

pub mod swap;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar for demo operations.
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(template) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    ) {
        pb.set_style(template.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Fidelity as a bar of `width` cells, colored by quality.
pub fn fidelity_bar(fidelity: f64, width: usize) -> String {
    let filled = ((fidelity.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(width - filled));
    if fidelity >= 0.9 {
        style(bar).green().to_string()
    } else if fidelity >= 2.0 / 3.0 {
        style(bar).yellow().to_string()
    } else {
        style(bar).red().to_string()
    }
}
