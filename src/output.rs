use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Indeterminate spinner shown while a request is in flight.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn finish_spinner_success(spinner: &ProgressBar, msg: &str) {
    spinner.finish_with_message(format!("{} {}", style("✓").green().bold(), msg));
}

pub fn finish_spinner_error(spinner: &ProgressBar, msg: &str) {
    spinner.finish_with_message(format!("{} {}", style("✗").red().bold(), msg));
}

pub fn announce_url(url: &str) {
    println!(
        "{} Drop images at {}",
        style("●").cyan().bold(),
        style(url).underlined()
    );
    println!("{}", style("Press Ctrl+C to stop.").dim());
}
