//! Plain-text rendering of a session snapshot for the terminal surfaces.

use crate::session::{Message, MessageKind, SessionSnapshot, Status};
use console::style;
use std::io::{self, Write};

const MB: f64 = 1024.0 * 1024.0;

pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if (bytes as f64) < MB {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / MB)
    }
}

/// Banner line for the active message.
pub fn banner(message: &Message) -> String {
    match message.kind {
        MessageKind::Warning => format!("{} {}", style("!").yellow().bold(), message.text),
        MessageKind::Error => format!("{} {}", style("✗").red().bold(), message.text),
    }
}

/// Writes the accepted set, the message banner, and result status.
pub fn render_session(snapshot: &SessionSnapshot, out: &mut dyn Write) -> io::Result<()> {
    if let Some(message) = &snapshot.message {
        writeln!(out, "{}", banner(message))?;
    }

    if snapshot.files.is_empty() {
        writeln!(out, "{}", style("No images selected.").dim())?;
    } else {
        for file in &snapshot.files {
            writeln!(
                out,
                "  [{}] {} {}",
                file.index,
                file.name,
                style(format!("({})", format_size(file.size))).dim()
            )?;
        }
    }

    writeln!(
        out,
        "{} of {} images, {} of {} MB",
        snapshot.files.len(),
        snapshot.limits.max_files,
        format_size(snapshot.total_bytes),
        snapshot.limits.max_total_size_mb
    )?;

    if snapshot.status == Status::Uploading {
        writeln!(out, "{}", style("Stitching...").cyan())?;
    }
    if snapshot.result_url.is_some() {
        writeln!(out, "{} Result ready. Use `save` to write it.", style("✓").green().bold())?;
    }

    Ok(())
}
