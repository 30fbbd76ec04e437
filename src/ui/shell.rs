//! Interactive terminal session.
//!
//! Dragging files onto most terminals pastes their quoted paths, so any line
//! that is not a command is taken as a drop.

use super::render::render_session;
use crate::common::UploadConfig;
use crate::intake::{parse_drop_payload, Selection};
use crate::output::{finish_spinner_error, finish_spinner_success, spinner};
use crate::session::{SubmitOutcome, UploadSession};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const HELP: &str = "\
Commands:
  add <paths...>   pick files
  rm <index>       remove a file
  ls               list the batch
  submit           send the batch for stitching
  save [path]      write the stitched result
  help             show this help
  quit             leave
Anything else is treated as dropped files.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Vec<PathBuf>),
    Drop(String),
    Remove(usize),
    List,
    Submit,
    Save(Option<PathBuf>),
    Help,
    Quit,
}

/// Parses one input line. `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "add" => Command::Add(parse_drop_payload(rest)),
        "rm" | "remove" => {
            let index = rest
                .parse::<usize>()
                .map_err(|_| "usage: rm <index>".to_string())?;
            Command::Remove(index)
        }
        "ls" | "list" => Command::List,
        "submit" | "stitch" => Command::Submit,
        "save" => Command::Save(parse_drop_payload(rest).into_iter().next()),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Drop(line.to_string()),
    };
    Ok(Some(command))
}

/// Reads commands from `input` until `quit` or end of input.
pub async fn run_shell<R>(
    session: &UploadSession,
    config: &UploadConfig,
    input: R,
    out: &mut dyn Write,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    writeln!(out, "{HELP}")?;
    render_session(&session.snapshot(), out)?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                writeln!(out, "{usage}")?;
                continue;
            }
        };

        match command {
            Command::Add(paths) => intake(session, Selection::Picked(paths), out).await?,
            Command::Drop(payload) => intake(session, Selection::Dropped(payload), out).await?,
            Command::Remove(index) => {
                if session.remove_file(index).is_none() {
                    writeln!(out, "No image at index {index}.")?;
                }
                render_session(&session.snapshot(), out)?;
            }
            Command::List => render_session(&session.snapshot(), out)?,
            Command::Submit => {
                submit(session).await;
                render_session(&session.snapshot(), out)?;
            }
            Command::Save(path) => {
                let path = path.unwrap_or_else(|| PathBuf::from(&config.download_name));
                match save_result(session, &path).await {
                    Ok(true) => writeln!(out, "Saved {}", path.display())?,
                    Ok(false) => writeln!(out, "No stitched result yet.")?,
                    Err(err) => writeln!(out, "{err:#}")?,
                }
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => break,
        }
    }

    Ok(())
}

async fn intake(session: &UploadSession, selection: Selection, out: &mut dyn Write) -> Result<()> {
    match selection.collect().await {
        Ok(files) => {
            session.add_files(files);
        }
        // Unreadable entries abort the event before validation
        Err(err) => writeln!(out, "{err}")?,
    }
    render_session(&session.snapshot(), out)?;
    Ok(())
}

/// Submit with a spinner. Returns how the attempt ended.
pub async fn submit(session: &UploadSession) -> SubmitOutcome {
    let pb = spinner("Stitching...");
    let outcome = session.submit().await;
    match &outcome {
        SubmitOutcome::Stitched => finish_spinner_success(&pb, "Panorama ready"),
        SubmitOutcome::Failed(err) => finish_spinner_error(&pb, &format!("Error: {err}")),
        SubmitOutcome::Skipped => finish_spinner_error(&pb, "Nothing to submit"),
    }
    outcome
}

/// Writes the current result to `path`. `Ok(false)` when there is none.
pub async fn save_result(session: &UploadSession, path: &Path) -> Result<bool> {
    let Some(blob) = session.result() else {
        return Ok(false);
    };
    tokio::fs::write(path, &blob.bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}
