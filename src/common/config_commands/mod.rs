//! CLI handlers for the `config` subcommands.

use crate::common::config::{config_path, UploadConfig};
use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

fn defaults_toml() -> Result<String> {
    toml::to_string_pretty(&UploadConfig::default()).context("Failed to serialize default config")
}

/// Print resolved config file path.
pub fn run_config_path() -> Result<()> {
    let stdout = std::io::stdout();
    let mut output = stdout.lock();
    writeln!(output, "{}", config_path().display())?;
    Ok(())
}

/// Print config file contents, or guidance when no file exists.
pub fn run_config_show() -> Result<()> {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    show_config(&config_path(), &mut stdout.lock(), &mut stderr.lock())
}

/// Overwrite the config file with defaults. Returns whether it was written.
pub fn run_config_reset(yes: bool) -> Result<bool> {
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let stdout = std::io::stdout();
    reset_config(
        &config_path(),
        yes,
        interactive,
        &mut stdin.lock(),
        &mut stdout.lock(),
    )
}

fn show_config(path: &Path, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    if path.exists() {
        let mut file = fs::File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        std::io::copy(&mut file, stdout)?;
    } else {
        writeln!(stderr, "No config file at {}", path.display())?;
        writeln!(
            stderr,
            "Built-in defaults are in effect. Run `panodrop config reset --yes` to write them out."
        )?;
    }

    Ok(())
}

fn reset_config(
    path: &Path,
    yes: bool,
    interactive: bool,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> Result<bool> {
    if !yes {
        if !interactive {
            bail!("Refusing to reset config without a terminal. Pass --yes");
        }

        write!(output, "Overwrite {} with defaults? [y/N]: ", path.display())?;
        output.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            writeln!(output, "Left {} unchanged.", path.display())?;
            return Ok(false);
        }
    }

    atomic_write(path, &defaults_toml()?)?;
    writeln!(output, "Wrote defaults to {}", path.display())?;
    Ok(true)
}

/// Write through a sibling temp file, then rename over the target.
fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }

    let tmp_path = sibling_temp_path(path);
    fs::write(&tmp_path, contents)
        .with_context(|| format!("Failed to write temporary file {}", tmp_path.display()))?;
    fs::File::open(&tmp_path)
        .and_then(|file| file.sync_all())
        .with_context(|| format!("Failed to sync temporary file {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace config file {}", path.display()))?;
    Ok(())
}

fn sibling_temp_path(path: &Path) -> PathBuf {
    let base_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("config.toml");
    path.with_file_name(format!(".{base_name}.{}.tmp", Uuid::new_v4()))
}
