// Collaborators around the builder: binary lookup, codec catalog, probing
// and running an assembled command.

pub mod catalog;
pub mod probe;

use crate::config::BuilderConfig;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Resolve `name` to an executable: the configured path when given, else a
/// `PATH` lookup.
pub fn locate_binary(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(anyhow!(
            "Configured {} path does not exist: {}",
            name,
            path.display()
        ));
    }

    which::which(name).with_context(|| format!("{} can not be found in PATH", name))
}

pub fn locate_ffmpeg(config: &BuilderConfig) -> Result<PathBuf> {
    locate_binary("ffmpeg", config.ffmpeg_path.as_deref())
}

pub fn locate_ffprobe(config: &BuilderConfig) -> Result<PathBuf> {
    locate_binary("ffprobe", config.ffprobe_path.as_deref())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub exit_code: Option<i32>,
    pub stderr: Vec<String>,
}

/// Spawn a token list produced by `Command::generate(OutputFormat::TokenList)`.
///
/// The first token is the binary. stderr is collected line by line; a
/// non-zero exit status is an error carrying the collected lines.
pub async fn run_command(tokens: &[String]) -> Result<RunOutput> {
    let (binary, args) = tokens
        .split_first()
        .ok_or_else(|| anyhow!("Command has no tokens"))?;

    let mut cmd = Command::new(binary);
    cmd.args(args);
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::piped());

    tracing::info!(binary = %binary, args = args.len(), "running command");

    let mut child = cmd
        .spawn()
        .map_err(|e| anyhow!("Failed to spawn {}: {}", binary, e))?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("Failed to capture stderr"))?;

    let mut lines = BufReader::new(stderr).lines();
    let mut collected = Vec::new();
    while let Some(line) = lines.next_line().await? {
        tracing::trace!("{}", line);
        collected.push(line);
    }

    let status = child
        .wait()
        .await
        .map_err(|e| anyhow!("Failed to wait for {}: {}", binary, e))?;

    if !status.success() {
        return Err(anyhow!(
            "{} failed with exit code: {:?}\nStderr:\n{}",
            binary,
            status.code(),
            collected.join("\n")
        ));
    }

    Ok(RunOutput {
        exit_code: status.code(),
        stderr: collected,
    })
}
