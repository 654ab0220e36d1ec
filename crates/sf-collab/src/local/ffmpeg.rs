//! Minimal ffmpeg/ffprobe process wrapper shared by the local compositor
//! and probe implementations. Not a general-purpose media toolkit: it
//! only covers what the composition and thumbnail stages need.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{CollabError, CollabResult};

pub fn require_ffmpeg() -> CollabResult<()> {
    which::which("ffmpeg").map_err(|_| CollabError::new("ffmpeg not found in PATH"))?;
    Ok(())
}

pub fn require_ffprobe() -> CollabResult<()> {
    which::which("ffprobe").map_err(|_| CollabError::new("ffprobe not found in PATH"))?;
    Ok(())
}

/// Run ffmpeg with the given arguments, failing with stderr on a nonzero exit.
pub async fn run_ffmpeg(args: &[String]) -> CollabResult<()> {
    require_ffmpeg()?;
    debug!(args = ?args, "running ffmpeg");

    let output = Command::new("ffmpeg")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(CollabError::new(format!(
            "ffmpeg exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(())
}

/// Run ffprobe and return stdout as a string.
pub async fn run_ffprobe(args: &[String]) -> CollabResult<String> {
    require_ffprobe()?;

    let output = Command::new("ffprobe")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(CollabError::new(format!(
            "ffprobe exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
