use crate::options::StreamSpecifier;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;

// Public API types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeResult {
    pub format: FormatInfo,
    pub streams: Vec<ProbeStream>,
}

impl ProbeResult {
    pub fn streams_of(&self, kind: StreamSpecifier) -> impl Iterator<Item = &ProbeStream> {
        self.streams.iter().filter(move |s| s.kind == Some(kind))
    }

    /// Get the main video stream (prefers default, falls back to first)
    pub fn main_video_stream(&self) -> Option<&ProbeStream> {
        self.streams_of(StreamSpecifier::Video)
            .find(|s| s.is_default)
            .or_else(|| self.streams_of(StreamSpecifier::Video).next())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormatInfo {
    pub format_name: Option<String>,
    pub duration: Option<f64>,
    pub size: u64,
    pub bitrate: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeStream {
    pub index: usize,
    /// `None` for data and attachment streams.
    pub kind: Option<StreamSpecifier>,
    pub codec_name: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub language: Option<String>,
    pub is_default: bool,
}

// Internal FFprobe JSON structures
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    streams: Option<Vec<FfprobeStream>>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
    disposition: Option<FfprobeDisposition>,
    tags: Option<FfprobeTags>,
}

#[derive(Debug, Deserialize)]
struct FfprobeDisposition {
    default: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
}

/// Execute ffprobe on a file and parse the JSON output
pub async fn probe_file(ffprobe: &Path, path: &Path) -> Result<ProbeResult> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let output = Command::new(ffprobe)
        .arg("-v")
        .arg("error")
        .arg("-print_format")
        .arg("json")
        .arg("-show_format")
        .arg("-show_streams")
        .arg("-i")
        .arg(path)
        .output()
        .await
        .context("Failed to execute ffprobe")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!(path = %path.display(), "ffprobe failed");
        anyhow::bail!("ffprobe failed: {}", stderr);
    }

    let stdout = String::from_utf8(output.stdout).context("ffprobe output is not valid UTF-8")?;
    parse_probe_json(&stdout)
}

/// Parse ffprobe's JSON document into a `ProbeResult`
pub fn parse_probe_json(json: &str) -> Result<ProbeResult> {
    let output: FfprobeOutput =
        serde_json::from_str(json).context("Failed to parse ffprobe JSON output")?;

    let format = match output.format {
        Some(fmt) => FormatInfo {
            format_name: fmt.format_name,
            duration: fmt.duration.and_then(|d| d.parse::<f64>().ok()),
            size: fmt.size.and_then(|s| s.parse::<u64>().ok()).unwrap_or(0),
            bitrate: fmt.bit_rate.and_then(|b| b.parse::<u64>().ok()),
        },
        None => FormatInfo {
            format_name: None,
            duration: None,
            size: 0,
            bitrate: None,
        },
    };

    let streams = output
        .streams
        .unwrap_or_default()
        .into_iter()
        .map(|stream| ProbeStream {
            index: stream.index,
            kind: stream.codec_type.as_deref().and_then(|t| match t {
                "video" => Some(StreamSpecifier::Video),
                "audio" => Some(StreamSpecifier::Audio),
                "subtitle" => Some(StreamSpecifier::Subtitle),
                _ => None,
            }),
            codec_name: stream.codec_name,
            width: stream.width,
            height: stream.height,
            language: stream.tags.and_then(|t| t.language),
            is_default: stream
                .disposition
                .and_then(|d| d.default)
                .map(|v| v == 1)
                .unwrap_or(false),
        })
        .collect();

    Ok(ProbeResult { format, streams })
}
