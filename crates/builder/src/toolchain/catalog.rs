// Codec and bitstream filter catalogs parsed from `ffmpeg -codecs` / `-bsfs`

use crate::options::{ChoiceSet, StreamSpecifier};
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecEntry {
    pub name: String,
    pub decoding: bool,
    pub encoding: bool,
    /// `None` for data and attachment codecs.
    pub stream: Option<StreamSpecifier>,
    pub intra_only: bool,
    pub lossy: bool,
    pub lossless: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodecCatalog {
    entries: Vec<CodecEntry>,
}

fn codec_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([D.])([E.])([VASDT.])([I.])([L.])([S.])\s+([A-Za-z0-9_,\-]+)\s+(.+?)\s*$")
            .expect("codec line pattern is valid")
    })
}

impl CodecCatalog {
    /// Parse the listing printed by `ffmpeg -codecs`. Legend lines and
    /// anything before the `-------` separator are ignored.
    pub fn parse_listing(listing: &str) -> Self {
        let body = match listing.split_once("-------") {
            Some((_, body)) => body,
            None => listing,
        };

        let mut entries = Vec::new();
        for line in body.lines() {
            let Some(caps) = codec_line().captures(line) else {
                continue;
            };
            let stream = match &caps[3] {
                "V" => Some(StreamSpecifier::Video),
                "A" => Some(StreamSpecifier::Audio),
                "S" => Some(StreamSpecifier::Subtitle),
                _ => None,
            };
            for name in caps[7].split(',').filter(|n| !n.is_empty()) {
                entries.push(CodecEntry {
                    name: name.to_string(),
                    decoding: &caps[1] == "D",
                    encoding: &caps[2] == "E",
                    stream,
                    intra_only: &caps[4] == "I",
                    lossy: &caps[5] == "L",
                    lossless: &caps[6] == "S",
                    description: caps[8].to_string(),
                });
            }
        }

        Self { entries }
    }

    /// Run `<binary> -codecs` and parse its output.
    pub fn query(binary: &Path) -> Result<Self> {
        let catalog = Self::parse_listing(&run_listing(binary, "-codecs")?);
        tracing::debug!(codecs = catalog.len(), "loaded codec catalog");

        if catalog.is_empty() {
            return Err(anyhow!("No codecs found in {} -codecs output", binary.display()));
        }
        Ok(catalog)
    }

    pub fn entries(&self) -> &[CodecEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CodecEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Every codec name, for use as a choice constraint.
    pub fn choices(&self) -> ChoiceSet {
        ChoiceSet::new(self.entries.iter().map(|entry| entry.name.clone()))
    }

    pub fn choices_for(&self, stream: StreamSpecifier) -> ChoiceSet {
        ChoiceSet::new(
            self.entries
                .iter()
                .filter(|entry| entry.stream == Some(stream))
                .map(|entry| entry.name.clone()),
        )
    }
}

fn run_listing(binary: &Path, flag: &str) -> Result<String> {
    let output = Command::new(binary)
        .arg("-hide_banner")
        .arg(flag)
        .arg("-v")
        .arg("error")
        .output()
        .with_context(|| format!("Failed to execute {} {}", binary.display(), flag))?;

    if !output.status.success() {
        return Err(anyhow!("{} {} command failed", binary.display(), flag));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Bitstream filters compiled into the installed ffmpeg.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitstreamFilterCatalog {
    names: Vec<String>,
}

impl BitstreamFilterCatalog {
    /// Parse the listing printed by `ffmpeg -bsfs`: a `Bitstream filters:`
    /// header followed by one name per line.
    pub fn parse_listing(listing: &str) -> Self {
        let names = listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.ends_with(':'))
            .filter(|line| line.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// Run `<binary> -bsfs` and parse its output.
    pub fn query(binary: &Path) -> Result<Self> {
        let catalog = Self::parse_listing(&run_listing(binary, "-bsfs")?);
        tracing::debug!(filters = catalog.len(), "loaded bitstream filter catalog");

        if catalog.is_empty() {
            return Err(anyhow!("No bitstream filters found in {} -bsfs output", binary.display()));
        }
        Ok(catalog)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn choices(&self) -> ChoiceSet {
        ChoiceSet::new(self.names.iter().cloned())
    }
}
