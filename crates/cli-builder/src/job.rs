use anyhow::{Context, Result};
use ffcmd_builder::config::BuilderConfig;
use ffcmd_builder::filter::{BitstreamFilter, ScaleFilter};
use ffcmd_builder::options::ChoiceSet;
use ffcmd_builder::{BuildError, CodecDirective, Command, FilterDirective, RawGlobalOptions};
use serde::Deserialize;
use std::path::Path;

/// One invocation described in TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobFile {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub options: RawGlobalOptions,
    #[serde(default)]
    pub codecs: Vec<CodecDirective>,
    #[serde(default)]
    pub filters: Vec<JobFilter>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobFilter {
    Bitstream(BitstreamFilter),
    Scale(ScaleFilter),
    /// Scale to a configured video size such as `hd720`.
    ScalePreset { video_size: String },
}

impl JobFilter {
    fn resolve(&self, config: &BuilderConfig) -> Result<FilterDirective> {
        Ok(match self {
            JobFilter::Bitstream(filter) => filter.clone().into(),
            JobFilter::Scale(filter) => filter.clone().into(),
            JobFilter::ScalePreset { video_size } => ScaleFilter::from_video_size(video_size, config)
                .map_err(|v| BuildError::Invalid {
                    subject: "scale preset".to_string(),
                    report: v.into(),
                })?
                .into(),
        })
    }
}

pub fn load_job(path: &Path) -> Result<JobFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {}", path.display()))?;
    toml::from_str(&contents).map_err(|e| anyhow::anyhow!("Failed to parse TOML job: {}", e))
}

/// Catalogs of the installed ffmpeg to check names against.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub codecs: Option<ChoiceSet>,
    pub bitstream_filters: Option<ChoiceSet>,
}

/// Turn a job description into a validated command. Every attach is checked
/// as it happens; the first rejected directive aborts the build.
pub fn build_command(
    job: &JobFile,
    binary: &str,
    config: &BuilderConfig,
    catalogs: Catalogs,
) -> Result<Command> {
    let options = job.options.parse(config)?;
    let mut command = Command::new(binary, job.input.clone(), job.output.clone()).with_options(options);
    if let Some(catalog) = catalogs.codecs {
        command = command.with_catalog(catalog);
    }
    if let Some(catalog) = catalogs.bitstream_filters {
        command = command.with_filter_catalog(catalog);
    }

    for (i, codec) in job.codecs.iter().enumerate() {
        command
            .add_codec(codec.clone())
            .with_context(|| format!("codecs[{}] rejected", i))?;
    }
    for (i, filter) in job.filters.iter().enumerate() {
        command
            .add_filter(filter.resolve(config)?)
            .with_context(|| format!("filters[{}] rejected", i))?;
    }

    Ok(command)
}
