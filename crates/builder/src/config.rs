use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Lookup tables and tool paths handed to the builder at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub aspect_ratios: Vec<AspectRatioPreset>,
    pub video_sizes: Vec<VideoSizePreset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectRatioPreset {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSizePreset {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

// https://ffmpeg.org/ffmpeg-utils.html#Video-size
const DEFAULT_VIDEO_SIZES: &[(&str, u32, u32)] = &[
    ("ntsc", 720, 480),
    ("pal", 720, 576),
    ("qntsc", 352, 240),
    ("qpal", 352, 288),
    ("sntsc", 640, 480),
    ("spal", 768, 576),
    ("film", 352, 240),
    ("ntsc-film", 352, 240),
    ("sqcif", 128, 96),
    ("qcif", 176, 144),
    ("cif", 352, 288),
    ("4cif", 704, 576),
    ("16cif", 1408, 1152),
    ("qqvga", 160, 120),
    ("qvga", 320, 240),
    ("vga", 640, 480),
    ("svga", 800, 600),
    ("xga", 1024, 768),
    ("uxga", 1600, 1200),
    ("qxga", 2048, 1536),
    ("sxga", 1280, 1024),
    ("qsxga", 2560, 2048),
    ("hsxga", 5120, 4096),
    ("wvga", 852, 480),
    ("wxga", 1366, 768),
    ("wsxga", 1600, 1024),
    ("wuxga", 1920, 1200),
    ("woxga", 2560, 1600),
    ("wqsxga", 3200, 2048),
    ("wquxga", 3840, 2400),
    ("whsxga", 6400, 4096),
    ("whuxga", 7680, 4800),
    ("cga", 320, 200),
    ("ega", 640, 350),
    ("hd480", 852, 480),
    ("hd720", 1280, 720),
    ("hd1080", 1920, 1080),
    ("2k", 2048, 1080),
    ("2kflat", 1998, 1080),
    ("2kscope", 2048, 858),
    ("4k", 4096, 2160),
    ("4kflat", 3996, 2160),
    ("4kscope", 4096, 1716),
    ("nhd", 640, 360),
    ("hqvga", 240, 160),
    ("wqvga", 400, 240),
    ("fwqvga", 432, 240),
    ("hvga", 480, 320),
    ("qhd", 960, 540),
    ("2kdci", 2048, 1080),
    ("4kdci", 4096, 2160),
    ("uhd2160", 3840, 2160),
    ("uhd4320", 7680, 4320),
];

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            aspect_ratios: vec![
                AspectRatioPreset {
                    label: "4:3".to_string(),
                    value: 4.0 / 3.0,
                },
                AspectRatioPreset {
                    label: "16:9".to_string(),
                    value: 16.0 / 9.0,
                },
            ],
            video_sizes: DEFAULT_VIDEO_SIZES
                .iter()
                .map(|(name, width, height)| VideoSizePreset {
                    name: name.to_string(),
                    width: *width,
                    height: *height,
                })
                .collect(),
        }
    }
}

impl BuilderConfig {
    pub fn aspect_ratio(&self, label: &str) -> Option<f64> {
        self.aspect_ratios
            .iter()
            .find(|preset| preset.label == label)
            .map(|preset| preset.value)
    }

    /// Case-insensitive lookup of a video size abbreviation.
    pub fn video_size(&self, name: &str) -> Option<(u32, u32)> {
        let wanted = name.to_lowercase();
        self.video_sizes
            .iter()
            .find(|preset| preset.name.to_lowercase() == wanted)
            .map(|preset| (preset.width, preset.height))
    }
}

pub fn load_config(path: Option<&std::path::Path>) -> Result<BuilderConfig> {
    let config = if let Some(config_path) = path {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

            toml::from_str::<BuilderConfig>(&contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", config_path);
            BuilderConfig::default()
        }
    } else {
        tracing::debug!("No config path provided, using defaults");
        BuilderConfig::default()
    };

    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &BuilderConfig) -> Result<()> {
    let mut labels = HashSet::new();
    for preset in &config.aspect_ratios {
        if !labels.insert(preset.label.as_str()) {
            anyhow::bail!("aspect_ratios contains duplicate label '{}'", preset.label);
        }
        if !(preset.value.is_finite() && preset.value > 0.0) {
            anyhow::bail!("aspect_ratios '{}' must be greater than 0.0", preset.label);
        }
    }

    let mut names = HashSet::new();
    for preset in &config.video_sizes {
        if !names.insert(preset.name.to_lowercase()) {
            anyhow::bail!("video_sizes contains duplicate name '{}'", preset.name);
        }
        if preset.width == 0 || preset.height == 0 {
            anyhow::bail!("video_sizes '{}' must have a non-zero width and height", preset.name);
        }
    }

    Ok(())
}
