// Filter directives: bitstream filters and the video scale filter

use crate::config::BuilderConfig;
use crate::directive::{Directive, Placement};
use crate::error::{ValidationReport, Violation};
use crate::options::{check_range, ChoiceSet, StreamSpecifier};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bitstream filters the builder knows how to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitstreamFilterName {
    Text2movsub,
    RemoveExtra,
    Noise,
    Mov2textsub,
    Mpeg4UnpackBframes,
    Mp3decomp,
    Mjpegadump,
    Mjpeg2jpeg,
    Imxdump,
    HevcMp4toannexb,
    H264Mp4toannexb,
    DumpExtra,
    Chomp,
    AacAdtstoasc,
}

const BITSTREAM_FILTER_TOKENS: &[(BitstreamFilterName, &str)] = &[
    (BitstreamFilterName::Text2movsub, "text2movsub"),
    (BitstreamFilterName::RemoveExtra, "remove_extra"),
    (BitstreamFilterName::Noise, "noise"),
    (BitstreamFilterName::Mov2textsub, "mov2textsub"),
    (BitstreamFilterName::Mpeg4UnpackBframes, "mpeg4_unpack_bframes"),
    (BitstreamFilterName::Mp3decomp, "mp3decomp"),
    (BitstreamFilterName::Mjpegadump, "mjpegadump"),
    (BitstreamFilterName::Mjpeg2jpeg, "mjpeg2jpeg"),
    (BitstreamFilterName::Imxdump, "imxdump"),
    (BitstreamFilterName::HevcMp4toannexb, "hevc_mp4toannexb"),
    (BitstreamFilterName::H264Mp4toannexb, "h264_mp4toannexb"),
    (BitstreamFilterName::DumpExtra, "dump_extra"),
    (BitstreamFilterName::Chomp, "chomp"),
    (BitstreamFilterName::AacAdtstoasc, "aac_adtstoasc"),
];

impl BitstreamFilterName {
    pub fn all() -> impl Iterator<Item = BitstreamFilterName> {
        BITSTREAM_FILTER_TOKENS.iter().map(|(name, _)| *name)
    }

    pub fn token(self) -> &'static str {
        BITSTREAM_FILTER_TOKENS
            .iter()
            .find(|(name, _)| *name == self)
            .map(|(_, token)| *token)
            .unwrap_or_default()
    }
}

impl fmt::Display for BitstreamFilterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for BitstreamFilterName {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BITSTREAM_FILTER_TOKENS
            .iter()
            .find(|(_, token)| *token == s.trim())
            .map(|(name, _)| *name)
            .ok_or_else(|| Violation::field("filters", format!("'{}' is not a known bitstream filter", s)))
    }
}

/// `-bsf:<stream> name[,name...]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitstreamFilter {
    pub stream: StreamSpecifier,
    pub filters: Vec<BitstreamFilterName>,
}

impl BitstreamFilter {
    pub fn new(stream: StreamSpecifier, filters: Vec<BitstreamFilterName>) -> Self {
        Self { stream, filters }
    }

    /// Validate, also requiring every filter to be listed in `catalog`.
    pub fn validate_against(&self, catalog: &ChoiceSet) -> ValidationReport {
        let mut report = self.validate();
        for filter in &self.filters {
            if let Err(violation) = catalog.check("filters", filter.token()) {
                report.push(violation);
            }
        }
        report
    }
}

impl Directive for BitstreamFilter {
    fn name(&self) -> &'static str {
        "bitstream filter"
    }

    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        if self.filters.is_empty() {
            report.push(Violation::field("filters", "at least one bitstream filter is required"));
        }
        report
    }

    fn tokens(&self) -> Vec<String> {
        let names: Vec<&str> = self.filters.iter().map(|f| f.token()).collect();
        vec![format!("-bsf:{}", self.stream.letter()), names.join(",")]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceOriginalAspectRatio {
    #[default]
    Disable,
    Decrease,
    Increase,
}

impl ForceOriginalAspectRatio {
    pub fn token(self) -> &'static str {
        match self {
            ForceOriginalAspectRatio::Disable => "disable",
            ForceOriginalAspectRatio::Decrease => "decrease",
            ForceOriginalAspectRatio::Increase => "increase",
        }
    }
}

/// Video scale filter.
///
/// Width comes from either `width` or the input width (`iw`), height from
/// either `height` or the input height (`ih`). Each side may be multiplied
/// by a factor in `[1, 10]`. `keep_aspect_ratio` replaces the height with
/// `-1`, so it can not be combined with a non-disabled
/// `force_original_aspect_ratio`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleFilter {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub use_input_width: bool,
    pub use_input_height: bool,
    pub width_multiplier: Option<u32>,
    pub height_multiplier: Option<u32>,
    pub keep_aspect_ratio: bool,
    pub force_original_aspect_ratio: ForceOriginalAspectRatio,
}

impl ScaleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Scale to a named video size such as `hd720`.
    pub fn from_video_size(name: &str, config: &BuilderConfig) -> Result<Self, Violation> {
        config
            .video_size(name)
            .map(|(width, height)| Self::sized(width, height))
            .ok_or_else(|| Violation::field("video_size", format!("unknown video size '{}'", name)))
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn input_width(mut self) -> Self {
        self.use_input_width = true;
        self
    }

    pub fn input_height(mut self) -> Self {
        self.use_input_height = true;
        self
    }

    pub fn width_multiplier(mut self, factor: u32) -> Self {
        self.width_multiplier = Some(factor);
        self
    }

    pub fn height_multiplier(mut self, factor: u32) -> Self {
        self.height_multiplier = Some(factor);
        self
    }

    pub fn keep_aspect_ratio(mut self) -> Self {
        self.keep_aspect_ratio = true;
        self
    }

    pub fn force_original_aspect_ratio(mut self, mode: ForceOriginalAspectRatio) -> Self {
        self.force_original_aspect_ratio = mode;
        self
    }

    fn dimension(literal: Option<u32>, use_input: bool, input: &str, multiplier: Option<u32>) -> String {
        let base = if use_input {
            input.to_string()
        } else {
            literal.map(|v| v.to_string()).unwrap_or_default()
        };
        match multiplier {
            Some(factor) => format!("{}*{}", base, factor),
            None => base,
        }
    }
}

impl Directive for ScaleFilter {
    fn name(&self) -> &'static str {
        "scale filter"
    }

    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        if let Some(factor) = self.width_multiplier {
            check_range(&mut report, "width_multiplier", factor.into(), Some(1), Some(10));
        }
        if let Some(factor) = self.height_multiplier {
            check_range(&mut report, "height_multiplier", factor.into(), Some(1), Some(10));
        }
        if let Some(width) = self.width {
            check_range(&mut report, "width", width.into(), Some(1), None);
        }
        if let Some(height) = self.height {
            check_range(&mut report, "height", height.into(), Some(1), None);
        }
        if !report.is_empty() {
            return report;
        }

        let name = self.name();
        if self.keep_aspect_ratio && self.force_original_aspect_ratio != ForceOriginalAspectRatio::Disable {
            report.push(Violation::composite(
                name,
                "keep_aspect_ratio and force_original_aspect_ratio can not be set at the same time",
            ));
        }
        if self.width.is_none() && !self.use_input_width {
            report.push(Violation::composite(name, "define width or use_input_width"));
        }
        if self.width.is_some() && self.use_input_width {
            report.push(Violation::composite(name, "width and use_input_width are exclusive"));
        }
        if self.height.is_none() && !self.use_input_height {
            report.push(Violation::composite(name, "define height or use_input_height"));
        }
        if self.height.is_some() && self.use_input_height {
            report.push(Violation::composite(name, "height and use_input_height are exclusive"));
        }
        report
    }

    fn tokens(&self) -> Vec<String> {
        let width = Self::dimension(self.width, self.use_input_width, "iw", self.width_multiplier);
        let height = if self.keep_aspect_ratio {
            "-1".to_string()
        } else {
            Self::dimension(self.height, self.use_input_height, "ih", self.height_multiplier)
        };

        let mut scale = format!("scale={}:{}", width, height);
        if self.force_original_aspect_ratio != ForceOriginalAspectRatio::Disable {
            scale.push_str(":force_original_aspect_ratio=");
            scale.push_str(self.force_original_aspect_ratio.token());
        }

        vec![format!("-filter:{}", StreamSpecifier::Video.letter()), scale]
    }
}

/// Any filter that can be attached to a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterDirective {
    Bitstream(BitstreamFilter),
    Scale(ScaleFilter),
}

impl FilterDirective {
    fn inner(&self) -> &dyn Directive {
        match self {
            FilterDirective::Bitstream(f) => f,
            FilterDirective::Scale(f) => f,
        }
    }

    /// Bitstream filter names are checked against `catalog`; scale filters
    /// validate as usual.
    pub fn validate_against(&self, catalog: &ChoiceSet) -> ValidationReport {
        match self {
            FilterDirective::Bitstream(f) => f.validate_against(catalog),
            FilterDirective::Scale(f) => f.validate(),
        }
    }
}

impl Directive for FilterDirective {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn validate(&self) -> ValidationReport {
        self.inner().validate()
    }

    fn tokens(&self) -> Vec<String> {
        self.inner().tokens()
    }

    fn placement(&self) -> Placement {
        self.inner().placement()
    }
}

impl From<BitstreamFilter> for FilterDirective {
    fn from(filter: BitstreamFilter) -> Self {
        FilterDirective::Bitstream(filter)
    }
}

impl From<ScaleFilter> for FilterDirective {
    fn from(filter: ScaleFilter) -> Self {
        FilterDirective::Scale(filter)
    }
}
