// Typed option values and per-field checks

use crate::config::BuilderConfig;
use crate::error::{ValidationReport, Violation};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Which media stream a directive applies to. `None` at the use site means
/// the directive is global and carries no stream suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamSpecifier {
    Video,
    Audio,
    Subtitle,
}

impl StreamSpecifier {
    pub const ALL: [StreamSpecifier; 3] = [
        StreamSpecifier::Video,
        StreamSpecifier::Audio,
        StreamSpecifier::Subtitle,
    ];

    pub fn letter(self) -> &'static str {
        match self {
            StreamSpecifier::Video => "v",
            StreamSpecifier::Audio => "a",
            StreamSpecifier::Subtitle => "s",
        }
    }
}

impl fmt::Display for StreamSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl FromStr for StreamSpecifier {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v" | "video" => Ok(StreamSpecifier::Video),
            "a" | "audio" => Ok(StreamSpecifier::Audio),
            "s" | "subtitle" => Ok(StreamSpecifier::Subtitle),
            other => Err(Violation::field(
                "stream",
                format!("'{}' is not one of v, a, s", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Quiet,
    Panic,
    Fatal,
    Error,
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

impl LogLevel {
    pub const ALL: [LogLevel; 9] = [
        LogLevel::Quiet,
        LogLevel::Panic,
        LogLevel::Fatal,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Verbose,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn token(self) -> &'static str {
        match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Panic => "panic",
            LogLevel::Fatal => "fatal",
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for LogLevel {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        LogLevel::ALL
            .iter()
            .copied()
            .find(|level| level.token() == wanted)
            .ok_or_else(|| Violation::field("log_level", format!("'{}' is not a known log level", s)))
    }
}

/// What to do when the output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    Overwrite,
    NoOverwrite,
    #[default]
    Ask,
}

impl OverwritePolicy {
    pub fn token(self) -> Option<&'static str> {
        match self {
            OverwritePolicy::Overwrite => Some("-y"),
            OverwritePolicy::NoOverwrite => Some("-n"),
            OverwritePolicy::Ask => None,
        }
    }
}

/// A time value in `HH:MM:SS[.ffffff]` form, shared by every time-like option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timecode(NaiveTime);

impl Timecode {
    pub fn from_hms_micro(hours: u32, minutes: u32, seconds: u32, micros: u32) -> Option<Self> {
        NaiveTime::from_hms_micro_opt(hours, minutes, seconds, micros).map(Timecode)
    }

    /// Parse with the option name attached to any violation.
    pub fn parse_field(field: &str, raw: &str) -> Result<Self, Violation> {
        let raw = raw.trim();
        let bad = || {
            Violation::field(
                field,
                format!("'{}' does not match HH:MM:SS[.ffffff]", raw),
            )
        };

        if let Some((_, fraction)) = raw.split_once('.') {
            if fraction.is_empty()
                || fraction.len() > 6
                || !fraction.chars().all(|c| c.is_ascii_digit())
            {
                return Err(bad());
            }
        }

        let time = NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| bad())?;

        // chrono accepts a leap second as :60
        if time.nanosecond() >= 1_000_000_000 {
            return Err(bad());
        }

        Ok(Timecode(time))
    }

    pub fn micros(&self) -> u32 {
        self.0.nanosecond() / 1_000
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))?;
        let micros = self.micros();
        if micros != 0 {
            write!(f, ".{:06}", micros)?;
        }
        Ok(())
    }
}

impl FromStr for Timecode {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timecode::parse_field("time", s)
    }
}

/// Display aspect ratio, kept in the decimal text it was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AspectRatio(String);

impl AspectRatio {
    pub fn parse(raw: &str) -> Result<Self, Violation> {
        let raw = raw.trim();
        let bad = |reason: &str| Violation::field("aspect", format!("'{}' {}", raw, reason));

        let (whole, fraction) = match raw.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (raw, None),
        };
        let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if !digits(whole) || fraction.is_some_and(|f| !digits(f)) {
            return Err(bad("is not a decimal number"));
        }

        let value: f64 = raw.parse().map_err(|_| bad("is not a decimal number"))?;
        if value <= 0.0 {
            return Err(bad("must be greater than zero"));
        }

        Ok(AspectRatio(raw.to_string()))
    }

    /// Resolve a named preset such as `16:9` from the injected table.
    pub fn from_preset(label: &str, config: &BuilderConfig) -> Result<Self, Violation> {
        config
            .aspect_ratio(label)
            .map(|value| AspectRatio(format!("{:.4}", value)))
            .ok_or_else(|| Violation::field("aspect", format!("unknown aspect ratio preset '{}'", label)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AspectRatio {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::parse(s)
    }
}

/// Recording timestamp written into the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingTimestamp {
    Now,
    At(NaiveDateTime),
}

impl RecordingTimestamp {
    pub fn parse(raw: &str) -> Result<Self, Violation> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("now") {
            return Ok(RecordingTimestamp::Now);
        }
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(RecordingTimestamp::At)
            .ok_or_else(|| {
                Violation::field("timestamp", format!("'{}' is neither 'now' nor a date-time", raw))
            })
    }

    pub fn token(&self) -> String {
        match self {
            RecordingTimestamp::Now => "now".to_string(),
            RecordingTimestamp::At(at) => at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

impl FromStr for RecordingTimestamp {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordingTimestamp::parse(s)
    }
}

impl fmt::Display for RecordingTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

/// Closed set of accepted strings, filled from an external catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceSet {
    members: BTreeSet<String>,
}

impl ChoiceSet {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.members.contains(value)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// Accept `value` only if it is a member; returns it unchanged.
    pub fn check<'a>(&self, field: &str, value: &'a str) -> Result<&'a str, Violation> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(Violation::field(field, format!("'{}' is not an available choice", value)))
        }
    }
}

/// Record a violation when `value` falls outside `[min, max]`.
pub fn check_range(
    report: &mut ValidationReport,
    field: &str,
    value: i64,
    min: Option<i64>,
    max: Option<i64>,
) {
    if let Some(min) = min {
        if value < min {
            report.push(Violation::field(
                field,
                format!("{} is less than the minimum of {}", value, min),
            ));
            return;
        }
    }
    if let Some(max) = max {
        if value > max {
            report.push(Violation::field(
                field,
                format!("{} is greater than the maximum of {}", value, max),
            ));
        }
    }
}
