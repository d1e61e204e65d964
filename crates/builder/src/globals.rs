// Command-wide options, both as raw caller input and as checked values

use crate::config::BuilderConfig;
use crate::error::{BuildResult, ValidationReport, Violation};
use crate::options::{
    check_range, AspectRatio, LogLevel, OverwritePolicy, RecordingTimestamp, Timecode,
};
use serde::{Deserialize, Serialize};

/// Checked global options. Every time-like field shares the `Timecode` format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlobalOptions {
    pub log_level: Option<LogLevel>,
    pub overwrite: Option<OverwritePolicy>,
    /// 0 means no loop, -1 loops forever.
    pub stream_loop: Option<i32>,
    pub duration: Option<Timecode>,
    pub duration_before_input: bool,
    pub to_position: Option<Timecode>,
    pub ss_position: Option<Timecode>,
    pub ss_before_input: bool,
    pub sseof_position: Option<Timecode>,
    pub file_size_limit: Option<u64>,
    pub input_time_offset: Option<Timecode>,
    pub timestamp: Option<RecordingTimestamp>,
    pub disable_video: bool,
    pub aspect: Option<AspectRatio>,
}

impl GlobalOptions {
    /// Field checks that still apply to values built in code.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        if let Some(count) = self.stream_loop {
            check_range(&mut report, "stream_loop", count.into(), Some(-1), None);
        }
        report
    }
}

/// Global options as they arrive from a job file or form: plain strings and
/// numbers, nothing checked yet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawGlobalOptions {
    pub log_level: Option<String>,
    /// `true` overwrites, `false` never overwrites, absent asks.
    pub overwrite: Option<bool>,
    pub stream_loop: Option<i64>,
    pub duration: Option<String>,
    pub duration_before_input: bool,
    pub to_position: Option<String>,
    pub ss_position: Option<String>,
    pub ss_before_input: bool,
    pub sseof_position: Option<String>,
    pub file_size_limit: Option<i64>,
    pub input_time_offset: Option<String>,
    pub timestamp: Option<String>,
    pub timestamp_now: bool,
    pub disable_video: bool,
    /// Decimal (`1.7777`) or a configured preset label (`16:9`).
    pub aspect: Option<String>,
}

impl RawGlobalOptions {
    /// Check every field and return either the typed options or all
    /// violations found at once.
    pub fn parse(&self, config: &BuilderConfig) -> BuildResult<GlobalOptions> {
        let mut report = ValidationReport::new();
        let mut options = GlobalOptions {
            duration_before_input: self.duration_before_input,
            ss_before_input: self.ss_before_input,
            disable_video: self.disable_video,
            ..GlobalOptions::default()
        };

        options.log_level = collect(&mut report, self.log_level.as_deref(), |raw| raw.parse());
        options.overwrite = self.overwrite.map(|overwrite| {
            if overwrite {
                OverwritePolicy::Overwrite
            } else {
                OverwritePolicy::NoOverwrite
            }
        });

        if let Some(count) = self.stream_loop {
            let before = report.len();
            check_range(&mut report, "stream_loop", count, Some(-1), Some(i32::MAX.into()));
            if report.len() == before {
                options.stream_loop = i32::try_from(count).ok();
            }
        }

        if let Some(limit) = self.file_size_limit {
            let before = report.len();
            check_range(&mut report, "file_size_limit", limit, Some(0), None);
            if report.len() == before {
                options.file_size_limit = u64::try_from(limit).ok();
            }
        }

        options.duration = time_field(&mut report, "duration", self.duration.as_deref());
        options.to_position = time_field(&mut report, "to_position", self.to_position.as_deref());
        options.ss_position = time_field(&mut report, "ss_position", self.ss_position.as_deref());
        options.sseof_position =
            time_field(&mut report, "sseof_position", self.sseof_position.as_deref());
        options.input_time_offset =
            time_field(&mut report, "input_time_offset", self.input_time_offset.as_deref());

        let timestamp = collect(&mut report, self.timestamp.as_deref(), RecordingTimestamp::parse);
        options.timestamp = if self.timestamp_now {
            Some(RecordingTimestamp::Now)
        } else {
            timestamp
        };

        options.aspect = collect(&mut report, self.aspect.as_deref(), |raw| {
            if raw.contains(':') {
                AspectRatio::from_preset(raw.trim(), config)
            } else {
                AspectRatio::parse(raw)
            }
        });

        report.into_result("global options", options)
    }
}

fn collect<T>(
    report: &mut ValidationReport,
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, Violation>,
) -> Option<T> {
    match raw.map(parse) {
        Some(Ok(value)) => Some(value),
        Some(Err(violation)) => {
            report.push(violation);
            None
        }
        None => None,
    }
}

fn time_field(report: &mut ValidationReport, field: &str, raw: Option<&str>) -> Option<Timecode> {
    collect(report, raw, |raw| Timecode::parse_field(field, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_now_still_checks_explicit_timestamp() {
        let raw = RawGlobalOptions {
            timestamp: Some("garbage".to_string()),
            timestamp_now: true,
            ..Default::default()
        };
        let err = raw.parse(&BuilderConfig::default()).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(
            err.violations()[0],
            Violation::field("timestamp", "'garbage' is neither 'now' nor a date-time")
        );
    }

    #[test]
    fn test_timestamp_now_wins_over_valid_timestamp() {
        let raw = RawGlobalOptions {
            timestamp: Some("2020-01-02 03:04:05".to_string()),
            timestamp_now: true,
            ..Default::default()
        };
        let options = raw.parse(&BuilderConfig::default()).unwrap();
        assert_eq!(options.timestamp, Some(RecordingTimestamp::Now));
    }

    #[test]
    fn test_empty_raw_options_parse_to_defaults() {
        let options = RawGlobalOptions::default()
            .parse(&BuilderConfig::default())
            .unwrap();
        assert_eq!(options, GlobalOptions::default());
    }

    #[test]
    fn test_raw_options_parse() {
        let raw = RawGlobalOptions {
            log_level: Some("error".to_string()),
            overwrite: Some(false),
            stream_loop: Some(-1),
            duration: Some("00:10:00".to_string()),
            file_size_limit: Some(1024),
            timestamp: Some("2020-01-02 03:04:05".to_string()),
            aspect: Some("16:9".to_string()),
            ..Default::default()
        };

        let options = raw.parse(&BuilderConfig::default()).unwrap();
        assert_eq!(options.log_level, Some(LogLevel::Error));
        assert_eq!(options.overwrite, Some(OverwritePolicy::NoOverwrite));
        assert_eq!(options.stream_loop, Some(-1));
        assert_eq!(options.duration.map(|d| d.to_string()).as_deref(), Some("00:10:00"));
        assert_eq!(options.file_size_limit, Some(1024));
        assert_eq!(options.timestamp.map(|t| t.token()).as_deref(), Some("2020-01-02T03:04:05"));
        assert_eq!(options.aspect.as_ref().map(|a| a.as_str()), Some("1.7778"));
    }

    #[test]
    fn test_now_flag_wins_over_explicit_timestamp() {
        let raw = RawGlobalOptions {
            timestamp: Some("2020-01-02 03:04:05".to_string()),
            timestamp_now: true,
            ..Default::default()
        };
        let options = raw.parse(&BuilderConfig::default()).unwrap();
        assert_eq!(options.timestamp, Some(RecordingTimestamp::Now));
    }

    #[test]
    fn test_all_violations_reported_together() {
        let raw = RawGlobalOptions {
            log_level: Some("chatty".to_string()),
            stream_loop: Some(-5),
            duration: Some("ten minutes".to_string()),
            sseof_position: Some("00:99:00".to_string()),
            file_size_limit: Some(-1),
            aspect: Some("wide".to_string()),
            ..Default::default()
        };

        let err = raw.parse(&BuilderConfig::default()).unwrap_err();
        let fields: Vec<String> = err
            .violations()
            .iter()
            .map(|v| match v {
                Violation::Field { field, .. } => field.clone(),
                other => panic!("unexpected violation {:?}", other),
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                "log_level",
                "stream_loop",
                "file_size_limit",
                "duration",
                "sseof_position",
                "aspect"
            ]
        );
    }

    #[test]
    fn test_typed_stream_loop_bound() {
        let options = GlobalOptions {
            stream_loop: Some(-2),
            ..Default::default()
        };
        assert_eq!(options.validate().len(), 1);
    }
}
