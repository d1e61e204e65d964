use ffcmd_builder::codec::CodecDirective;
use ffcmd_builder::command::{quote_path, Command, Invocation, OutputFormat};
use ffcmd_builder::config::BuilderConfig;
use ffcmd_builder::filter::{BitstreamFilter, BitstreamFilterName, ScaleFilter};
use ffcmd_builder::globals::{GlobalOptions, RawGlobalOptions};
use ffcmd_builder::options::{LogLevel, OverwritePolicy, StreamSpecifier, Timecode};
use proptest::prelude::*;

const FFMPEG: &str = "/usr/bin/ffmpeg";

fn arb_timecode() -> impl Strategy<Value = Timecode> {
    (0u32..24, 0u32..60, 0u32..60, prop_oneof![Just(0u32), 0u32..1_000_000])
        .prop_map(|(h, m, s, us)| Timecode::from_hms_micro(h, m, s, us).unwrap())
}

fn arb_path() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _'\"./-]{1,24}".prop_filter("non-blank, not a flag", |p| {
        !p.trim().is_empty() && !p.starts_with('-')
    })
}

fn arb_options() -> impl Strategy<Value = GlobalOptions> {
    (
        prop::option::of(prop::sample::select(LogLevel::ALL.to_vec())),
        prop::option::of(prop_oneof![
            Just(OverwritePolicy::Overwrite),
            Just(OverwritePolicy::NoOverwrite),
            Just(OverwritePolicy::Ask),
        ]),
        prop::option::of(-1i32..5),
        prop::option::of(arb_timecode()),
        any::<bool>(),
        prop::option::of(arb_timecode()),
        prop::option::of(arb_timecode()),
        any::<bool>(),
        prop::option::of(prop_oneof![Just(0u64), 1u64..10_000_000_000]),
        any::<bool>(),
    )
        .prop_map(
            |(
                log_level,
                overwrite,
                stream_loop,
                duration,
                duration_before_input,
                to_position,
                ss_position,
                ss_before_input,
                file_size_limit,
                disable_video,
            )| GlobalOptions {
                log_level,
                overwrite,
                stream_loop,
                duration,
                duration_before_input,
                to_position,
                ss_position,
                ss_before_input,
                file_size_limit,
                disable_video,
                ..GlobalOptions::default()
            },
        )
}

fn arb_codec() -> impl Strategy<Value = CodecDirective> {
    (
        prop::option::of(prop::sample::select(StreamSpecifier::ALL.to_vec())),
        prop::option::of("[a-z][a-z0-9]{1,8}"),
        any::<bool>(),
    )
        .prop_map(|(stream, name, before)| {
            let mut codec = match name {
                Some(name) => CodecDirective::named(name),
                None => CodecDirective::copy(),
            };
            codec.stream = stream;
            if before {
                codec = codec.before_input();
            }
            codec
        })
}

fn position(tokens: &[String], needle: &str) -> Option<usize> {
    tokens.iter().position(|t| t == needle)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 1: Generation is repeatable**
    ///
    /// Two generate calls on an unmutated command return identical output in
    /// both formats.
    #[test]
    fn prop_generate_repeatable(
        options in arb_options(),
        codecs in prop::collection::vec(arb_codec(), 0..4),
        input in arb_path(),
        output in arb_path(),
    ) {
        let mut cmd = Command::new(FFMPEG, input, output).with_options(options);
        for codec in codecs {
            cmd.add_codec(codec).unwrap();
        }

        for format in [OutputFormat::TokenList, OutputFormat::JoinedString] {
            let first = cmd.generate(format).unwrap();
            let second = cmd.generate(format).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    /// **Property 2: Fixed frame of every invocation**
    ///
    /// The binary comes first, `-i <input>` appears exactly once, and the
    /// output path is always last.
    #[test]
    fn prop_binary_input_output_frame(
        options in arb_options(),
        input in arb_path(),
        output in arb_path(),
    ) {
        let cmd = Command::new(FFMPEG, input.clone(), output.clone()).with_options(options);
        let tokens = cmd.tokens().unwrap();

        prop_assert_eq!(tokens.first().map(String::as_str), Some(FFMPEG));
        prop_assert_eq!(tokens.last(), Some(&output));
        prop_assert_eq!(tokens.iter().filter(|t| *t == "-i").count(), 1);
        let i = position(&tokens, "-i").unwrap();
        prop_assert_eq!(&tokens[i + 1], &input);
    }

    /// **Property 3: Before/after input placement**
    ///
    /// Input-side flags land before `-i`; output-side flags land after the
    /// input path.
    #[test]
    fn prop_slot_sides(options in arb_options()) {
        let cmd = Command::new(FFMPEG, "in.mkv", "out.mkv").with_options(options.clone());
        let tokens = cmd.tokens().unwrap();
        let input_at = position(&tokens, "-i").unwrap();

        if options.log_level.is_some() {
            prop_assert!(position(&tokens, "-loglevel").unwrap() < input_at);
        }
        if let Some(count) = options.stream_loop {
            match position(&tokens, "-stream_loop") {
                Some(at) => {
                    prop_assert!(count != 0);
                    prop_assert!(at < input_at);
                }
                None => {
                    prop_assert_eq!(count, 0);
                }
            }
        }
        if options.duration.is_some() {
            let at = position(&tokens, "-t").unwrap();
            prop_assert_eq!(at < input_at, options.duration_before_input);
        } else {
            prop_assert!(position(&tokens, "-t").is_none());
        }
        if options.ss_position.is_some() {
            let at = position(&tokens, "-ss").unwrap();
            prop_assert_eq!(at < input_at, options.ss_before_input);
        }
        match options.overwrite {
            Some(OverwritePolicy::Overwrite) => {
                prop_assert_eq!(position(&tokens, "-y"), Some(input_at + 2));
            }
            Some(OverwritePolicy::NoOverwrite) => {
                prop_assert_eq!(position(&tokens, "-n"), Some(input_at + 2));
            }
            _ => {
                prop_assert!(position(&tokens, "-y").is_none());
                prop_assert!(position(&tokens, "-n").is_none());
            }
        }
        match options.file_size_limit.filter(|limit| *limit != 0) {
            Some(_) => prop_assert!(position(&tokens, "-fs").unwrap() > input_at),
            None => prop_assert!(position(&tokens, "-fs").is_none()),
        }
        if options.to_position.is_some() {
            prop_assert!(position(&tokens, "-to").unwrap() > input_at);
        }
        prop_assert_eq!(position(&tokens, "-vn").is_some(), options.disable_video);
    }

    /// **Property 4: Codecs keep attachment order within their side**
    #[test]
    fn prop_codec_attachment_order(codecs in prop::collection::vec(arb_codec(), 1..6)) {
        let mut cmd = Command::new(FFMPEG, "in.mkv", "out.mkv");
        for codec in &codecs {
            cmd.add_codec(codec.clone()).unwrap();
        }
        cmd.add_filter(ScaleFilter::sized(640, 360)).unwrap();

        let tokens = cmd.tokens().unwrap();
        let input_at = position(&tokens, "-i").unwrap();
        let filter_at = position(&tokens, "-filter:v").unwrap();

        let mut expected_before = vec![FFMPEG.to_string()];
        let mut expected_after = Vec::new();
        for codec in &codecs {
            let rendered = ffcmd_builder::Directive::tokens(codec);
            if codec.placement == ffcmd_builder::Placement::BeforeInput {
                expected_before.extend(rendered);
            } else {
                expected_after.extend(rendered);
            }
        }

        prop_assert_eq!(&tokens[..input_at], &expected_before[..]);
        prop_assert_eq!(&tokens[input_at + 2..filter_at], &expected_after[..]);
    }

    /// **Property 5: Joined string quotes and escapes only the paths**
    #[test]
    fn prop_joined_string_quotes_paths(input in arb_path(), output in arb_path()) {
        let cmd = Command::new(FFMPEG, input.clone(), output.clone());
        let joined = cmd.to_command_string().unwrap();
        prop_assert_eq!(
            joined,
            format!("{} -i {} {}", FFMPEG, quote_path(&input), quote_path(&output))
        );
    }

    /// **Property 6: Rejected attaches never change the command**
    #[test]
    fn prop_rejected_attach_is_noop(options in arb_options()) {
        let mut cmd = Command::new(FFMPEG, "in.mkv", "out.mkv").with_options(options);
        let before = cmd.tokens().unwrap();

        prop_assert!(cmd.add_codec(CodecDirective::default()).is_err());
        prop_assert!(cmd.add_filter(BitstreamFilter::new(StreamSpecifier::Audio, vec![])).is_err());
        prop_assert!(cmd.add_filter(ScaleFilter::new().width(10)).is_err());

        prop_assert_eq!(cmd.tokens().unwrap(), before);
    }
}

#[test]
fn test_reference_invocations() {
    let cmd = Command::new(FFMPEG, "input.mp4", "output.mp4");
    assert_eq!(
        cmd.generate(OutputFormat::JoinedString).unwrap(),
        Invocation::Joined(r#"/usr/bin/ffmpeg -i "input.mp4" "output.mp4""#.to_string())
    );

    let raw = RawGlobalOptions {
        duration: Some("00:10:00".to_string()),
        ..Default::default()
    };
    let options = raw.parse(&BuilderConfig::default()).unwrap();
    let mut cmd = Command::new(FFMPEG, "input.mp4", "output.mp4").with_options(options);
    cmd.add_codec(CodecDirective::copy().stream(StreamSpecifier::Video))
        .unwrap()
        .add_filter(BitstreamFilter::new(
            StreamSpecifier::Audio,
            vec![BitstreamFilterName::AacAdtstoasc],
        ))
        .unwrap();

    assert_eq!(
        cmd.to_command_string().unwrap(),
        r#"/usr/bin/ffmpeg -i "input.mp4" -t 00:10:00 -c:v copy -bsf:a aac_adtstoasc "output.mp4""#
    );
    assert_eq!(
        cmd.generate(OutputFormat::TokenList).unwrap(),
        Invocation::Tokens(
            [
                FFMPEG, "-i", "input.mp4", "-t", "00:10:00", "-c:v", "copy", "-bsf:a",
                "aac_adtstoasc", "output.mp4",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect()
        )
    );
}

#[test]
fn test_missing_output_reports_aggregate_violation() {
    let mut cmd = Command::new(FFMPEG, "input.mp4", "");
    cmd.add_codec(CodecDirective::copy()).unwrap();
    let err = cmd.generate(OutputFormat::TokenList).unwrap_err();
    assert_eq!(err.violations().len(), 1);
    assert!(err.violations()[0].is_aggregate());
    assert!(err.to_string().contains("output path is required"));
}
