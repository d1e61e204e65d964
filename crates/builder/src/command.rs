// Command assembler: one input, one output, global options and directives

use crate::codec::CodecDirective;
use crate::directive::{Directive, Placement};
use crate::error::{BuildResult, ValidationReport, Violation};
use crate::filter::FilterDirective;
use crate::globals::GlobalOptions;
use crate::options::ChoiceSet;
use tracing::debug;

/// Shape of the value returned by [`Command::generate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One argument per element, ready to hand to a process spawner.
    TokenList,
    /// Arguments joined by single spaces, input/output paths quoted.
    JoinedString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Tokens(Vec<String>),
    Joined(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Arg(String),
    Path(String),
}

impl Token {
    fn raw(self) -> String {
        match self {
            Token::Arg(arg) | Token::Path(arg) => arg,
        }
    }

    fn shell(self) -> String {
        match self {
            Token::Arg(arg) => arg,
            Token::Path(path) => quote_path(&path),
        }
    }
}

/// Wrap a path in double quotes, backslash-escaping embedded quotes.
pub fn quote_path(path: &str) -> String {
    let escaped = path.replace('"', "\\\"").replace('\'', "\\'");
    format!("\"{}\"", escaped)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    binary: String,
    input: String,
    output: String,
    options: GlobalOptions,
    codecs: Vec<CodecDirective>,
    filters: Vec<FilterDirective>,
    catalog: Option<ChoiceSet>,
    filter_catalog: Option<ChoiceSet>,
}

impl Command {
    /// `binary` is the resolved tool path and is emitted as-is in front of
    /// every invocation.
    pub fn new(binary: impl Into<String>, input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            input: input.into(),
            output: output.into(),
            options: GlobalOptions::default(),
            codecs: Vec::new(),
            filters: Vec::new(),
            catalog: None,
            filter_catalog: None,
        }
    }

    pub fn with_options(mut self, options: GlobalOptions) -> Self {
        self.options = options;
        self
    }

    /// Check codec names against `catalog` on attach and on generate.
    pub fn with_catalog(mut self, catalog: ChoiceSet) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Check bitstream filter names against `catalog` on attach and on generate.
    pub fn with_filter_catalog(mut self, catalog: ChoiceSet) -> Self {
        self.filter_catalog = Some(catalog);
        self
    }

    pub fn options(&self) -> &GlobalOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut GlobalOptions {
        &mut self.options
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn codecs(&self) -> &[CodecDirective] {
        &self.codecs
    }

    pub fn filters(&self) -> &[FilterDirective] {
        &self.filters
    }

    fn codec_report(&self, codec: &CodecDirective) -> ValidationReport {
        match &self.catalog {
            Some(catalog) => codec.validate_against(catalog),
            None => codec.validate(),
        }
    }

    fn filter_report(&self, filter: &FilterDirective) -> ValidationReport {
        match &self.filter_catalog {
            Some(catalog) => filter.validate_against(catalog),
            None => filter.validate(),
        }
    }

    /// Validate `codec` and append it. On violation nothing is attached.
    pub fn add_codec(&mut self, codec: CodecDirective) -> BuildResult<&mut Self> {
        let codec = self.codec_report(&codec).into_result(codec.name(), codec)?;
        debug!(placement = ?codec.placement(), "attached codec directive");
        self.codecs.push(codec);
        Ok(self)
    }

    /// Validate `filter` and append it. On violation nothing is attached.
    pub fn add_filter(&mut self, filter: impl Into<FilterDirective>) -> BuildResult<&mut Self> {
        let filter = filter.into();
        let filter = self.filter_report(&filter).into_result(filter.name(), filter)?;
        debug!(filter = filter.name(), "attached filter directive");
        self.filters.push(filter);
        Ok(self)
    }

    /// Every violation of the command as a whole: option fields, attached
    /// directives and the input/output presence check.
    pub fn validate(&self) -> ValidationReport {
        let mut report = self.options.validate();
        for codec in &self.codecs {
            report.extend(self.codec_report(codec));
        }
        for filter in &self.filters {
            report.extend(self.filter_report(filter));
        }
        if self.input.trim().is_empty() {
            report.push(Violation::aggregate("input path is required"));
        }
        if self.output.trim().is_empty() {
            report.push(Violation::aggregate("output path is required"));
        }
        report
    }

    fn codec_tokens(&self, placement: Placement, tokens: &mut Vec<Token>) {
        for codec in self.codecs.iter().filter(|c| c.placement() == placement) {
            tokens.extend(codec.tokens().into_iter().map(Token::Arg));
        }
    }

    fn assemble(&self) -> Vec<Token> {
        fn flag(tokens: &mut Vec<Token>, name: &str, value: Option<String>) {
            tokens.push(Token::Arg(name.to_string()));
            if let Some(value) = value {
                tokens.push(Token::Arg(value));
            }
        }

        let o = &self.options;
        let mut tokens = vec![Token::Arg(self.binary.clone())];

        // Input side
        if let Some(level) = o.log_level {
            flag(&mut tokens, "-loglevel", Some(level.to_string()));
        }
        if let (Some(duration), true) = (o.duration, o.duration_before_input) {
            flag(&mut tokens, "-t", Some(duration.to_string()));
        }
        if let (Some(position), true) = (o.ss_position, o.ss_before_input) {
            flag(&mut tokens, "-ss", Some(position.to_string()));
        }
        if let Some(offset) = o.input_time_offset {
            flag(&mut tokens, "-itsoffset", Some(offset.to_string()));
        }
        if let Some(count) = o.stream_loop.filter(|count| *count != 0) {
            flag(&mut tokens, "-stream_loop", Some(count.to_string()));
        }
        self.codec_tokens(Placement::BeforeInput, &mut tokens);

        tokens.push(Token::Arg("-i".to_string()));
        tokens.push(Token::Path(self.input.clone()));

        // Output side
        if let Some(policy) = o.overwrite.and_then(|p| p.token()) {
            flag(&mut tokens, policy, None);
        }
        if let (Some(duration), false) = (o.duration, o.duration_before_input) {
            flag(&mut tokens, "-t", Some(duration.to_string()));
        }
        if let Some(limit) = o.file_size_limit.filter(|limit| *limit != 0) {
            flag(&mut tokens, "-fs", Some(limit.to_string()));
        }
        if let Some(position) = o.to_position {
            flag(&mut tokens, "-to", Some(position.to_string()));
        }
        if let (Some(position), false) = (o.ss_position, o.ss_before_input) {
            flag(&mut tokens, "-ss", Some(position.to_string()));
        }
        if let Some(position) = o.sseof_position {
            flag(&mut tokens, "-sseof", Some(position.to_string()));
        }
        if let Some(timestamp) = o.timestamp {
            flag(&mut tokens, "-timestamp", Some(timestamp.token()));
        }
        if o.disable_video {
            flag(&mut tokens, "-vn", None);
        }
        if let Some(aspect) = &o.aspect {
            flag(&mut tokens, "-aspect", Some(aspect.to_string()));
        }
        self.codec_tokens(Placement::AfterInput, &mut tokens);
        for filter in &self.filters {
            tokens.extend(filter.tokens().into_iter().map(Token::Arg));
        }

        tokens.push(Token::Path(self.output.clone()));
        tokens
    }

    fn checked_tokens(&self) -> BuildResult<Vec<Token>> {
        self.validate().into_result("command", ())?;
        let tokens = self.assemble();
        debug!(tokens = tokens.len(), "assembled command");
        Ok(tokens)
    }

    /// Validate the whole command and render it. Nothing is rendered when
    /// any violation is found.
    pub fn generate(&self, format: OutputFormat) -> BuildResult<Invocation> {
        Ok(match format {
            OutputFormat::TokenList => Invocation::Tokens(self.tokens()?),
            OutputFormat::JoinedString => Invocation::Joined(self.to_command_string()?),
        })
    }

    pub fn tokens(&self) -> BuildResult<Vec<String>> {
        Ok(self.checked_tokens()?.into_iter().map(Token::raw).collect())
    }

    pub fn to_command_string(&self) -> BuildResult<String> {
        let parts: Vec<String> = self.checked_tokens()?.into_iter().map(Token::shell).collect();
        Ok(parts.join(" "))
    }
}
