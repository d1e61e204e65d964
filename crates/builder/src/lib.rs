// Typed, validated ffmpeg command assembly

pub mod codec;
pub mod command;
pub mod config;
pub mod directive;
pub mod error;
pub mod filter;
pub mod globals;
pub mod options;
pub mod toolchain;

// Re-export commonly used types
pub use codec::CodecDirective;
pub use command::{Command, Invocation, OutputFormat};
pub use config::BuilderConfig;
pub use directive::{Directive, Placement};
pub use error::{BuildError, BuildResult, ValidationReport, Violation};
pub use filter::{BitstreamFilter, BitstreamFilterName, FilterDirective, ForceOriginalAspectRatio, ScaleFilter};
pub use globals::{GlobalOptions, RawGlobalOptions};
pub use options::{LogLevel, OverwritePolicy, StreamSpecifier, Timecode};
