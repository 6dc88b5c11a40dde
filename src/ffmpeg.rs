//! FFmpeg console verbosity.
//!
//! FFmpeg prints its own warnings to stderr, independently of the Rust
//! [`log`](https://crates.io/crates/log) facade this crate uses. A long
//! palette run over a slightly damaged file can flood the terminal, so the
//! binary exposes this as `--log-level`.
//!
//! ```no_run
//! use makepalette::DecoderLogLevel;
//!
//! makepalette::set_decoder_log_level(DecoderLogLevel::Error);
//! ```

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

use crate::error::PaletteError;

/// How much FFmpeg itself prints, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecoderLogLevel {
    /// Nothing at all.
    Quiet,
    /// Only unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's own default).
    #[default]
    Warning,
    /// Informational messages.
    Info,
    /// Debugging output.
    Debug,
}

impl DecoderLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            DecoderLogLevel::Quiet => Level::Quiet,
            DecoderLogLevel::Fatal => Level::Fatal,
            DecoderLogLevel::Error => Level::Error,
            DecoderLogLevel::Warning => Level::Warning,
            DecoderLogLevel::Info => Level::Info,
            DecoderLogLevel::Debug => Level::Debug,
        }
    }
}

impl FromStr for DecoderLogLevel {
    type Err = PaletteError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quiet" | "off" => Ok(DecoderLogLevel::Quiet),
            "fatal" => Ok(DecoderLogLevel::Fatal),
            "error" => Ok(DecoderLogLevel::Error),
            "warning" | "warn" => Ok(DecoderLogLevel::Warning),
            "info" => Ok(DecoderLogLevel::Info),
            "debug" => Ok(DecoderLogLevel::Debug),
            other => Err(PaletteError::invalid(format!(
                "unknown decoder log level {other:?}"
            ))),
        }
    }
}

/// Set FFmpeg's console verbosity for the whole process.
pub fn set_decoder_log_level(level: DecoderLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
