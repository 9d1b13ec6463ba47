use crate::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};
use tracing::Level;
use tracing::level_filters::LevelFilter;

/// Verbosity attached to a selection node, from `none` (0) to `all` (6).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(u8)]
pub enum LogLevel {
    None = 0,
    Error = 1,
    Warn = 2,
    #[default]
    Info = 3,
    Verbose = 4,
    Debug = 5,
    All = 6,
}

impl LogLevel {
    /// Parses a level name, case-insensitively.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidLevel`] for unknown names.
    pub fn parse(name: &str) -> Result<Self, LoggerError> {
        Self::from_str(name.trim()).map_err(|_| LoggerError::InvalidLevel {
            message: format!("Unrecognized log level {name}").into(),
            context: None,
        })
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// The most verbose tracing level this setting admits.
    #[must_use]
    pub const fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::None => LevelFilter::OFF,
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Debug | Self::All => LevelFilter::TRACE,
        }
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => Self::Info,
            Level::DEBUG => Self::Verbose,
            Level::TRACE => Self::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() -> Result<(), LoggerError> {
        assert_eq!(LogLevel::parse("VERBOSE")?, LogLevel::Verbose);
        assert_eq!(LogLevel::parse("all")?, LogLevel::All);
        assert_eq!(LogLevel::parse(" none ")?.as_u8(), 0);
        assert_eq!(LogLevel::All.as_u8(), 6);
        Ok(())
    }

    #[test]
    fn rejects_unknown_names() {
        let err = LogLevel::parse("loud").expect_err("unknown level");
        assert!(matches!(err, LoggerError::InvalidLevel { .. }));
        assert!(err.to_string().contains("Unrecognized log level loud"));
    }

    #[test]
    fn maps_onto_tracing_levels() {
        assert_eq!(LogLevel::from(Level::DEBUG), LogLevel::Verbose);
        assert_eq!(LogLevel::from(Level::TRACE), LogLevel::Debug);
        assert_eq!(LogLevel::Verbose.to_level_filter(), LevelFilter::DEBUG);
        assert_eq!(LogLevel::None.to_level_filter(), LevelFilter::OFF);
        assert!(LogLevel::Warn < LogLevel::Info);
    }
}
