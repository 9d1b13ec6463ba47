use crate::context::LogContext;
use crate::control::Profiles;
use crate::error::LoggerError;
use crate::level::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Serializable logging section of the application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub name: String,
    pub console: bool,
    pub path: Option<PathBuf>,
    pub level: LogLevel,
    pub json: bool,
    /// Control string, e.g. `"mgraph:core -mgraph:core/typed_stack"`.
    pub debug: String,
    pub profiles: Profiles,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            name: "mgraph".to_owned(),
            console: true,
            path: None,
            level: LogLevel::Info,
            json: false,
            debug: "*".to_owned(),
            profiles: Profiles::default(),
        }
    }
}

impl LogSettings {
    /// Parses the control string into a fresh [`LogContext`].
    ///
    /// # Errors
    /// Fails on malformed control strings.
    pub fn selection(&self) -> Result<LogContext, LoggerError> {
        LogContext::from_control(&self.debug, &self.profiles, self.level)
    }
}
