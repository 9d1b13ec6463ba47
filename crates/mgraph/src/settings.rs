use mgraph_core::{AbstractResolution, SerializerOptions};
use mgraph_logger::LogSettings;
use serde::{Deserialize, Serialize};

/// Application configuration, one section per subsystem.
///
/// Every section falls back to its defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub serializer: SerializerOptions,
    pub factory: FactorySettings,
    pub logging: LogSettings,
}

/// Instance creation knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorySettings {
    pub abstract_resolution: AbstractResolution,
}
