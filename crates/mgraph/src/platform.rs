use crate::config::load_config;
use crate::error::{PlatformError, PlatformErrorExt};
use crate::settings::Settings;
use mgraph_core::{Factory, Serializer};
use mgraph_introspect::{ModelFile, ModelManager};
use mgraph_logger::{LogContext, Logger};
use std::path::Path;
use tracing::info;

/// A model registry with the factory, serializer and log selection configured from [`Settings`].
#[derive(Debug, Clone)]
pub struct Platform {
    settings: Settings,
    model_manager: ModelManager,
    factory: Factory,
    serializer: Serializer,
    selection: LogContext,
}

impl Platform {
    /// Registers `files` and wires every component to `settings`.
    ///
    /// # Errors
    /// [`PlatformError::Schema`] when the files do not resolve, [`PlatformError::Logging`]
    /// for a malformed control string.
    pub fn new(
        settings: Settings,
        files: impl IntoIterator<Item = ModelFile>,
    ) -> Result<Self, PlatformError> {
        let model_manager = ModelManager::from_files(files).context("Registering model files")?;
        let factory = Factory::new(model_manager.clone())
            .with_resolution(settings.factory.abstract_resolution);
        let mut serializer = Serializer::new(factory.clone(), model_manager.clone());
        serializer.set_default_options(settings.serializer);
        let selection = settings.logging.selection()?;

        info!(namespaces = ?model_manager.namespaces(), "platform ready");
        Ok(Self { settings, model_manager, factory, serializer, selection })
    }

    /// [`Platform::new`] with settings read through [`load_config`].
    ///
    /// # Errors
    /// [`PlatformError::Config`] when the configuration cannot be loaded, then as
    /// [`Platform::new`].
    pub fn from_config(
        path: Option<impl AsRef<Path>>,
        files: impl IntoIterator<Item = ModelFile>,
    ) -> Result<Self, PlatformError> {
        let settings: Settings = load_config(path)?;
        Self::new(settings, files)
    }

    /// Installs the global subscriber described by the logging settings.
    ///
    /// The platform's selection becomes the one the subscriber filters with, so
    /// [`Platform::reconfigure_logging`] takes effect immediately.
    ///
    /// # Errors
    /// [`PlatformError::Logging`], e.g. when a global subscriber is already set.
    pub fn init_logging(&mut self) -> Result<Logger, PlatformError> {
        let (logger, selection) = Logger::from_settings(&self.settings.logging)?;
        self.selection = selection;
        Ok(logger)
    }

    /// Replaces the log selection with a new control string.
    ///
    /// # Errors
    /// [`PlatformError::Logging`] for malformed control strings; the old selection stays.
    pub fn reconfigure_logging(&self, control: &str) -> Result<(), PlatformError> {
        let logging = &self.settings.logging;
        self.selection.reconfigure(control, &logging.profiles, logging.level)?;
        Ok(())
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn model_manager(&self) -> &ModelManager {
        &self.model_manager
    }

    #[must_use]
    pub const fn factory(&self) -> &Factory {
        &self.factory
    }

    #[must_use]
    pub const fn serializer(&self) -> &Serializer {
        &self.serializer
    }

    #[must_use]
    pub const fn selection(&self) -> &LogContext {
        &self.selection
    }
}
