//! Container configuration. By default, the config is created with opinionated default values,
//! which can then be overwritten by environment variables prefixed with `SPRINGLET_` or the
//! `springlet.json` file.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "SPRINGLET";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "springlet.json";

/// Configuration of an [ApplicationContext](crate::context::ApplicationContext).
#[non_exhaustive]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContainerConfig {
    /// Should a component registered under an already taken name replace the previous one. When
    /// disabled, such component is rejected and reported.
    pub allow_definition_overriding: bool,
}

impl From<OptionalContainerConfig> for ContainerConfig {
    fn from(value: OptionalContainerConfig) -> Self {
        let default = Self::default();
        Self {
            allow_definition_overriding: value
                .allow_definition_overriding
                .unwrap_or(default.allow_definition_overriding),
        }
    }
}

impl ContainerConfig {
    /// Sets whether duplicate component names replace previous definitions.
    pub fn with_definition_overriding(mut self, allow_definition_overriding: bool) -> Self {
        self.allow_definition_overriding = allow_definition_overriding;
        self
    }

    /// Reads configuration from [CONFIG_FILE] (if present) and the environment.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Self::init_from_config(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX)),
        )
    }

    /// Reads configuration from a JSON document.
    pub fn init_from_json(json: &str) -> Result<Self, ConfigError> {
        Self::init_from_config(Config::builder().add_source(File::from_str(json, FileFormat::Json)))
    }

    fn init_from_config(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .build()
            .and_then(|config| config.try_deserialize::<OptionalContainerConfig>())
            .map(|config| config.into())
    }
}

#[derive(Deserialize)]
struct OptionalContainerConfig {
    allow_definition_overriding: Option<bool>,
}
