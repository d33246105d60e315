use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";
pub const ENV_PREFIX: &str = "TRADE_CALC_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by merging defaults, TOML, environment variables, and JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the result is invalid.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration from a specific TOML file.
    ///
    /// A `Config.json` next to the TOML file fills keys the TOML file and the
    /// environment leave unset.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the result is invalid.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        Self::extract(layered(path.as_ref(), None))
    }

    /// Loads application configuration with a specific profile.
    ///
    /// `Config.{profile}.toml` from the same directory is merged over the base file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the result is invalid.
    pub fn load_with_profile(path: impl AsRef<Path>, profile: &str) -> Result<AppConfig> {
        Self::extract(layered(path.as_ref(), Some(profile)))
    }

    /// Path of the profile overlay for the base file at `path`.
    #[must_use]
    pub fn profile_path(path: &Path, profile: &str) -> PathBuf {
        path.with_file_name(format!("Config.{profile}.toml"))
    }

    fn extract(figment: Figment) -> Result<AppConfig> {
        let config: AppConfig = figment.extract()?;

        config.validate()?;
        tracing::info!(fee_percent = %config.fees.fee_percent, "Configuration loaded");

        Ok(config)
    }
}

fn layered(path: &Path, profile: Option<&str>) -> Figment {
    let mut figment = Figment::from(Toml::file(path));
    if let Some(profile) = profile {
        figment = figment.merge(Toml::file(ConfigLoader::profile_path(path, profile)));
    }
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .join(Json::file(path.with_file_name("Config.json")))
        .join(Serialized::defaults(AppConfig::default()))
}
