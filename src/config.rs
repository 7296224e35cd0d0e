//! Configuration file handling for rollup.
//!
//! The configuration file is optional. When no path is given, `<config dir>/rollup/config.json` is
//! used if it exists, and the built-in defaults otherwise. It controls which trees are processed
//! and the policies of the renumber and roll-up pass.

use crate::engine::{MalformedPolicy, Options, RenumberMode, ASSIGNED, IMPORTED};
use crate::error::Res;
use crate::model::AmountFormat;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "rollup";
const CONFIG_VERSION: u8 = 1;
const CONFIG_DIR: &str = "rollup";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app, either loaded from a
/// `config.json` file or made of defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    path: Option<PathBuf>,
    config_file: ConfigFile,
}

impl Config {
    /// Writes a default `config.json` to `path`, creating its directory if needed.
    ///
    /// # Errors
    /// - Returns an error if the file exists and `force` is false.
    /// - Returns an error if any file operations fail.
    pub async fn create(path: impl Into<PathBuf>, force: bool) -> Res<Self> {
        let path = path.into();
        if path.is_file() && !force {
            bail!(
                "The config file '{}' already exists, use --force to overwrite it",
                path.display()
            )
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            utils::make_dir(parent)
                .await
                .context("Unable to create the config directory")?;
        }

        let config_file = ConfigFile::default();
        config_file.save(&path).await?;
        Ok(Self {
            path: Some(path),
            config_file,
        })
    }

    /// Loads and validates the config file at `path`.
    pub async fn load(path: impl Into<PathBuf>) -> Res<Self> {
        let path = path.into();
        if !path.is_file() {
            bail!("The config file is missing '{}'", path.display())
        }
        let config_file = ConfigFile::load(&path).await?;
        Ok(Self {
            path: Some(path),
            config_file,
        })
    }

    /// Loads `explicit` if given. Otherwise loads the default config file if it exists, or falls
    /// back to the built-in defaults.
    pub async fn resolve(explicit: Option<&Path>) -> Res<Self> {
        if let Some(path) = explicit {
            debug!("Using the config file at {}", path.display());
            return Self::load(path).await;
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                debug!("Using the default config file at {}", path.display());
                Self::load(path).await
            }
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// `<config dir>/rollup/config.json`, when the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_JSON))
    }

    /// Overrides the policies of the config file, e.g. with command line flags.
    pub fn with_overrides(
        mut self,
        renumber: Option<RenumberMode>,
        malformed_amounts: Option<MalformedPolicy>,
    ) -> Self {
        if let Some(renumber) = renumber {
            self.config_file.renumber = renumber;
        }
        if let Some(malformed_amounts) = malformed_amounts {
            self.config_file.malformed_amounts = malformed_amounts;
        }
        self
    }

    /// The path the config was loaded from, `None` when using defaults.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn trees(&self) -> &[String] {
        &self.config_file.trees
    }

    pub fn renumber(&self) -> RenumberMode {
        self.config_file.renumber
    }

    pub fn malformed_amounts(&self) -> MalformedPolicy {
        self.config_file.malformed_amounts
    }

    pub fn thousands_separators(&self) -> bool {
        self.config_file.thousands_separators
    }

    /// The engine options described by this config.
    pub fn options(&self) -> Options {
        Options {
            renumber: self.renumber(),
            malformed_amounts: self.malformed_amounts(),
            format: AmountFormat::with_commas(self.thousands_separators()),
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "rollup",
///   "config_version": 1,
///   "trees": ["imported", "assigned"],
///   "renumber": "prefix",
///   "malformed_amounts": "zero",
///   "thousands_separators": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "rollup"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The trees to process, in order
    #[serde(default = "default_trees")]
    trees: Vec<String>,

    /// How category labels are renumbered
    #[serde(default)]
    renumber: RenumberMode,

    /// What to do with amounts that are not numbers
    #[serde(default)]
    malformed_amounts: MalformedPolicy,

    /// Whether totals are rendered with thousands separators
    #[serde(default)]
    thousands_separators: bool,
}

fn default_trees() -> Vec<String> {
    vec![IMPORTED.to_string(), ASSIGNED.to_string()]
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            trees: default_trees(),
            renumber: RenumberMode::default(),
            malformed_amounts: MalformedPolicy::default(),
            thousands_separators: false,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated
    pub async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Unsupported config_version {} in config file, the newest supported is {}",
            config.config_version,
            CONFIG_VERSION
        );
        anyhow::ensure!(
            !config.trees.is_empty(),
            "The config file must name at least one tree"
        );
        let mut seen = HashSet::new();
        if let Some(duplicate) = config.trees.iter().find(|tree| !seen.insert(tree.as_str())) {
            bail!("The tree '{duplicate}' is named more than once in the config file")
        }

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
