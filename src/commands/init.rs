use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::{anyhow, Context};
use std::path::Path;

/// Writes a `config.json` holding the default settings.
///
/// # Arguments
/// - `path` - Where to write the file. When `None`, the default location in the platform's config
///   directory is used.
/// - `force` - Overwrite the file if it already exists.
///
/// # Errors
/// - Returns an error if the file exists and `force` is false.
/// - Returns an error if there is no `path` and the platform has no config directory.
/// - Returns an error if any file operations fail.
pub async fn init(path: Option<&Path>, force: bool) -> Result<Out<()>> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path()
            .ok_or_else(|| anyhow!("Unable to find the config directory, use --config"))
            .pub_result(ErrorType::Config)?,
    };
    let config = Config::create(&path, force)
        .await
        .context("Unable to create the config file")
        .pub_result(ErrorType::Config)?;
    let written = config.path().unwrap_or(path.as_path());
    Ok(format!("Successfully created the config file at {}", written.display()).into())
}
