//! Command handlers for the rollup CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod group;
mod init;
mod render;

use crate::error::Res;
use crate::model::ResultsPage;
use crate::utils;
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

pub use group::{group, GroupSummary};
pub use init::init;
pub use render::render;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data such as the `Report` of a roll-up pass.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Writes `page` as pretty JSON to `output`, or to stdout when there is no `output`.
async fn write_page(page: &ResultsPage, output: Option<&Path>) -> Res<()> {
    let json = serde_json::to_string_pretty(page).context("Unable to serialize the results page")?;
    match output {
        Some(path) => {
            utils::write(path, json).await?;
            debug!("Wrote the results page to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
