pub mod args;
pub mod commands;
mod config;
pub mod engine;
mod error;
pub mod model;
mod utils;


pub use config::Config;
pub use error::{Error, ErrorType, Result};
