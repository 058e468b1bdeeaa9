//! keycalc CLI library
//!
//! Terminal presentation layer for the keycalc engine: argument parsing,
//! configuration loading, rendering and the interactive session.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
mod output;
pub mod session;

pub use commands::{Cli, ColorArg, Commands, OutputFormatArg, ReplArgs, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, Renderer};
pub use session::{LineOutcome, Session};
