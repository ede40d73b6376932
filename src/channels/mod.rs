//! Interactive surfaces for the wizard.

pub mod cli;

pub use cli::{CliCommand, parse_input};
