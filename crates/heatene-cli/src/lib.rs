//! HeatENE CLI library.
//!
//! Override discovery, subcommand handlers, terminal styling and output
//! formatting for the `heatene` binary.

pub mod commands;
pub mod config;
pub mod output;
pub mod terminal;
