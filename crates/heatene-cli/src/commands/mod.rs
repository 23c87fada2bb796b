//! Subcommand handlers. `main.rs` parses arguments and dispatches here.

pub mod defaults;
pub mod estimate;
pub mod products;
pub mod quick;
