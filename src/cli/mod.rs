//! CLI subcommand implementations for the goatherd binary.

pub mod doctor;
pub mod fetch_cmd;
pub mod output;
