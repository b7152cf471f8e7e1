//! calengine binary support: CLI parsing, configuration, commands.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
