//! CLI subcommands.

pub mod account;
pub mod migrate;
