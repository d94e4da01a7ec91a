// src/cli.rs
//! CLI definitions for the rebundle converter
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rebundle")]
#[command(version)]
#[command(about = "Convert TextMate bundles into Pulsar package layouts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a TextMate bundle into a Pulsar package
    Convert {
        /// Bundle directory, or URL of a hosted bundle repository
        source: String,

        /// Directory to write the converted package into
        destination: PathBuf,
    },
}
