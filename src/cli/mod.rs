//! Command-line interface for the couponly service.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Couponly - partner coupon session and claim service
#[derive(Parser)]
#[command(name = "couponly")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (skips the normal discovery order)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the widget API server
    #[command(alias = "daemon", alias = "-d")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}
