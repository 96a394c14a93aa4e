//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    location::LocationCommands, name::NameCommands, param::ParamCommands, part::PartCommands,
    selection::SelectionCommands,
};

#[derive(Parser)]
#[command(name = "partbench")]
#[command(author, version, about = "InvenTree parts-maintenance toolkit")]
#[command(
    long_about = "A command-line toolkit for keeping an InvenTree parts inventory tidy: part-name convention checks, category parameter normalization, parameter matrix CSV round-trips, selection lists, and stock locations."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// InvenTree API root, e.g. https://inventory.example.com/api/
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// API token (prefer the INVENTREE_API_TOKEN environment variable)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Naming rules file (YAML, keyed by category pk)
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Part-name convention checks
    #[command(subcommand)]
    Name(NameCommands),

    /// Category parameter matrix: export, validate, normalize, apply
    #[command(subcommand)]
    Param(ParamCommands),

    /// Selection list maintenance (controlled vocabularies)
    #[command(subcommand)]
    Selection(SelectionCommands),

    /// Part export and CSV import
    #[command(subcommand)]
    Part(PartCommands),

    /// Stock location management
    #[command(subcommand)]
    Location(LocationCommands),
}
