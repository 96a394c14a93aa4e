//! `partbench location` command - stock location management
//!
//! Supports single creation and the progressive-bin workflow: given a
//! prefix like `gb`, find the highest existing `gb_<n>` and create the
//! next `--count` numbered bins under a parent location.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::truncate_str;
use crate::cli::GlobalOpts;
use crate::core::InvenTreeClient;
use crate::entities::{NewStockLocation, StockLocation};

use super::{connect, load_config};

#[derive(Subcommand, Debug)]
pub enum LocationCommands {
    /// List stock locations
    List,

    /// Create one stock location
    Add(AddArgs),

    /// Create numbered <prefix>_<n> bins under a parent location
    Sequence(SequenceArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Location name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Location description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Parent location, by name or pk
    #[arg(long, short = 'p')]
    pub parent: Option<String>,

    /// Location type pk
    #[arg(long)]
    pub location_type: Option<i64>,
}

#[derive(clap::Args, Debug)]
pub struct SequenceArgs {
    /// Bin name prefix (bins are named <prefix>_<n>)
    #[arg(long)]
    pub prefix: String,

    /// How many bins to create
    #[arg(long, default_value_t = 1)]
    pub count: usize,

    /// Parent location, by name or pk
    #[arg(long, short = 'p')]
    pub parent: String,

    /// Description applied to every new bin
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Location type pk
    #[arg(long)]
    pub location_type: Option<i64>,

    /// Report what would be created without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(cmd: LocationCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        LocationCommands::List => list(global),
        LocationCommands::Add(args) => add(args, global),
        LocationCommands::Sequence(args) => sequence(args, global),
    }
}

fn list(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let client = connect(&config)?;
    let locations = client
        .stock_locations()
        .map_err(|e| miette::miette!("Failed to retrieve stock locations: {}", e))?;

    for location in &locations {
        println!(
            "{:>5}  {:<24} parent={:<6} {}",
            location.pk,
            truncate_str(&location.name, 24),
            location
                .parent
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            truncate_str(&location.description, 40)
        );
    }
    if !global.quiet {
        println!("\n{} location(s)", locations.len());
    }
    Ok(())
}

fn add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let client = connect(&config)?;

    let parent = match &args.parent {
        Some(parent) => Some(resolve_parent(&client, parent)?),
        None => None,
    };

    let created = client
        .create_stock_location(&NewStockLocation {
            name: args.name,
            description: args.description,
            parent,
            location_type: args.location_type,
        })
        .map_err(|e| miette::miette!("Failed to create stock location: {}", e))?;

    if !global.quiet {
        println!(
            "{} Created location '{}' (pk {})",
            style("✓").green(),
            created.name,
            created.pk
        );
    }
    Ok(())
}

fn sequence(args: SequenceArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let client = connect(&config)?;

    let locations = client
        .stock_locations()
        .map_err(|e| miette::miette!("Failed to retrieve stock locations: {}", e))?;
    let parent = resolve_parent_in(&locations, &args.parent)?;
    let start = highest_sequence_number(&locations, &args.prefix) + 1;

    for n in start..start + args.count as u64 {
        let name = format!("{}_{}", args.prefix, n);
        if args.dry_run {
            println!(
                "{} Would create '{}' under parent {}",
                style("○").dim(),
                name,
                parent
            );
            continue;
        }
        match client.create_stock_location(&NewStockLocation {
            name: name.clone(),
            description: args.description.clone(),
            parent: Some(parent),
            location_type: args.location_type,
        }) {
            Ok(created) => println!(
                "{} Created '{}' (pk {})",
                style("✓").green(),
                created.name,
                created.pk
            ),
            Err(e) => println!("{} Failed to create '{}': {}", style("✗").red(), name, e),
        }
    }
    Ok(())
}

fn resolve_parent(client: &InvenTreeClient, parent: &str) -> Result<i64> {
    if let Ok(pk) = parent.parse::<i64>() {
        return Ok(pk);
    }
    let locations = client
        .stock_locations()
        .map_err(|e| miette::miette!("Failed to retrieve stock locations: {}", e))?;
    resolve_parent_in(&locations, parent)
}

fn resolve_parent_in(locations: &[StockLocation], parent: &str) -> Result<i64> {
    if let Ok(pk) = parent.parse::<i64>() {
        return Ok(pk);
    }
    locations
        .iter()
        .find(|l| l.name == parent)
        .map(|l| l.pk)
        .ok_or_else(|| miette::miette!("No stock location named '{}'", parent))
}

/// Highest <prefix>_<n> already taken, 0 when none exist
fn highest_sequence_number(locations: &[StockLocation], prefix: &str) -> u64 {
    let lead = format!("{}_", prefix);
    locations
        .iter()
        .filter_map(|l| l.name.strip_prefix(&lead))
        .filter_map(|rest| rest.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(pk: i64, name: &str) -> StockLocation {
        StockLocation {
            pk,
            name: name.to_string(),
            description: String::new(),
            parent: None,
            location_type: None,
        }
    }

    #[test]
    fn test_highest_sequence_number() {
        let locations = vec![
            location(1, "gb_1"),
            location(2, "gb_7"),
            location(3, "gb_3"),
            location(4, "shelf_9"),
            location(5, "gb_x"),
        ];
        assert_eq!(highest_sequence_number(&locations, "gb"), 7);
        assert_eq!(highest_sequence_number(&locations, "shelf"), 9);
        assert_eq!(highest_sequence_number(&locations, "bin"), 0);
    }

    #[test]
    fn test_resolve_parent_by_name_or_pk() {
        let locations = vec![location(12, "boxes")];
        assert_eq!(resolve_parent_in(&locations, "boxes").unwrap(), 12);
        assert_eq!(resolve_parent_in(&locations, "44").unwrap(), 44);
        assert!(resolve_parent_in(&locations, "missing").is_err());
    }
}
