//! `partbench name` command - part-name convention checks

use clap::{Subcommand, ValueEnum};
use console::style;
use csv::Writer;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::truncate_str;
use crate::cli::GlobalOpts;
use crate::core::registry::CachedEnumerations;
use crate::core::{Config, NamingRule, RuleSet};
use crate::entities::{CategoryId, Part};

use super::{connect, load_config};

#[derive(Subcommand, Debug)]
pub enum NameCommands {
    /// Check every part name in a category against its naming rule
    Check(CheckArgs),
}

/// Built-in naming rules
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BuiltinRule {
    Resistor,
    Capacitor,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Category pk to check
    #[arg(long, short = 'c')]
    pub category: CategoryId,

    /// Built-in rule to apply (overridden by a rules-file entry for the category)
    #[arg(long, short = 'r')]
    pub rule: Option<BuiltinRule>,

    /// Export non-compliant parts to a CSV file for review and renaming
    #[arg(long, short = 'e')]
    pub export: Option<PathBuf>,

    /// Export every part, not just non-compliant ones
    #[arg(long)]
    pub all: bool,
}

pub fn run(cmd: NameCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        NameCommands::Check(args) => check(args, global),
    }
}

fn check(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let rule = resolve_rule(&args, &config)?;
    let client = connect(&config)?;

    let parts = client
        .parts_in_category(args.category)
        .map_err(|e| miette::miette!("Failed to retrieve parts in category {}: {}", args.category, e))?;

    if !global.quiet {
        println!(
            "{} Checking {} part(s) in category {}...\n",
            style("→").blue(),
            parts.len(),
            args.category
        );
    }

    // One snapshot of each selection list per run.
    let enumerations = CachedEnumerations::new(&client);

    let mut non_compliant: Vec<&Part> = Vec::new();
    for part in &parts {
        let verdict = rule.check(&part.name, &enumerations);
        if verdict.is_compliant() {
            if global.verbose {
                println!("{} {}", style("✓").green(), part.name);
            }
        } else {
            let position = verdict
                .first_failure()
                .map(|i| format!("position {}", i + 1))
                .unwrap_or_default();
            println!(
                "{} {} - fails at {}",
                style("✗").red(),
                style(&part.name).bold(),
                position
            );
            non_compliant.push(part);
        }
    }

    if !global.quiet {
        println!(
            "\n{} compliant, {} non-compliant of {} part(s)",
            style(parts.len() - non_compliant.len()).green(),
            style(non_compliant.len()).red(),
            parts.len()
        );
    }

    if let Some(path) = &args.export {
        let to_export: Vec<&Part> = if args.all {
            parts.iter().collect()
        } else {
            non_compliant.clone()
        };
        export_csv(path, &to_export)?;
        if !global.quiet {
            println!(
                "{} Exported {} part(s) to {}",
                style("✓").green(),
                to_export.len(),
                path.display()
            );
        }
    }

    Ok(())
}

/// A rules-file entry for the category wins; otherwise fall back to the
/// requested built-in rule.
fn resolve_rule(args: &CheckArgs, config: &Config) -> Result<NamingRule> {
    if let Some(path) = &config.rules_file {
        let rules = RuleSet::load(path).map_err(|e| miette::miette!("{}", e))?;
        if let Some(rule) = rules.get(args.category) {
            return Ok(rule.clone());
        }
    }

    match args.rule {
        Some(BuiltinRule::Resistor) => Ok(NamingRule::resistor()),
        Some(BuiltinRule::Capacitor) => Ok(NamingRule::capacitor()),
        None => Err(miette::miette!(
            "No naming rule for category {}: pass --rule resistor|capacitor or add the category to a rules file",
            args.category
        )),
    }
}

/// Review CSV: `pk,name,description,new_name`, the last column left empty
/// for the reviewer to fill in.
fn export_csv(path: &PathBuf, parts: &[&Part]) -> Result<()> {
    let mut writer = Writer::from_path(path).into_diagnostic()?;
    writer
        .write_record(["pk", "name", "description", "new_name"])
        .into_diagnostic()?;
    for part in parts {
        writer
            .write_record([
                part.pk.to_string(),
                part.name.clone(),
                truncate_str(&part.description, 200),
                String::new(),
            ])
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}
