//! `partbench part` command - part export and CSV import

use clap::Subcommand;
use console::style;
use csv::{ReaderBuilder, Writer};
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::cli::helpers::{build_header_map, get_field, truncate_str};
use crate::cli::GlobalOpts;
use crate::entities::{CategoryId, NewPart};

use super::{connect, load_config};

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// Export a category's parts to CSV (pk, name, description)
    Export(ExportArgs),

    /// Create parts in a category from a CSV file
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Category pk
    #[arg(long, short = 'c')]
    pub category: CategoryId,

    /// Output file (default: parts_<category>.csv)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file with name,description[,ipn,revision,keywords,link] columns
    pub file: PathBuf,

    /// Category pk the new parts belong to
    #[arg(long, short = 'c')]
    pub category: CategoryId,

    /// Validate CSV and report without creating anything
    #[arg(long)]
    pub dry_run: bool,

    /// Continue importing after errors (default: stop on first error)
    #[arg(long)]
    pub skip_errors: bool,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartCommands::Export(args) => export(args, global),
        PartCommands::Import(args) => import(args, global),
    }
}

fn export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let client = connect(&config)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("parts_{}.csv", args.category)));

    let parts = client
        .parts_in_category(args.category)
        .map_err(|e| miette::miette!("Failed to retrieve parts: {}", e))?;

    let mut writer = Writer::from_path(&output).into_diagnostic()?;
    writer
        .write_record(["pk", "name", "description"])
        .into_diagnostic()?;
    for part in &parts {
        writer
            .write_record([part.pk.to_string(), part.name.clone(), part.description.clone()])
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Exported {} part(s) to {}",
            style("✓").green(),
            parts.len(),
            output.display()
        );
    }
    Ok(())
}

fn import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let rows = read_parts(&args.file, args.category)?;

    if !global.quiet {
        println!(
            "{} {} part(s) to create in category {}:",
            style("→").blue(),
            rows.len(),
            args.category
        );
        for part in &rows {
            println!(
                "  - {} {}",
                part.name,
                style(truncate_str(&part.description, 60)).dim()
            );
        }
    }

    if args.dry_run {
        println!("{} Dry run, nothing created", style("○").dim());
        return Ok(());
    }
    if !args.yes {
        let proceed = Confirm::new()
            .with_prompt(format!("Create {} part(s)?", rows.len()))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !proceed {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let config = load_config(global);
    let client = connect(&config)?;

    let mut created = 0usize;
    let mut errors = 0usize;
    for part in &rows {
        match client.create_part(part) {
            Ok(new) => {
                created += 1;
                println!("{} Created {} (pk {})", style("✓").green(), new.name, new.pk);
            }
            Err(e) => {
                errors += 1;
                eprintln!("{} Failed to create {}: {}", style("✗").red(), part.name, e);
                if !args.skip_errors {
                    return Err(miette::miette!(
                        "Aborted after failing to create '{}': {}",
                        part.name,
                        e
                    ));
                }
            }
        }
    }

    if !global.quiet {
        println!("\n{} created, {} failed", style(created).green(), errors);
    }
    Ok(())
}

fn read_parts(path: &PathBuf, category: CategoryId) -> Result<Vec<NewPart>> {
    let file = File::open(path)
        .map_err(|e| miette::miette!("Cannot open {}: {}", path.display(), e))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);

    let mut parts = Vec::new();
    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        let record = result.into_diagnostic()?;

        let Some(name) = get_field(&record, &header_map, "name") else {
            return Err(miette::miette!(
                "{} row {}: missing required field 'name'",
                path.display(),
                row_num
            ));
        };

        let mut part = NewPart::new(
            name,
            get_field(&record, &header_map, "description").unwrap_or_default(),
            category,
        );
        part.ipn = get_field(&record, &header_map, "ipn");
        part.revision = get_field(&record, &header_map, "revision");
        part.keywords = get_field(&record, &header_map, "keywords");
        part.link = get_field(&record, &header_map, "link");
        parts.push(part);
    }

    if parts.is_empty() {
        return Err(miette::miette!("{}: no parts found", path.display()));
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_parts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import_list.csv");
        std::fs::write(
            &path,
            "name,description,IPN\nR_10kOhm_MF_SMD,10k 1% 0805,RES-0001\nR_22kOhm_MF_SMD,,\n",
        )
        .unwrap();

        let parts = read_parts(&path, CategoryId(81)).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "R_10kOhm_MF_SMD");
        assert_eq!(parts[0].ipn.as_deref(), Some("RES-0001"));
        assert_eq!(parts[0].category, CategoryId(81));
        assert_eq!(parts[1].description, "");
        assert!(parts[1].ipn.is_none());
    }

    #[test]
    fn test_read_parts_requires_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import_list.csv");
        std::fs::write(&path, "name,description\n,missing name\n").unwrap();
        assert!(read_parts(&path, CategoryId(81)).is_err());
    }
}
