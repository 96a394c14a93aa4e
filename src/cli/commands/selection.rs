//! `partbench selection` command - selection list maintenance
//!
//! Selection lists are the controlled vocabularies that constrain both
//! parameter values and name tokens. Choices are authored in a CSV with
//! `Value,Label,Description` columns, reviewed with `--dry-run`, and
//! pushed with create/update.

use clap::Subcommand;
use console::style;
use csv::ReaderBuilder;
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::cli::helpers::{build_header_map, get_field, truncate_str};
use crate::cli::GlobalOpts;
use crate::entities::{SelectionListChoice, SelectionListId, SelectionListPayload};

use super::{connect, load_config};

#[derive(Subcommand, Debug)]
pub enum SelectionCommands {
    /// List selection lists on the server
    List,

    /// Show one selection list with its choices
    Show(ShowArgs),

    /// Create a selection list from a choices CSV
    Create(CreateArgs),

    /// Append choices from a CSV to an existing selection list
    Update(UpdateArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Selection list pk
    pub id: SelectionListId,
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Name of the new selection list
    #[arg(long, short = 'n')]
    pub name: String,

    /// Description of the new selection list
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Choices CSV with Value,Label,Description columns
    #[arg(long, short = 'f')]
    pub from: PathBuf,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Report what would be created without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Selection list pk to append to
    pub id: SelectionListId,

    /// Choices CSV with Value,Label,Description columns
    #[arg(long, short = 'f')]
    pub from: PathBuf,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Report what would be added without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(cmd: SelectionCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SelectionCommands::List => list(global),
        SelectionCommands::Show(args) => show(args, global),
        SelectionCommands::Create(args) => create(args, global),
        SelectionCommands::Update(args) => update(args, global),
    }
}

fn list(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let client = connect(&config)?;
    let lists = client
        .selection_lists()
        .map_err(|e| miette::miette!("Failed to retrieve selection lists: {}", e))?;

    for l in &lists {
        println!(
            "{:>5}  {:<30} {:>3} choice(s)  {}",
            l.pk,
            truncate_str(&l.name, 30),
            l.choices.len(),
            if l.active { "" } else { "(inactive)" }
        );
    }
    if !global.quiet {
        println!("\n{} selection list(s)", lists.len());
    }
    Ok(())
}

fn show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let client = connect(&config)?;
    let list = client
        .selection_list(args.id)
        .map_err(|e| miette::miette!("Failed to retrieve selection list {}: {}", args.id, e))?;

    println!("{} ({})", style(&list.name).bold(), list.pk);
    if !list.description.is_empty() {
        println!("{}", list.description);
    }
    println!();
    for choice in &list.choices {
        println!(
            "  {:<16} {:<24} {}",
            choice.value,
            truncate_str(&choice.label, 24),
            truncate_str(&choice.description, 40)
        );
    }
    Ok(())
}

fn create(args: CreateArgs, global: &GlobalOpts) -> Result<()> {
    let choices = read_choices(&args.from)?;

    if !global.quiet {
        println!(
            "{} Selection list '{}' with {} choice(s):",
            style("→").blue(),
            args.name,
            choices.len()
        );
        print_choices(&choices);
    }

    if args.dry_run {
        println!("{} Dry run, nothing created", style("○").dim());
        return Ok(());
    }
    if !args.yes && !confirm("Create this selection list?")? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let config = load_config(global);
    let client = connect(&config)?;
    let created = client
        .create_selection_list(&SelectionListPayload {
            name: args.name,
            description: args.description,
            active: true,
            choices,
        })
        .map_err(|e| miette::miette!("Failed to create selection list: {}", e))?;

    println!(
        "{} Created selection list '{}' (pk {})",
        style("✓").green(),
        created.name,
        created.pk
    );
    Ok(())
}

fn update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let new_choices = read_choices(&args.from)?;

    if !global.quiet {
        println!(
            "{} {} new choice(s) for selection list {}:",
            style("→").blue(),
            new_choices.len(),
            args.id
        );
        print_choices(&new_choices);
    }

    if args.dry_run {
        println!("{} Dry run, nothing updated", style("○").dim());
        return Ok(());
    }
    if !args.yes && !confirm("Append these choices?")? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let config = load_config(global);
    let client = connect(&config)?;

    // Append: the PUT replaces the whole choice set, so re-read the current
    // list immediately before writing.
    let existing = client
        .selection_list(args.id)
        .map_err(|e| miette::miette!("Failed to retrieve selection list {}: {}", args.id, e))?;

    let mut choices = existing.choices.clone();
    choices.extend(new_choices);

    let updated = client
        .update_selection_list(
            args.id,
            &SelectionListPayload {
                name: existing.name,
                description: existing.description,
                active: existing.active,
                choices,
            },
        )
        .map_err(|e| miette::miette!("Failed to update selection list {}: {}", args.id, e))?;

    println!(
        "{} Selection list '{}' now has {} choice(s)",
        style("✓").green(),
        updated.name,
        updated.choices.len()
    );
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

fn print_choices(choices: &[SelectionListChoice]) {
    for choice in choices {
        println!(
            "  - Value: {}, Label: {}, Description: {}",
            choice.value, choice.label, choice.description
        );
    }
}

/// Read choices from a `Value,Label,Description` CSV (headers matched
/// case-insensitively; label and description may be omitted)
fn read_choices(path: &PathBuf) -> Result<Vec<SelectionListChoice>> {
    let file = File::open(path)
        .map_err(|e| miette::miette!("Cannot open {}: {}", path.display(), e))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);
    if !header_map.contains_key("value") {
        return Err(miette::miette!(
            "{}: missing required 'Value' column",
            path.display()
        ));
    }

    let mut choices = Vec::new();
    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        let record = result.into_diagnostic()?;

        let Some(value) = get_field(&record, &header_map, "value") else {
            return Err(miette::miette!(
                "{} row {}: empty 'Value' cell",
                path.display(),
                row_num
            ));
        };

        choices.push(SelectionListChoice {
            value,
            label: get_field(&record, &header_map, "label").unwrap_or_default(),
            description: get_field(&record, &header_map, "description").unwrap_or_default(),
            active: true,
        });
    }

    if choices.is_empty() {
        return Err(miette::miette!("{}: no choices found", path.display()));
    }
    Ok(choices)
}
