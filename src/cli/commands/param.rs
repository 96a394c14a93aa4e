//! `partbench param` command - category parameter matrix workflow
//!
//! The workflow mirrors how the inventory has always been maintained:
//! export the category's parameter matrix to CSV, edit it in a
//! spreadsheet, validate the edited file against the server's selection
//! lists, normalize missing parameters onto parts, then apply the edited
//! values back.

use clap::Subcommand;
use console::style;
use csv::{ReaderBuilder, Writer};
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::cli::helpers::parse_strict_bool;
use crate::cli::GlobalOpts;
use crate::core::{normalize, InvenTreeClient, NormalizeOptions, NormalizeOutcome};
use crate::entities::{CategoryId, ColumnKey, PartId, SelectionListId};

use super::{connect, load_config};

#[derive(Subcommand, Debug)]
pub enum ParamCommands {
    /// Export the category's parameter matrix to CSV
    Export(ExportArgs),

    /// Validate an edited matrix CSV against selection lists and checkbox types
    Validate(FileArgs),

    /// Back-fill missing template parameters with their defaults
    Normalize(NormalizeArgs),

    /// Push edited matrix values back to the server
    Apply(ApplyArgs),
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Category pk
    #[arg(long, short = 'c')]
    pub category: CategoryId,

    /// Output file (default: <category>.csv)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct FileArgs {
    /// Category pk
    #[arg(long, short = 'c')]
    pub category: CategoryId,

    /// Matrix CSV file (default: <category>.csv)
    pub file: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct NormalizeArgs {
    /// Category pk
    #[arg(long, short = 'c')]
    pub category: CategoryId,

    /// Report what would be written without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args, Debug)]
pub struct ApplyArgs {
    /// Category pk
    #[arg(long, short = 'c')]
    pub category: CategoryId,

    /// Matrix CSV file (default: <category>.csv)
    pub file: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Report what would be updated without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(cmd: ParamCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ParamCommands::Export(args) => export(args, global),
        ParamCommands::Validate(args) => validate(args, global),
        ParamCommands::Normalize(args) => run_normalize(args, global),
        ParamCommands::Apply(args) => apply(args, global),
    }
}

/// One data row of a matrix CSV
#[derive(Debug, Clone)]
struct MatrixRow {
    part: PartId,
    part_name: String,
    /// One value per parameter column, in header order
    values: Vec<String>,
}

/// A single invalid cell
#[derive(Debug, Clone, PartialEq, Eq)]
struct CellError {
    part: PartId,
    template_name: String,
    value: String,
    reason: &'static str,
}

impl std::fmt::Display for CellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Part pk: {}, Parameter template: {}, Value: {} - {}",
            self.part, self.template_name, self.value, self.reason
        )
    }
}

fn default_file(category: CategoryId) -> PathBuf {
    PathBuf::from(format!("{}.csv", category))
}

// --- export ---

fn export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let client = connect(&config)?;
    let output = args.output.unwrap_or_else(|| default_file(args.category));

    let templates = client
        .category_templates(args.category)
        .map_err(|e| miette::miette!("Failed to retrieve parameter templates: {}", e))?;
    let parts = client
        .parts_in_category(args.category)
        .map_err(|e| miette::miette!("Failed to retrieve parts: {}", e))?;

    let keys: Vec<ColumnKey> = templates.iter().map(ColumnKey::for_template).collect();

    let mut writer = Writer::from_path(&output).into_diagnostic()?;
    let mut header = vec!["part name".to_string(), "part pk".to_string()];
    header.extend(keys.iter().map(|k| k.to_string()));
    writer.write_record(&header).into_diagnostic()?;

    let mut fetch_failures = 0usize;
    for part in &parts {
        let mut row = vec![part.name.clone(), part.pk.to_string()];
        match client.part_parameters(part.pk) {
            Ok(current) => {
                for template in &templates {
                    let value = current
                        .iter()
                        .find(|p| p.template == template.template)
                        .map(|p| p.data.clone())
                        .unwrap_or_default();
                    row.push(value);
                }
            }
            Err(e) => {
                // Keep the row so the part stays visible in the sheet.
                eprintln!(
                    "{} Failed to retrieve parameters for part {}: {}",
                    style("✗").red(),
                    part.pk,
                    e
                );
                fetch_failures += 1;
                row.extend((0..templates.len()).map(|_| String::new()));
            }
        }
        writer.write_record(&row).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Wrote {} part(s) x {} parameter(s) to {}",
            style("✓").green(),
            parts.len(),
            templates.len(),
            output.display()
        );
        if fetch_failures > 0 {
            println!(
                "{} {} part(s) exported without values (fetch failed)",
                style("!").yellow(),
                fetch_failures
            );
        }
    }
    Ok(())
}

// --- validate ---

fn validate(args: FileArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let client = connect(&config)?;
    let file = args.file.unwrap_or_else(|| default_file(args.category));

    let (keys, rows) = read_matrix(&file)?;
    let selections = fetch_selection_map(&client)?;

    let errors = validate_matrix(&keys, &rows, &selections);

    if !global.quiet {
        println!(
            "{} Validated {} row(s) x {} parameter column(s)",
            style("→").blue(),
            rows.len(),
            keys.len()
        );
    }

    if errors.is_empty() {
        println!("{} All data in {} is valid", style("✓").green(), file.display());
        Ok(())
    } else {
        for error in &errors {
            println!("{} {}", style("✗").red(), error);
        }
        Err(miette::miette!(
            "{} invalid cell(s) in {}",
            errors.len(),
            file.display()
        ))
    }
}

fn fetch_selection_map(
    client: &InvenTreeClient,
) -> Result<BTreeMap<SelectionListId, BTreeSet<String>>> {
    let lists = client
        .selection_lists()
        .map_err(|e| miette::miette!("Failed to retrieve selection lists: {}", e))?;
    Ok(lists
        .into_iter()
        .map(|l| (l.pk, l.choices.into_iter().map(|c| c.value).collect()))
        .collect())
}

/// Check every cell of the matrix against its column's constraints
fn validate_matrix(
    keys: &[ColumnKey],
    rows: &[MatrixRow],
    selections: &BTreeMap<SelectionListId, BTreeSet<String>>,
) -> Vec<CellError> {
    let mut errors = Vec::new();
    for row in rows {
        for (key, value) in keys.iter().zip(&row.values) {
            if let Some(list) = key.selection_list {
                let allowed = selections.get(&list);
                if !allowed.is_some_and(|values| values.contains(value)) {
                    errors.push(CellError {
                        part: row.part,
                        template_name: key.name.clone(),
                        value: value.clone(),
                        reason: "Invalid selection list value.",
                    });
                }
            }
            if key.checkbox && parse_strict_bool(value).is_none() {
                errors.push(CellError {
                    part: row.part,
                    template_name: key.name.clone(),
                    value: value.clone(),
                    reason: "Invalid boolean value.",
                });
            }
        }
    }
    errors
}

/// Parse a matrix CSV: `part name, part pk, <name%id%selection%checkbox>...`
fn read_matrix(path: &PathBuf) -> Result<(Vec<ColumnKey>, Vec<MatrixRow>)> {
    let file = File::open(path)
        .map_err(|e| miette::miette!("Cannot open {}: {}", path.display(), e))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = rdr.headers().into_diagnostic()?.clone();
    if headers.len() < 2 {
        return Err(miette::miette!(
            "{}: expected at least 'part name' and 'part pk' columns",
            path.display()
        ));
    }

    let keys: Vec<ColumnKey> = headers
        .iter()
        .skip(2)
        .map(|h| {
            h.parse::<ColumnKey>()
                .map_err(|e| miette::miette!("{}: {}", path.display(), e))
        })
        .collect::<Result<_>>()?;

    let mut rows = Vec::new();
    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        let record = result.into_diagnostic()?;

        let part_name = record.get(0).unwrap_or_default().to_string();
        let part = record
            .get(1)
            .unwrap_or_default()
            .parse::<PartId>()
            .map_err(|e| miette::miette!("Row {}: {}", row_num, e))?;

        if record.len() > keys.len() + 2 {
            eprintln!(
                "{} Row {}: {} cell(s) beyond the {} parameter column(s) ignored",
                style("!").yellow(),
                row_num,
                record.len() - 2 - keys.len(),
                keys.len()
            );
        }

        let mut values: Vec<String> = record
            .iter()
            .skip(2)
            .map(|v| v.to_string())
            .collect();
        values.resize(keys.len(), String::new());

        rows.push(MatrixRow {
            part,
            part_name,
            values,
        });
    }

    Ok((keys, rows))
}

// --- normalize ---

fn run_normalize(args: NormalizeArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let client = connect(&config)?;

    let templates = client
        .category_templates(args.category)
        .map_err(|e| miette::miette!("Failed to retrieve parameter templates: {}", e))?;
    let parts = client
        .parts_in_category(args.category)
        .map_err(|e| miette::miette!("Failed to retrieve parts: {}", e))?;

    if templates.is_empty() {
        println!(
            "{} Category {} has no parameter templates; nothing to normalize",
            style("○").dim(),
            args.category
        );
        return Ok(());
    }

    if !global.quiet {
        println!(
            "{} Normalizing {} part(s) against {} template(s) in category {}...\n",
            style("→").blue(),
            parts.len(),
            templates.len(),
            args.category
        );
    }

    let report = normalize(
        &templates,
        &parts,
        &client,
        NormalizeOptions {
            dry_run: args.dry_run,
        },
    );

    if global.verbose || args.dry_run {
        for entry in &report.entries {
            if matches!(entry.outcome, NormalizeOutcome::Applied) {
                let glyph = if args.dry_run { style("○").dim() } else { style("✓").green() };
                let default = templates
                    .iter()
                    .find(|t| t.template == entry.template)
                    .map(|t| t.default_value.as_str())
                    .unwrap_or_default();
                println!(
                    "{} {} ({}): {} = {}",
                    glyph, entry.part_name, entry.part, entry.template_name, default
                );
            }
        }
    }

    for (part, error) in &report.part_failures {
        println!("{} Part {} skipped: {}", style("✗").red(), part, error);
    }
    for failure in report.failures() {
        if let NormalizeOutcome::Failed(reason) = &failure.outcome {
            println!(
                "{} {} ({}): {} - {}",
                style("✗").red(),
                failure.part_name,
                failure.part,
                failure.template_name,
                reason
            );
        }
    }

    let verb = if args.dry_run { "would apply" } else { "applied" };
    println!(
        "\n{} {}, {} already present, {} failed, {} part(s) skipped",
        style(report.applied()).green(),
        verb,
        report.already_present(),
        report.failed(),
        report.part_failures.len()
    );
    Ok(())
}

// --- apply ---

fn apply(args: ApplyArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let client = connect(&config)?;
    let file = args.file.unwrap_or_else(|| default_file(args.category));

    let (keys, rows) = read_matrix(&file)?;
    let total_cells = rows.len() * keys.len();

    if !args.dry_run && !args.yes {
        let proceed = Confirm::new()
            .with_prompt(format!(
                "Update {} parameter value(s) across {} part(s) from {}?",
                total_cells,
                rows.len(),
                file.display()
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !proceed {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let mut updated = 0usize;
    let mut missing = 0usize;
    let mut failed = 0usize;

    for row in &rows {
        for (key, value) in keys.iter().zip(&row.values) {
            if args.dry_run {
                println!(
                    "{} Would update part {} {} = {}",
                    style("○").dim(),
                    row.part,
                    key.name,
                    value
                );
                continue;
            }

            // Update-only: a value for a parameter the part does not carry
            // yet is a normalize concern, not an apply concern.
            match client.part_parameter(row.part, key.template) {
                Ok(Some(existing)) => {
                    match client.update_part_parameter(existing.pk, row.part, key.template, value) {
                        Ok(_) => {
                            updated += 1;
                            if global.verbose {
                                println!(
                                    "{} {} ({}): {} = {}",
                                    style("✓").green(),
                                    row.part_name,
                                    row.part,
                                    key.name,
                                    value
                                );
                            }
                        }
                        Err(e) => {
                            failed += 1;
                            println!(
                                "{} Failed to update part {} {}: {}",
                                style("✗").red(),
                                row.part,
                                key.name,
                                e
                            );
                        }
                    }
                }
                Ok(None) => {
                    missing += 1;
                    println!(
                        "{} No existing parameter for part {} {}; run `partbench param normalize` first",
                        style("!").yellow(),
                        row.part,
                        key.name
                    );
                }
                Err(e) => {
                    failed += 1;
                    println!(
                        "{} Failed to look up part {} {}: {}",
                        style("✗").red(),
                        row.part,
                        key.name,
                        e
                    );
                }
            }
        }
    }

    if !args.dry_run && !global.quiet {
        println!(
            "\n{} updated, {} missing, {} failed",
            style(updated).green(),
            missing,
            style(failed).red()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TemplateId;

    fn keys() -> Vec<ColumnKey> {
        vec![
            ColumnKey {
                name: "Type".to_string(),
                template: TemplateId(1),
                selection_list: Some(SelectionListId(15)),
                checkbox: false,
            },
            ColumnKey {
                name: "RoHS".to_string(),
                template: TemplateId(2),
                selection_list: None,
                checkbox: true,
            },
        ]
    }

    fn selections() -> BTreeMap<SelectionListId, BTreeSet<String>> {
        let mut map = BTreeMap::new();
        map.insert(
            SelectionListId(15),
            ["MF", "CF"].iter().map(|s| s.to_string()).collect(),
        );
        map
    }

    fn row(part: i64, values: &[&str]) -> MatrixRow {
        MatrixRow {
            part: PartId(part),
            part_name: format!("part-{}", part),
            values: values.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_valid_matrix_has_no_errors() {
        let rows = vec![row(1, &["MF", "true"]), row(2, &["CF", "FALSE"])];
        assert!(validate_matrix(&keys(), &rows, &selections()).is_empty());
    }

    #[test]
    fn test_invalid_selection_value_is_reported() {
        let rows = vec![row(1, &["XX", "true"])];
        let errors = validate_matrix(&keys(), &rows, &selections());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].part, PartId(1));
        assert_eq!(errors[0].template_name, "Type");
        assert_eq!(errors[0].reason, "Invalid selection list value.");
    }

    #[test]
    fn test_invalid_boolean_is_reported() {
        let rows = vec![row(1, &["MF", "yes"])];
        let errors = validate_matrix(&keys(), &rows, &selections());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].template_name, "RoHS");
        assert_eq!(errors[0].reason, "Invalid boolean value.");
    }

    #[test]
    fn test_unknown_selection_list_rejects_all_values() {
        let rows = vec![row(1, &["MF", "true"])];
        let errors = validate_matrix(&keys(), &rows, &BTreeMap::new());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].template_name, "Type");
    }

    #[test]
    fn test_read_matrix_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("81.csv");
        std::fs::write(
            &path,
            "part name,part pk,Type%1%15%False,RoHS%2%False%True\n\
             R_10kOhm_MF_SMD,10,MF,true\n\
             R_22kOhm_CF_TH,11,CF,false\n",
        )
        .unwrap();

        let (keys, rows) = read_matrix(&path).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].selection_list, Some(SelectionListId(15)));
        assert!(keys[1].checkbox);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].part, PartId(10));
        assert_eq!(rows[0].part_name, "R_10kOhm_MF_SMD");
        assert_eq!(rows[1].values, vec!["CF".to_string(), "false".to_string()]);
    }

    #[test]
    fn test_read_matrix_pads_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("81.csv");
        std::fs::write(
            &path,
            "part name,part pk,Type%1%15%False,RoHS%2%False%True\nR_10kOhm_MF_SMD,10,MF\n",
        )
        .unwrap();

        let (_, rows) = read_matrix(&path).unwrap();
        assert_eq!(rows[0].values, vec!["MF".to_string(), String::new()]);
    }

    #[test]
    fn test_read_matrix_ignores_extra_cells_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("81.csv");
        std::fs::write(
            &path,
            "part name,part pk,Type%1%15%False,RoHS%2%False%True\n\
             R_10kOhm_MF_SMD,10,MF,true,stray,cells\n",
        )
        .unwrap();

        let (_, rows) = read_matrix(&path).unwrap();
        assert_eq!(rows[0].values, vec!["MF".to_string(), "true".to_string()]);
    }

    #[test]
    fn test_read_matrix_rejects_bad_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("81.csv");
        std::fs::write(&path, "part name,part pk,NotAColumnKey\nx,10,y\n").unwrap();
        assert!(read_matrix(&path).is_err());
    }
}
