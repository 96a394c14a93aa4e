//! Category parameter normalization
//!
//! For every part in a category, diff the category's parameter templates
//! against the part's current assignments and back-fill the default value
//! for each missing template. Existing assignments are never touched, so
//! a rerun against unchanged data performs zero writes.

use crate::core::registry::ParameterStore;
use crate::entities::{ParameterTemplate, Part, PartId, TemplateId};

/// Options for one normalization run
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    /// Report what would be written without calling the store
    pub dry_run: bool,
}

/// Outcome for one (part, template) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// Default value written (or would be, under dry-run)
    Applied,
    /// An assignment already existed; left untouched
    AlreadyPresent,
    /// The write failed; siblings were still processed
    Failed(String),
}

/// Itemized outcome for one (part, template) pair
#[derive(Debug, Clone)]
pub struct NormalizeEntry {
    pub part: PartId,
    pub part_name: String,
    pub template: TemplateId,
    pub template_name: String,
    pub outcome: NormalizeOutcome,
}

/// Aggregated result of one normalization run
#[derive(Debug, Default)]
pub struct NormalizeReport {
    pub entries: Vec<NormalizeEntry>,

    /// Parts skipped because their assignment fetch failed
    pub part_failures: Vec<(PartId, String)>,

    pub dry_run: bool,
}

impl NormalizeReport {
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, NormalizeOutcome::Applied))
    }

    pub fn already_present(&self) -> usize {
        self.count(|o| matches!(o, NormalizeOutcome::AlreadyPresent))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, NormalizeOutcome::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = &NormalizeEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, NormalizeOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&NormalizeOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.outcome)).count()
    }
}

/// Back-fill missing template parameters for each part
///
/// Parts are processed strictly in input order, templates in their input
/// order within each part. A failed assignment fetch records a per-part
/// failure and moves on; a failed write records a per-pair failure and
/// moves on. Nothing aborts the batch.
pub fn normalize(
    templates: &[ParameterTemplate],
    parts: &[Part],
    store: &dyn ParameterStore,
    options: NormalizeOptions,
) -> NormalizeReport {
    let mut report = NormalizeReport {
        dry_run: options.dry_run,
        ..Default::default()
    };

    for part in parts {
        let current = match store.assignments_for_part(part.pk) {
            Ok(current) => current,
            Err(e) => {
                report.part_failures.push((part.pk, e.to_string()));
                continue;
            }
        };

        for template in templates {
            let outcome = if current.iter().any(|a| a.template == template.template) {
                NormalizeOutcome::AlreadyPresent
            } else if options.dry_run {
                NormalizeOutcome::Applied
            } else {
                match store.create_assignment(part.pk, template.template, &template.default_value) {
                    Ok(()) => NormalizeOutcome::Applied,
                    Err(e) => NormalizeOutcome::Failed(e.to_string()),
                }
            };

            report.entries.push(NormalizeEntry {
                part: part.pk,
                part_name: part.name.clone(),
                template: template.template,
                template_name: template.name.clone(),
                outcome,
            });
        }
    }

    report
}
