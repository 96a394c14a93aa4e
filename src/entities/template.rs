//! Parameter templates and per-part parameter values
//!
//! A category owns a set of parameter templates; each part in the category
//! should carry one value per template. The `ColumnKey` type preserves the
//! `%`-separated header encoding used by previously exported matrix CSVs,
//! so old files keep re-importing.

use serde::{Deserialize, Serialize};

use crate::entities::part::PartId;
use crate::entities::selection::SelectionListId;

/// Server-assigned primary key of a parameter template
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TemplateId(pub i64);

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(TemplateId)
            .map_err(|_| format!("Invalid template pk: {}", s))
    }
}

/// A category-scoped parameter definition with its default value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterTemplate {
    pub template: TemplateId,
    pub name: String,

    #[serde(default)]
    pub default_value: String,

    /// Selection list constraining this parameter's values, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_list: Option<SelectionListId>,

    /// Boolean-typed parameter (rendered as a checkbox by InvenTree)
    #[serde(default)]
    pub checkbox: bool,
}

/// A parameter value assigned to one part, as returned by `GET part/parameter/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterValue {
    pub pk: i64,
    pub part: PartId,
    pub template: TemplateId,

    #[serde(default)]
    pub data: String,
}

/// Matrix CSV column header: `{name}%{templateId}%{selectionIdOrFalse}%{isBoolean}`
///
/// The `False` literal (capitalized) marks the absence of a selection list,
/// matching the encoding of existing exports byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnKey {
    pub name: String,
    pub template: TemplateId,
    pub selection_list: Option<SelectionListId>,
    pub checkbox: bool,
}

impl ColumnKey {
    pub fn for_template(template: &ParameterTemplate) -> Self {
        Self {
            name: template.name.clone(),
            template: template.template,
            selection_list: template.selection_list,
            checkbox: template.checkbox,
        }
    }
}

impl std::fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let selection = match self.selection_list {
            Some(id) => id.to_string(),
            None => "False".to_string(),
        };
        let checkbox = if self.checkbox { "True" } else { "False" };
        write!(f, "{}%{}%{}%{}", self.name, self.template, selection, checkbox)
    }
}

impl std::str::FromStr for ColumnKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('%').collect();
        if fields.len() != 4 {
            return Err(format!(
                "Invalid parameter column '{}': expected name%template%selection%checkbox",
                s
            ));
        }

        let template = fields[1].parse::<TemplateId>()?;
        let selection_list = match fields[2] {
            "False" | "" => None,
            other => Some(other.parse::<SelectionListId>()?),
        };
        let checkbox = match fields[3] {
            "True" => true,
            "False" => false,
            other => return Err(format!("Invalid checkbox flag '{}' in column '{}'", other, s)),
        };

        Ok(Self {
            name: fields[0].to_string(),
            template,
            selection_list,
            checkbox,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_key_encoding_matches_legacy_exports() {
        let key = ColumnKey {
            name: "Tolerance".to_string(),
            template: TemplateId(12),
            selection_list: Some(SelectionListId(9)),
            checkbox: false,
        };
        assert_eq!(key.to_string(), "Tolerance%12%9%False");

        let key = ColumnKey {
            name: "RoHS".to_string(),
            template: TemplateId(4),
            selection_list: None,
            checkbox: true,
        };
        assert_eq!(key.to_string(), "RoHS%4%False%True");
    }

    #[test]
    fn test_column_key_round_trip() {
        let parsed: ColumnKey = "Tolerance%12%9%False".parse().unwrap();
        assert_eq!(parsed.name, "Tolerance");
        assert_eq!(parsed.template, TemplateId(12));
        assert_eq!(parsed.selection_list, Some(SelectionListId(9)));
        assert!(!parsed.checkbox);
        assert_eq!(parsed.to_string(), "Tolerance%12%9%False");
    }

    #[test]
    fn test_column_key_rejects_malformed_headers() {
        assert!("Tolerance%12%9".parse::<ColumnKey>().is_err());
        assert!("Tolerance%x%9%False".parse::<ColumnKey>().is_err());
        assert!("Tolerance%12%9%maybe".parse::<ColumnKey>().is_err());
    }

    #[test]
    fn test_column_key_from_template() {
        let template = ParameterTemplate {
            template: TemplateId(3),
            name: "Mounting".to_string(),
            default_value: "SMD".to_string(),
            selection_list: Some(SelectionListId(17)),
            checkbox: false,
        };
        let key = ColumnKey::for_template(&template);
        assert_eq!(key.to_string(), "Mounting%3%17%False");
    }
}
