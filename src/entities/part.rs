//! Part records and their identifiers

use serde::{Deserialize, Serialize};

/// Server-assigned primary key of a part
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PartId(pub i64);

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PartId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(PartId)
            .map_err(|_| format!("Invalid part pk: {}", s))
    }
}

/// Server-assigned primary key of a part category
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CategoryId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(CategoryId)
            .map_err(|_| format!("Invalid category pk: {}", s))
    }
}

/// A catalog item as returned by `GET part/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub pk: PartId,

    /// Display name; the subject of the naming convention checks
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "IPN")]
    pub ipn: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Creation payload for `POST part/`
#[derive(Debug, Clone, Serialize)]
pub struct NewPart {
    pub name: String,
    pub description: String,
    pub category: CategoryId,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "IPN")]
    pub ipn: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    pub active: bool,
}

impl NewPart {
    pub fn new(name: impl Into<String>, description: impl Into<String>, category: CategoryId) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            ipn: None,
            revision: None,
            keywords: None,
            link: None,
            active: true,
        }
    }
}
