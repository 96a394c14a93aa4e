//! Selection lists - controlled vocabularies managed on the server

use serde::{Deserialize, Serialize};

/// Server-assigned primary key of a selection list
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SelectionListId(pub i64);

impl std::fmt::Display for SelectionListId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SelectionListId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(SelectionListId)
            .map_err(|_| format!("Invalid selection list pk: {}", s))
    }
}

/// One allowed value in a selection list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionListChoice {
    pub value: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// A named enumeration as returned by `GET selection/{pk}/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionList {
    pub pk: SelectionListId,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub choices: Vec<SelectionListChoice>,
}

impl SelectionList {
    /// Values of all choices, in list order
    pub fn values(&self) -> Vec<&str> {
        self.choices.iter().map(|c| c.value.as_str()).collect()
    }
}

/// Creation/update payload for `POST selection/` and `PUT selection/{pk}/`
#[derive(Debug, Clone, Serialize)]
pub struct SelectionListPayload {
    pub name: String,
    pub description: String,
    pub active: bool,
    pub choices: Vec<SelectionListChoice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_list_from_api_payload() {
        let json = r#"{
            "pk": 15,
            "name": "Resistor types",
            "choices": [
                {"value": "MF", "label": "Metal film"},
                {"value": "CF", "label": "Carbon film", "active": false}
            ]
        }"#;
        let list: SelectionList = serde_json::from_str(json).unwrap();
        assert_eq!(list.pk, SelectionListId(15));
        assert_eq!(list.values(), vec!["MF", "CF"]);
        assert!(list.choices[0].active);
        assert!(!list.choices[1].active);
    }
}
