//! Stock locations - physical storage places in the warehouse tree

use serde::{Deserialize, Serialize};

/// A stock location as returned by `GET stock/location/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLocation {
    pub pk: i64,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<i64>,
}

/// Creation payload for `POST stock/location/`
#[derive(Debug, Clone, Serialize)]
pub struct NewStockLocation {
    pub name: String,
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_type: Option<i64>,
}
