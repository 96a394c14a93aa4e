//! Record types mirrored from the InvenTree REST API
//!
//! partbench owns none of this data; every record here is the local shape
//! of a server-side object:
//!
//! - [`Part`] - catalog items, scoped to a category
//! - [`ParameterTemplate`] - per-category parameter definitions with defaults
//! - [`ParameterValue`] - a parameter assigned to one part
//! - [`SelectionList`] - controlled vocabularies for parameter values
//! - [`StockLocation`] - physical storage locations

pub mod location;
pub mod part;
pub mod selection;
pub mod template;

pub use location::{NewStockLocation, StockLocation};
pub use part::{CategoryId, NewPart, Part, PartId};
pub use selection::{SelectionList, SelectionListChoice, SelectionListId, SelectionListPayload};
pub use template::{ColumnKey, ParameterTemplate, ParameterValue, TemplateId};
