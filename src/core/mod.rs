//! Core module - validation and normalization logic plus its collaborators

pub mod client;
pub mod config;
pub mod naming;
pub mod normalize;
pub mod registry;

pub use client::InvenTreeClient;
pub use config::{ApiConfig, Config, ConfigError};
pub use naming::{NameVerdict, NamingRule, RuleSet, TokenPredicate};
pub use normalize::{normalize, NormalizeOptions, NormalizeOutcome, NormalizeReport};
pub use registry::{
    CachedEnumerations, EnumerationSource, ParameterStore, RegistryError, TemplateSource,
};
