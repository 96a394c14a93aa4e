//! Command implementations

pub mod location;
pub mod name;
pub mod param;
pub mod part;
pub mod selection;

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::{Config, InvenTreeClient};

/// Resolve configuration with CLI-flag overrides applied
pub fn load_config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    config.merge(Config {
        base_url: global.base_url.clone(),
        token: global.token.clone(),
        rules_file: global.rules.clone(),
        ..Default::default()
    });
    config
}

/// Build a client, failing fast when credentials are missing
pub fn connect(config: &Config) -> Result<InvenTreeClient> {
    let api = config.api().map_err(|e| miette::miette!("{}", e))?;
    InvenTreeClient::new(&api).map_err(|e| miette::miette!("{}", e))
}
