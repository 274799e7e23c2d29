pub mod action;
pub mod config;
pub mod index;
pub mod publish;
pub mod record;

use actor_core::{ActionRegistry, ActorConfig};
use anyhow::Context;
use std::path::Path;

/// Load the config at `path` and build a registry from it.
pub fn load_registry(path: &Path) -> anyhow::Result<ActionRegistry> {
    let config = ActorConfig::load(path).context("failed to load config")?;
    ActionRegistry::from_config(&config).context("failed to build action registry")
}
