use crate::output::print_json;
use actor_core::config::WarnLevel;
use actor_core::ActorConfig;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate the config for common mistakes
    Validate,
}

pub fn run(config: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(config, json),
    }
}

fn validate(path: &Path, json: bool) -> anyhow::Result<()> {
    let config = ActorConfig::load(path).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({
            "actions": config.actions.len(),
            "warnings": warnings,
        }))?;
    } else if warnings.is_empty() {
        println!("Config is valid ({} actions). No warnings.", config.actions.len());
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
