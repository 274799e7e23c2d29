use crate::output::print_json;
use actor_core::config::publish_default;
use anyhow::Context;
use std::path::Path;

pub fn run(config: &Path, force: bool, json: bool) -> anyhow::Result<()> {
    let written = publish_default(config, force)
        .with_context(|| format!("failed to publish config to {}", config.display()))?;

    if json {
        return print_json(&serde_json::json!({
            "path": config.display().to_string(),
            "written": written,
        }));
    }

    if written {
        println!("  created: {}", config.display());
    } else {
        println!("  exists:  {} (use --force to overwrite)", config.display());
    }
    Ok(())
}
