use crate::cmd::load_registry;
use crate::output::{print_json, print_table, yes_no};
use actor_core::ActionDefinition;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ActionSubcommand {
    /// List every configured action
    List,
    /// Show one action definition
    Show { name: String },
}

pub fn run(config: &Path, subcmd: ActionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ActionSubcommand::List => list(config, json),
        ActionSubcommand::Show { name } => show(config, &name, json),
    }
}

fn list(config: &Path, json: bool) -> anyhow::Result<()> {
    let registry = load_registry(config)?;
    let defs = registry.all();

    if json {
        let defs: Vec<&ActionDefinition> = defs.iter().map(|d| &**d).collect();
        return print_json(&defs);
    }

    if defs.is_empty() {
        println!("No actions configured.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = defs
        .iter()
        .map(|d| {
            vec![
                d.name.clone(),
                yes_no(d.has_type),
                yes_no(d.has_timestamp),
                d.index_target().unwrap_or("-").to_string(),
            ]
        })
        .collect();
    print_table(&["NAME", "TYPE", "TIMESTAMP", "INDEX"], rows);
    Ok(())
}

fn show(config: &Path, name: &str, json: bool) -> anyhow::Result<()> {
    let registry = load_registry(config)?;
    let def = registry.lookup(name)?;

    if json {
        return print_json(&*def);
    }

    println!("Action:    {}", def.name);
    println!("Type:      {}", yes_no(def.has_type));
    println!("Timestamp: {}", yes_no(def.has_timestamp));
    match (&def.index_name, def.should_index) {
        (Some(index), true) => println!("Index:     {index}"),
        (Some(index), false) => println!("Index:     {index} (disabled)"),
        (None, _) => println!("Index:     -"),
    }
    Ok(())
}
