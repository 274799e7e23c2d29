use crate::output::{print_json, print_table};
use actor_core::{paths, JsonlSink};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum IndexSubcommand {
    /// Show occurrences stored in a local index
    Show { index_name: String },
}

pub fn run(root: &Path, subcmd: IndexSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        IndexSubcommand::Show { index_name } => show(root, &index_name, json),
    }
}

fn show(root: &Path, index_name: &str, json: bool) -> anyhow::Result<()> {
    let sink = JsonlSink::new(paths::index_dir(root));
    let occurrences = sink.read(index_name)?;

    if json {
        return print_json(&occurrences);
    }

    if occurrences.is_empty() {
        println!("Index '{index_name}' is empty.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = occurrences
        .iter()
        .map(|o| {
            vec![
                o.action.clone(),
                o.action_type.clone().unwrap_or_else(|| "-".to_string()),
                o.timestamp
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                o.payload.to_string(),
            ]
        })
        .collect();
    print_table(&["ACTION", "TYPE", "AT", "PAYLOAD"], rows);
    Ok(())
}
