use crate::cmd::load_registry;
use crate::output::print_json;
use actor_core::{paths, ActionRecorder, IndexOutcome, JsonlSink};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

pub fn run(
    root: &Path,
    config: &Path,
    name: &str,
    action_type: Option<&str>,
    at: Option<&str>,
    payload: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let registry = Arc::new(load_registry(config)?);
    let sink = Arc::new(JsonlSink::new(paths::index_dir(root)));
    let recorder = ActionRecorder::new(registry, sink);

    let timestamp = at.map(parse_timestamp).transpose()?;
    let payload = payload.map(parse_payload).unwrap_or(serde_json::Value::Null);

    let receipt = recorder
        .record(name, action_type, timestamp, payload)
        .with_context(|| format!("failed to record action '{name}'"))?;
    let occ = &receipt.occurrence;

    if json {
        let index = match &receipt.index {
            IndexOutcome::Skipped => serde_json::json!({ "status": "skipped" }),
            IndexOutcome::Indexed { index } => {
                serde_json::json!({ "status": "indexed", "index": index })
            }
            IndexOutcome::Failed { index, error } => serde_json::json!({
                "status": "failed",
                "index": index,
                "error": error.to_string(),
            }),
        };
        return print_json(&serde_json::json!({
            "occurrence": occ,
            "index": index,
        }));
    }

    println!("Recorded: {} #{}", occ.action, occ.seq);
    if let Some(ref t) = occ.action_type {
        println!("Type:     {t}");
    }
    if let Some(ts) = occ.timestamp {
        println!("At:       {}", ts.to_rfc3339());
    }
    println!("Payload:  {}", occ.payload);
    match &receipt.index {
        IndexOutcome::Skipped => {}
        IndexOutcome::Indexed { index } => println!("Indexed:  {index}"),
        IndexOutcome::Failed { index, error } => {
            eprintln!("warning: failed to index into '{index}': {error}");
        }
    }
    Ok(())
}

fn parse_timestamp(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let ts = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("invalid timestamp '{s}': expected RFC 3339"))?;
    Ok(ts.with_timezone(&Utc))
}

fn parse_payload(s: &str) -> serde_json::Value {
    serde_json::from_str(s).unwrap_or_else(|_| serde_json::Value::String(s.to_string()))
}
