use crate::error::{ActorError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CONFIG_DIR: &str = "config";
pub const CONFIG_FILE: &str = "config/actor.yaml";

pub const STATE_DIR: &str = ".actor";
pub const INDEX_DIR: &str = ".actor/index";

pub const INDEX_EXT: &str = "jsonl";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn index_dir(root: &Path) -> PathBuf {
    root.join(INDEX_DIR)
}

pub fn index_file(dir: &Path, index_name: &str) -> PathBuf {
    dir.join(format!("{index_name}.{INDEX_EXT}"))
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

const MAX_NAME_LEN: usize = 128;

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.:\-]*$").unwrap())
}

pub fn validate_action_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name must not be empty"
    } else if name.len() > MAX_NAME_LEN {
        "name is longer than 128 characters"
    } else if !name_re().is_match(name) {
        "name must start with a letter or '_' and contain only letters, digits, '_', '.', ':' or '-'"
    } else {
        return Ok(());
    };
    Err(ActorError::InvalidDefinition {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Index names become file stems, so they may not escape the index directory.
pub fn is_safe_index_name(index_name: &str) -> bool {
    !index_name.is_empty()
        && index_name != "."
        && !index_name.contains("..")
        && !index_name.contains(['/', '\\', '\0'])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
