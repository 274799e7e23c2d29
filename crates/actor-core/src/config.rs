use crate::error::{ActorError, Result};
use crate::io::{atomic_write, write_if_missing};
use crate::paths::{is_safe_index_name, validate_action_name};
use crate::types::ActionDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const CURRENT_VERSION: u32 = 1;

/// Config written by `publish_default`.
pub const DEFAULT_CONFIG: &str = r#"# Action definitions loaded into the registry at startup.
#
# Each key under `actions` is an action name. Fields:
#   has_type       occurrences carry a `type` string
#   has_timestamp  occurrences carry a timestamp (filled with "now" if omitted)
#   index_name     index that receives occurrences
#   should_index   forward occurrences to `index_name`
version: 1
actions:
  login:
    has_timestamp: true
  purchase:
    has_type: true
    has_timestamp: true
    index_name: purchases
    should_index: true
"#;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ActionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    #[serde(default)]
    pub has_type: bool,
    #[serde(default)]
    pub has_timestamp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(default)]
    pub should_index: bool,
}

// ---------------------------------------------------------------------------
// ActorConfig (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub actions: BTreeMap<String, ActionConfig>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            actions: BTreeMap::new(),
        }
    }
}

impl ActorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ActorError::ConfigNotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self> {
        let cfg: ActorConfig = serde_yaml::from_str(data)?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        atomic_write(path, data.as_bytes())?;
        Ok(())
    }

    /// Definitions in name order, ready for registration.
    pub fn definitions(&self) -> impl Iterator<Item = ActionDefinition> + '_ {
        self.actions.iter().map(|(name, action)| {
            ActionDefinition::new(
                name.clone(),
                action.has_type,
                action.has_timestamp,
                action.index_name.clone(),
                action.should_index,
            )
        })
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version != CURRENT_VERSION {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "unsupported config version {} (expected {})",
                    self.version, CURRENT_VERSION
                ),
            });
        }

        for (name, action) in &self.actions {
            if let Err(ActorError::InvalidDefinition { reason, .. }) = validate_action_name(name) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("invalid action name '{name}': {reason}"),
                });
            }

            let index = action.index_name.as_deref().filter(|s| !s.is_empty());
            match (action.should_index, index) {
                (true, None) => warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("action '{name}' sets should_index but has no index_name"),
                }),
                (false, Some(index)) => warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "action '{name}' names index '{index}' but should_index is false"
                    ),
                }),
                _ => {}
            }

            if let Some(index) = index.filter(|i| !is_safe_index_name(i)) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "action '{name}' index '{index}' cannot be used as an index file name"
                    ),
                });
            }
        }

        warnings
    }
}

/// Write [`DEFAULT_CONFIG`] to `path`. Returns true if a file was written.
///
/// An existing file is left alone unless `force` is set.
pub fn publish_default(path: &Path, force: bool) -> Result<bool> {
    let written = if force {
        atomic_write(path, DEFAULT_CONFIG.as_bytes())?;
        true
    } else {
        write_if_missing(path, DEFAULT_CONFIG.as_bytes())?
    };
    if written {
        tracing::info!(path = %path.display(), "published actor config");
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
