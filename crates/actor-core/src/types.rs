use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// ActionDefinition
// ---------------------------------------------------------------------------

/// Schema for one kind of action: which optional fields its occurrences
/// carry and whether they are forwarded to an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    #[serde(default)]
    pub has_type: bool,
    #[serde(default)]
    pub has_timestamp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(default)]
    pub should_index: bool,
}

impl ActionDefinition {
    pub fn new(
        name: impl Into<String>,
        has_type: bool,
        has_timestamp: bool,
        index_name: Option<String>,
        should_index: bool,
    ) -> Self {
        Self {
            name: name.into(),
            has_type,
            has_timestamp,
            index_name: index_name.filter(|s| !s.is_empty()),
            should_index,
        }
    }

    /// The index occurrences are forwarded to, if this action is indexed.
    pub fn index_target(&self) -> Option<&str> {
        if self.should_index {
            self.index_name.as_deref()
        } else {
            None
        }
    }
}

impl fmt::Display for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.has_type {
            f.write_str(" +type")?;
        }
        if self.has_timestamp {
            f.write_str(" +timestamp")?;
        }
        if let Some(index) = self.index_target() {
            write!(f, " -> {index}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ActionOccurrence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOccurrence {
    /// Position in the log, starting at 1.
    pub seq: u64,
    pub action: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable view of a sequence captured under a lock.
///
/// Cloning shares the underlying buffer, so a snapshot can be iterated any
/// number of times without touching the source again.
#[derive(Debug)]
pub struct Snapshot<T> {
    items: Arc<[T]>,
}

impl<T> Snapshot<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        self.items.get(i)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone> Snapshot<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.to_vec()
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Index<usize> for Snapshot<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.items[i]
    }
}

impl<'a, T> IntoIterator for &'a Snapshot<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
