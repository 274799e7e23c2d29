use crate::config::ActorConfig;
use crate::error::{ActorError, Result};
use crate::paths::validate_action_name;
use crate::types::{ActionDefinition, Snapshot};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Entries {
    ordered: Vec<Arc<ActionDefinition>>,
    by_name: HashMap<String, usize>,
}

/// Set of known action definitions, keyed by unique name.
///
/// Definitions are immutable once registered. Every operation takes the
/// lock once, so the registry can be shared across threads behind an `Arc`.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    entries: RwLock<Entries>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every action declared in `config`.
    pub fn from_config(config: &ActorConfig) -> Result<Self> {
        let registry = Self::new();
        registry.populate(config)?;
        Ok(registry)
    }

    /// Register every action declared in `config`, stopping at the first error.
    pub fn populate(&self, config: &ActorConfig) -> Result<()> {
        for def in config.definitions() {
            self.register_definition(def)?;
        }
        Ok(())
    }

    pub fn register(
        &self,
        name: &str,
        has_type: bool,
        has_timestamp: bool,
        index_name: &str,
        should_index: bool,
    ) -> Result<Arc<ActionDefinition>> {
        let index_name = (!index_name.is_empty()).then(|| index_name.to_string());
        self.register_definition(ActionDefinition::new(
            name,
            has_type,
            has_timestamp,
            index_name,
            should_index,
        ))
    }

    pub fn register_definition(&self, mut def: ActionDefinition) -> Result<Arc<ActionDefinition>> {
        validate_action_name(&def.name)?;
        def.index_name = def.index_name.filter(|s| !s.is_empty());
        if def.should_index && def.index_name.is_none() {
            return Err(ActorError::InvalidDefinition {
                name: def.name,
                reason: "should_index requires a non-empty index_name".to_string(),
            });
        }

        let mut entries = self.write();
        if entries.by_name.contains_key(&def.name) {
            return Err(ActorError::DuplicateAction(def.name));
        }
        let def = Arc::new(def);
        let pos = entries.ordered.len();
        entries.by_name.insert(def.name.clone(), pos);
        entries.ordered.push(Arc::clone(&def));
        drop(entries);

        tracing::debug!(action = %def.name, index = ?def.index_target(), "registered action");
        Ok(def)
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<ActionDefinition>> {
        let entries = self.read();
        entries
            .by_name
            .get(name)
            .map(|&i| Arc::clone(&entries.ordered[i]))
            .ok_or_else(|| ActorError::UnknownAction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().by_name.contains_key(name)
    }

    /// All definitions in registration order, as of the call.
    pub fn all(&self) -> Snapshot<Arc<ActionDefinition>> {
        Snapshot::new(self.read().ordered.clone())
    }

    pub fn len(&self) -> usize {
        self.read().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Each critical section is a single insert/push, so a poisoned lock
    // still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn register_and_lookup() {
        let reg = ActionRegistry::new();
        reg.register("purchase", true, true, "purchases", true).unwrap();

        let def = reg.lookup("purchase").unwrap();
        assert_eq!(def.name, "purchase");
        assert!(def.has_type);
        assert!(def.has_timestamp);
        assert_eq!(def.index_name.as_deref(), Some("purchases"));
        assert!(def.should_index);
    }

    #[test]
    fn duplicate_registration_fails_without_overwrite() {
        let reg = ActionRegistry::new();
        reg.register("login", false, true, "", false).unwrap();
        let err = reg.register("login", true, false, "other", true).unwrap_err();
        assert!(matches!(err, ActorError::DuplicateAction(ref n) if n == "login"));

        let def = reg.lookup("login").unwrap();
        assert!(!def.has_type);
        assert!(def.has_timestamp);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn duplicate_fails_for_every_name() {
        let reg = ActionRegistry::new();
        let names = ["a", "b_c", "d.e", "f:g", "h-i"];
        for name in names {
            reg.register(name, false, false, "", false).unwrap();
        }
        for name in names {
            assert!(matches!(
                reg.register(name, false, false, "", false),
                Err(ActorError::DuplicateAction(_))
            ));
        }
    }

    #[test]
    fn should_index_without_index_name_is_invalid() {
        let reg = ActionRegistry::new();
        let err = reg.register("view", false, false, "", true).unwrap_err();
        assert!(matches!(err, ActorError::InvalidDefinition { ref name, .. } if name == "view"));
        assert!(!reg.contains("view"));
    }

    #[test]
    fn invalid_name_is_rejected() {
        let reg = ActionRegistry::new();
        let err = reg.register("not valid", false, false, "", false).unwrap_err();
        assert!(matches!(err, ActorError::InvalidDefinition { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn index_name_without_should_index_is_kept() {
        let reg = ActionRegistry::new();
        let def = reg.register("view", false, false, "views", false).unwrap();
        assert_eq!(def.index_name.as_deref(), Some("views"));
        assert_eq!(def.index_target(), None);
    }

    #[test]
    fn empty_index_name_on_prebuilt_definition_is_normalized() {
        let reg = ActionRegistry::new();
        let def = reg
            .register_definition(ActionDefinition {
                name: "view".to_string(),
                has_type: false,
                has_timestamp: false,
                index_name: Some(String::new()),
                should_index: false,
            })
            .unwrap();
        assert_eq!(def.index_name, None);
        assert_eq!(reg.lookup("view").unwrap().index_name, None);

        let err = reg
            .register_definition(ActionDefinition {
                name: "click".to_string(),
                has_type: false,
                has_timestamp: false,
                index_name: Some(String::new()),
                should_index: true,
            })
            .unwrap_err();
        assert!(matches!(err, ActorError::InvalidDefinition { ref name, .. } if name == "click"));
    }

    #[test]
    fn all_shares_registered_definitions() {
        let reg = ActionRegistry::new();
        let registered = reg.register("login", false, true, "", false).unwrap();
        let snap = reg.all();
        assert!(Arc::ptr_eq(&snap[0], &registered));
    }

    #[test]
    fn lookup_unknown_fails() {
        let reg = ActionRegistry::new();
        let err = reg.lookup("missing").unwrap_err();
        assert!(matches!(err, ActorError::UnknownAction(ref n) if n == "missing"));
    }

    #[test]
    fn all_is_registration_ordered_snapshot() {
        let reg = ActionRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            reg.register(name, false, false, "", false).unwrap();
        }
        let snap = reg.all();
        reg.register("late", false, false, "", false).unwrap();

        let names: Vec<_> = snap.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        // iterating again yields the same sequence
        assert_eq!(snap.iter().count(), 3);
        assert_eq!(reg.all().len(), 4);
    }

    #[test]
    fn concurrent_registration_keeps_names_unique() {
        let reg = Arc::new(ActionRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&reg);
                thread::spawn(move || {
                    let mut won = 0;
                    for i in 0..50 {
                        // every thread races for the same 50 names
                        if reg.register(&format!("act_{i}"), false, false, "", false).is_ok() {
                            won += 1;
                        }
                        let _ = reg.all();
                    }
                    won
                })
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 50);
        assert_eq!(reg.len(), 50);
    }
}
