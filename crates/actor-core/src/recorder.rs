use crate::error::{ActorError, Result};
use crate::index::{IndexError, IndexSink};
use crate::registry::ActionRegistry;
use crate::types::{ActionOccurrence, Snapshot};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// ---------------------------------------------------------------------------
// Receipt
// ---------------------------------------------------------------------------

/// What happened to the index forward for a recorded occurrence.
#[derive(Debug)]
pub enum IndexOutcome {
    /// The action is not indexed.
    Skipped,
    Indexed { index: String },
    /// The sink failed. The occurrence is still in the log.
    Failed { index: String, error: IndexError },
}

#[derive(Debug)]
pub struct Receipt {
    pub occurrence: ActionOccurrence,
    pub index: IndexOutcome,
}

impl Receipt {
    pub fn index_error(&self) -> Option<&IndexError> {
        match &self.index {
            IndexOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.index, IndexOutcome::Indexed { .. })
    }
}

// ---------------------------------------------------------------------------
// ActionRecorder
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Log {
    occurrences: Vec<ActionOccurrence>,
    next_seq: u64,
}

/// Validates occurrences against an [`ActionRegistry`] and appends them to
/// an in-memory log. The log is authoritative; the index sink is best effort.
pub struct ActionRecorder {
    registry: Arc<ActionRegistry>,
    sink: Arc<dyn IndexSink>,
    log: Mutex<Log>,
}

impl ActionRecorder {
    pub fn new(registry: Arc<ActionRegistry>, sink: Arc<dyn IndexSink>) -> Self {
        Self {
            registry,
            sink,
            log: Mutex::new(Log {
                occurrences: Vec::new(),
                next_seq: 1,
            }),
        }
    }

    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    /// Validate and append one occurrence of `name`.
    ///
    /// A missing timestamp on an action that requires one is filled with the
    /// current time. Index failures are reported in the receipt, never as an
    /// error, because the append has already happened.
    pub fn record(
        &self,
        name: &str,
        action_type: Option<&str>,
        timestamp: Option<DateTime<Utc>>,
        payload: serde_json::Value,
    ) -> Result<Receipt> {
        let def = self.registry.lookup(name)?;

        if def.has_type != action_type.is_some() {
            return Err(ActorError::TypeMismatch {
                action: def.name.clone(),
                expected: presence(def.has_type),
                got: presence(action_type.is_some()),
            });
        }

        let timestamp = match (def.has_timestamp, timestamp) {
            (true, Some(ts)) => Some(ts),
            (true, None) => Some(Utc::now()),
            (false, None) => None,
            (false, Some(_)) => return Err(ActorError::UnexpectedTimestamp(def.name.clone())),
        };

        let occurrence = {
            let mut log = self.log();
            let occurrence = ActionOccurrence {
                seq: log.next_seq,
                action: def.name.clone(),
                action_type: action_type.map(str::to_string),
                timestamp,
                payload,
            };
            log.next_seq += 1;
            log.occurrences.push(occurrence.clone());
            occurrence
        };
        tracing::debug!(action = %occurrence.action, seq = occurrence.seq, "recorded action");

        let index = match def.index_target() {
            None => IndexOutcome::Skipped,
            Some(index) => match self.sink.index(index, &occurrence) {
                Ok(()) => IndexOutcome::Indexed {
                    index: index.to_string(),
                },
                Err(error) => {
                    tracing::warn!(
                        action = %occurrence.action,
                        seq = occurrence.seq,
                        index,
                        error = %error,
                        "failed to index action occurrence"
                    );
                    IndexOutcome::Failed {
                        index: index.to_string(),
                        error,
                    }
                }
            },
        };

        Ok(Receipt { occurrence, index })
    }

    /// Occurrences in append order, optionally limited to one action.
    pub fn history(&self, name: Option<&str>) -> Snapshot<ActionOccurrence> {
        let log = self.log();
        let items = match name {
            Some(name) => log
                .occurrences
                .iter()
                .filter(|o| o.action == name)
                .cloned()
                .collect(),
            None => log.occurrences.clone(),
        };
        Snapshot::new(items)
    }

    pub fn len(&self) -> usize {
        self.log().occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn log(&self) -> MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn presence(present: bool) -> &'static str {
    if present {
        "a type"
    } else {
        "no type"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{MemorySink, NoopSink};
    use chrono::TimeZone;
    use serde_json::json;
    use std::thread;

    struct FailingSink;

    impl IndexSink for FailingSink {
        fn index(&self, _: &str, _: &ActionOccurrence) -> std::result::Result<(), IndexError> {
            Err(IndexError::Rejected("search cluster unavailable".to_string()))
        }
    }

    fn registry() -> Arc<ActionRegistry> {
        let reg = ActionRegistry::new();
        reg.register("login", false, true, "", false).unwrap();
        reg.register("purchase", true, true, "purchases", true).unwrap();
        reg.register("ping", false, false, "", false).unwrap();
        Arc::new(reg)
    }

    fn recorder_with(sink: Arc<dyn IndexSink>) -> ActionRecorder {
        ActionRecorder::new(registry(), sink)
    }

    #[test]
    fn login_synthesizes_timestamp() {
        let rec = recorder_with(Arc::new(NoopSink));
        let before = Utc::now();
        let receipt = rec.record("login", None, None, json!("u1")).unwrap();
        let after = Utc::now();

        let ts = receipt.occurrence.timestamp.expect("timestamp filled");
        assert!(ts >= before && ts <= after);
        assert_eq!(receipt.occurrence.payload, json!("u1"));
        assert!(receipt.occurrence.action_type.is_none());
        assert!(matches!(receipt.index, IndexOutcome::Skipped));
    }

    #[test]
    fn purchase_is_forwarded_to_index() {
        let sink = Arc::new(MemorySink::new());
        let rec = recorder_with(sink.clone());
        let t = Utc.with_ymd_and_hms(2024, 3, 9, 10, 30, 0).unwrap();
        let payload = json!({"sku": "b-42", "qty": 1});

        let receipt = rec
            .record("purchase", Some("book"), Some(t), payload.clone())
            .unwrap();

        assert!(receipt.is_indexed());
        assert_eq!(receipt.occurrence.timestamp, Some(t));
        let forwarded = sink.entries();
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0].0, "purchases");
        assert_eq!(forwarded[0].1, receipt.occurrence);
        assert_eq!(forwarded[0].1.payload, payload);
    }

    #[test]
    fn unknown_action_fails() {
        let rec = recorder_with(Arc::new(NoopSink));
        let err = rec
            .record("unknown_action", None, None, json!(null))
            .unwrap_err();
        assert!(matches!(err, ActorError::UnknownAction(ref n) if n == "unknown_action"));
        assert!(rec.is_empty());
    }

    #[test]
    fn missing_type_is_mismatch() {
        let sink = Arc::new(MemorySink::new());
        let rec = recorder_with(sink.clone());
        let err = rec
            .record("purchase", None, Some(Utc::now()), json!({}))
            .unwrap_err();
        assert!(matches!(err, ActorError::TypeMismatch { ref action, .. } if action == "purchase"));
        assert!(rec.is_empty());
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn unexpected_type_is_mismatch() {
        let rec = recorder_with(Arc::new(NoopSink));
        let err = rec.record("login", Some("web"), None, json!("u1")).unwrap_err();
        assert!(matches!(
            err,
            ActorError::TypeMismatch { expected: "no type", got: "a type", .. }
        ));
    }

    #[test]
    fn unexpected_timestamp_is_rejected() {
        let rec = recorder_with(Arc::new(NoopSink));
        let err = rec
            .record("ping", None, Some(Utc::now()), json!(null))
            .unwrap_err();
        assert!(matches!(err, ActorError::UnexpectedTimestamp(ref n) if n == "ping"));
    }

    #[test]
    fn action_without_timestamp_records_none() {
        let rec = recorder_with(Arc::new(NoopSink));
        let receipt = rec.record("ping", None, None, json!(null)).unwrap();
        assert!(receipt.occurrence.timestamp.is_none());
    }

    #[test]
    fn index_failure_keeps_log_entry() {
        let rec = recorder_with(Arc::new(FailingSink));
        let receipt = rec
            .record("purchase", Some("book"), None, json!({"sku": "b-1"}))
            .unwrap();

        assert!(matches!(
            receipt.index,
            IndexOutcome::Failed { ref index, .. } if index == "purchases"
        ));
        assert!(matches!(receipt.index_error(), Some(IndexError::Rejected(_))));
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.history(Some("purchase"))[0], receipt.occurrence);
    }

    #[test]
    fn history_preserves_append_order() {
        let rec = recorder_with(Arc::new(NoopSink));
        rec.record("login", None, None, json!("u1")).unwrap();
        rec.record("purchase", Some("book"), None, json!(1)).unwrap();
        rec.record("login", None, None, json!("u2")).unwrap();
        rec.record("ping", None, None, json!(null)).unwrap();

        let all = rec.history(None);
        let actions: Vec<_> = all.iter().map(|o| o.action.as_str()).collect();
        assert_eq!(actions, ["login", "purchase", "login", "ping"]);
        let seqs: Vec<_> = all.iter().map(|o| o.seq).collect();
        assert_eq!(seqs, [1, 2, 3, 4]);

        let logins = rec.history(Some("login"));
        let payloads: Vec<_> = logins.iter().map(|o| o.payload.clone()).collect();
        assert_eq!(payloads, [json!("u1"), json!("u2")]);

        // snapshot is unaffected by later appends
        rec.record("ping", None, None, json!(null)).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(rec.history(None).len(), 5);
    }

    #[test]
    fn record_then_history_round_trip() {
        let rec = recorder_with(Arc::new(NoopSink));
        let t = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let receipt = rec
            .record("purchase", Some("music"), Some(t), json!({"album": "x"}))
            .unwrap();

        let found = rec.history(Some("purchase"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].payload, json!({"album": "x"}));
        assert_eq!(found[0].action_type.as_deref(), Some("music"));
        assert_eq!(found[0].timestamp, Some(t));
        assert_eq!(found[0], receipt.occurrence);
    }

    #[test]
    fn history_for_unrecorded_action_is_empty() {
        let rec = recorder_with(Arc::new(NoopSink));
        rec.record("login", None, None, json!("u1")).unwrap();
        assert!(rec.history(Some("purchase")).is_empty());
        assert!(rec.history(Some("not_registered")).is_empty());
    }

    #[test]
    fn concurrent_records_get_gap_free_sequence() {
        let sink = Arc::new(MemorySink::new());
        let rec = Arc::new(recorder_with(sink.clone()));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let rec = Arc::clone(&rec);
                thread::spawn(move || {
                    for i in 0..25 {
                        rec.record("purchase", Some("book"), None, json!({"t": t, "i": i}))
                            .unwrap();
                        rec.record("login", None, None, json!(t)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let all = rec.history(None);
        assert_eq!(all.len(), 200);
        for (i, occ) in all.iter().enumerate() {
            assert_eq!(occ.seq, i as u64 + 1);
        }
        assert_eq!(sink.entries_for("purchases").len(), 100);
    }
}
