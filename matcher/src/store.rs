use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form metadata attached to a fingerprint.
pub type Metadata = serde_json::Map<String, Value>;

/// Metadata key set on every fraudster record.
pub const IS_FRAUDSTER_KEY: &str = "is_fraudster";

/// Metadata key holding the RFC 3339 time a record was marked as fraudster.
pub const DATE_MARKED_KEY: &str = "date_marked";

/// A stored fingerprint with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub fingerprint: Vec<f32>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

/// Keyed collection of fingerprints that iterates in insertion order.
///
/// Re-adding an existing id replaces the record in place, so its position
/// in iteration order (and therefore tie-breaking in searches) is kept.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a record. Returns the previous record, if any.
    pub fn add(
        &mut self,
        id: impl Into<String>,
        fingerprint: Vec<f32>,
        metadata: Option<Metadata>,
    ) -> Option<Record> {
        let record = Record {
            id: id.into(),
            fingerprint,
            metadata: metadata.unwrap_or_default(),
        };
        match self.index.get(&record.id) {
            Some(&pos) => Some(std::mem::replace(&mut self.records[pos], record)),
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    /// Removes a record. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &str) -> Option<Record> {
        let pos = self.index.remove(id)?;
        let removed = self.records.remove(pos);
        for r in &self.records[pos..] {
            if let Some(i) = self.index.get_mut(&r.id) {
                *i -= 1;
            }
        }
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }

    /// All fingerprints in insertion order.
    pub fn fingerprints(&self) -> Vec<&[f32]> {
        self.records.iter().map(|r| r.fingerprint.as_slice()).collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    pub(crate) fn to_records(&self) -> Vec<Record> {
        self.records.clone()
    }

    /// Rebuilds a store from records in order; later duplicates overwrite
    /// earlier ones.
    pub(crate) fn from_records(records: Vec<Record>) -> Self {
        let mut store = Self::new();
        for r in records {
            store.add(r.id, r.fingerprint, Some(r.metadata));
        }
        store
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Main collection of voice samples.
pub type FingerprintStore = RecordStore;

/// Registry of fingerprints that belong to known fraudsters.
///
/// Every record is stamped with `is_fraudster = true` and a `date_marked`
/// timestamp unless the caller already supplied them.
#[derive(Debug, Clone, Default)]
pub struct FraudsterRegistry {
    store: RecordStore,
}

impl FraudsterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        id: impl Into<String>,
        fingerprint: Vec<f32>,
        metadata: Option<Metadata>,
    ) -> Option<Record> {
        let mut metadata = metadata.unwrap_or_default();
        metadata
            .entry(IS_FRAUDSTER_KEY)
            .or_insert(Value::Bool(true));
        metadata
            .entry(DATE_MARKED_KEY)
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        self.store.add(id, fingerprint, Some(metadata))
    }

    pub fn remove(&mut self, id: &str) -> Option<Record> {
        self.store.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.store.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.store.contains(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.store.iter()
    }

    /// The underlying store, for searching.
    pub fn as_store(&self) -> &RecordStore {
        &self.store
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub(crate) fn from_records(records: Vec<Record>) -> Self {
        Self {
            store: RecordStore::from_records(records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(v: Value) -> Option<Metadata> {
        v.as_object().cloned()
    }

    #[test]
    fn add_and_get() {
        let mut store = RecordStore::new();
        assert!(store.add("a", vec![1.0, 2.0], None).is_none());
        assert!(store.add("b", vec![3.0, 4.0], meta(json!({"caller": "x"}))).is_none());
        assert_eq!(store.len(), 2);

        let b = store.get("b").unwrap();
        assert_eq!(b.fingerprint, vec![3.0, 4.0]);
        assert_eq!(b.metadata["caller"], "x");
        assert!(store.get("a").unwrap().metadata.is_empty());
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut store = RecordStore::new();
        store.add("a", vec![1.0], None);
        store.add("b", vec![2.0], None);
        store.add("c", vec![3.0], None);

        let prev = store.add("a", vec![9.0], None).unwrap();
        assert_eq!(prev.fingerprint, vec![1.0]);
        assert_eq!(store.len(), 3);
        assert_eq!(store.ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(store.get("a").unwrap().fingerprint, vec![9.0]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = RecordStore::new();
        store.add("a", vec![1.0], None);
        store.add("b", vec![2.0], None);
        store.add("c", vec![3.0], None);

        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
        assert!(store.remove("nonexistent").is_none());

        // Index stays consistent after shifting.
        assert_eq!(store.get("b").unwrap().fingerprint, vec![2.0]);
        assert_eq!(store.get("c").unwrap().fingerprint, vec![3.0]);
        assert_eq!(store.ids().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn no_dimension_check_at_insert() {
        let mut store = RecordStore::new();
        store.add("a", vec![1.0, 2.0], None);
        store.add("b", vec![1.0, 2.0, 3.0], None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn fraudster_metadata_stamped() {
        let mut reg = FraudsterRegistry::new();
        reg.add("f1", vec![1.0], None);
        let rec = reg.get("f1").unwrap();
        assert_eq!(rec.metadata[IS_FRAUDSTER_KEY], Value::Bool(true));
        let marked = rec.metadata[DATE_MARKED_KEY].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(marked).is_ok());
    }

    #[test]
    fn fraudster_metadata_preserved_when_present() {
        let mut reg = FraudsterRegistry::new();
        reg.add(
            "f1",
            vec![1.0],
            meta(json!({"date_marked": "2024-01-01T00:00:00Z", "case": 42})),
        );
        let rec = reg.get("f1").unwrap();
        assert_eq!(rec.metadata[DATE_MARKED_KEY], "2024-01-01T00:00:00Z");
        assert_eq!(rec.metadata["case"], 42);
        assert_eq!(rec.metadata[IS_FRAUDSTER_KEY], true);
    }
}
