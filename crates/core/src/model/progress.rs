use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::TestId;
use crate::model::status::{CategoryStatus, TestStatus};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("progress document is corrupt: {0}")]
    Corrupt(String),

    #[error("progress document could not be encoded: {0}")]
    Encode(String),
}

//
// ─── DOCUMENT ──────────────────────────────────────────────────────────────────
//

/// The persisted/exchanged unit of progress.
///
/// Each top-level field is optional on the wire. A missing field is kept as
/// `None` so that importing can tell "absent" apart from "present but empty".
/// Unknown top-level fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<BTreeMap<TestId, TestStatus>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<BTreeMap<TestId, String>>,
}

impl ProgressDocument {
    /// A complete document carrying both mappings.
    #[must_use]
    pub fn new(status: BTreeMap<TestId, TestStatus>, notes: BTreeMap<TestId, String>) -> Self {
        Self {
            status: Some(status),
            notes: Some(notes),
        }
    }

    /// A partial document without a `notes` field.
    #[must_use]
    pub fn status_only(status: BTreeMap<TestId, TestStatus>) -> Self {
        Self {
            status: Some(status),
            notes: None,
        }
    }

    /// A partial document without a `status` field.
    #[must_use]
    pub fn notes_only(notes: BTreeMap<TestId, String>) -> Self {
        Self {
            status: None,
            notes: Some(notes),
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<&BTreeMap<TestId, TestStatus>> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn notes(&self) -> Option<&BTreeMap<TestId, String>> {
        self.notes.as_ref()
    }

    /// Parse a document from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Corrupt` if the bytes are not a JSON object of
    /// the expected shape.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        serde_json::from_slice(bytes).map_err(|err| DocumentError::Corrupt(err.to_string()))
    }

    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Corrupt` on malformed input.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Self::from_slice(text.as_bytes())
    }

    /// Pretty-printed JSON with sorted keys, as written to disk.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Encode` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(|err| DocumentError::Encode(err.to_string()))
    }
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

/// In-memory status and note mapping for the current session.
///
/// Only non-default entries are stored: setting `Pending` or an empty note
/// removes the key. This keeps exports canonical, so cycling an item back to
/// its original state yields a document equal to the one before.
#[derive(Clone, Debug, Default)]
pub struct ProgressStore {
    status: BTreeMap<TestId, TestStatus>,
    notes: BTreeMap<TestId, String>,
    revision: u64,
}

impl ProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter bumped once per mutating call that changed something.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_empty() && self.notes.is_empty()
    }

    #[must_use]
    pub fn status(&self, id: &TestId) -> TestStatus {
        self.status.get(id).copied().unwrap_or_default()
    }

    /// Returns `true` when the stored value changed.
    pub fn set_status(&mut self, id: TestId, status: TestStatus) -> bool {
        let changed = Self::write_status(&mut self.status, id, status);
        if changed {
            self.revision += 1;
        }
        changed
    }

    /// Advance along `pending -> in-progress -> done -> pending`, returning the new status.
    pub fn cycle_status(&mut self, id: &TestId) -> TestStatus {
        let next = self.status(id).next();
        self.set_status(id.clone(), next);
        next
    }

    /// Apply one status to many ids as a single update (one revision bump).
    ///
    /// Returns the number of ids whose status actually changed.
    pub fn set_many_status<I>(&mut self, ids: I, status: TestStatus) -> usize
    where
        I: IntoIterator<Item = TestId>,
    {
        let mut changed = 0;
        for id in ids {
            if Self::write_status(&mut self.status, id, status) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.revision += 1;
        }
        changed
    }

    #[must_use]
    pub fn note(&self, id: &TestId) -> &str {
        self.notes.get(id).map_or("", String::as_str)
    }

    /// Returns `true` when the stored note changed.
    pub fn set_note(&mut self, id: TestId, blob: impl Into<String>) -> bool {
        let blob = blob.into();
        let changed = if blob.is_empty() {
            self.notes.remove(&id).is_some()
        } else if self.notes.get(&id) == Some(&blob) {
            false
        } else {
            self.notes.insert(id, blob);
            true
        };
        if changed {
            self.revision += 1;
        }
        changed
    }

    #[must_use]
    pub fn has_note(&self, id: &TestId) -> bool {
        self.notes.contains_key(id)
    }

    /// Count how many of the caller-supplied ids currently have `status`.
    ///
    /// Ids stored in the session but absent from `ids` are not counted.
    #[must_use]
    pub fn count_by_status<'a, I>(&self, ids: I, status: TestStatus) -> usize
    where
        I: IntoIterator<Item = &'a TestId>,
    {
        ids.into_iter()
            .filter(|id| self.status(id) == status)
            .count()
    }

    #[must_use]
    pub fn category_status<'a, I>(&self, ids: I) -> CategoryStatus
    where
        I: IntoIterator<Item = &'a TestId>,
    {
        CategoryStatus::from_statuses(ids.into_iter().map(|id| self.status(id)))
    }

    /// Value snapshot of the current mappings.
    #[must_use]
    pub fn export_document(&self) -> ProgressDocument {
        ProgressDocument::new(self.status.clone(), self.notes.clone())
    }

    /// Replace each mapping that is present in `doc`; absent fields leave the
    /// corresponding mapping untouched.
    pub fn import_document(&mut self, doc: ProgressDocument) {
        let ProgressDocument { status, notes } = doc;
        let mut touched = false;

        if let Some(status) = status {
            self.status = status
                .into_iter()
                .filter(|(_, value)| !value.is_default())
                .collect();
            touched = true;
        }
        if let Some(notes) = notes {
            self.notes = notes
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .collect();
            touched = true;
        }

        if touched {
            self.revision += 1;
        }
    }

    fn write_status(
        map: &mut BTreeMap<TestId, TestStatus>,
        id: TestId,
        status: TestStatus,
    ) -> bool {
        if status.is_default() {
            map.remove(&id).is_some()
        } else {
            map.insert(id, status) != Some(status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> TestId {
        TestId::new(raw)
    }

    #[test]
    fn unset_ids_are_pending_with_empty_notes() {
        let store = ProgressStore::new();
        assert_eq!(store.status(&id("WSTG-INFO-01")), TestStatus::Pending);
        assert_eq!(store.note(&id("WSTG-INFO-01")), "");
    }

    #[test]
    fn cycle_status_three_times_restores_original() {
        let mut store = ProgressStore::new();
        let target = id("WSTG-ATHN-01");
        for start in TestStatus::ALL {
            store.set_status(target.clone(), start);
            store.cycle_status(&target);
            store.cycle_status(&target);
            store.cycle_status(&target);
            assert_eq!(store.status(&target), start);
        }
    }

    #[test]
    fn set_many_status_is_a_single_revision() {
        let mut store = ProgressStore::new();
        store.set_status(id("a"), TestStatus::InProgress);
        let before = store.revision();

        let changed = store.set_many_status([id("a"), id("b")], TestStatus::Done);

        assert_eq!(changed, 2);
        assert_eq!(store.revision(), before + 1);
        assert_eq!(store.status(&id("a")), TestStatus::Done);
        assert_eq!(store.status(&id("b")), TestStatus::Done);
    }

    #[test]
    fn no_op_writes_do_not_bump_revision() {
        let mut store = ProgressStore::new();
        assert!(!store.set_status(id("a"), TestStatus::Pending));
        assert!(!store.set_note(id("a"), ""));
        assert_eq!(store.set_many_status([id("b")], TestStatus::Pending), 0);
        assert_eq!(store.revision(), 0);

        assert!(store.set_note(id("a"), "<p>x</p>"));
        assert!(!store.set_note(id("a"), "<p>x</p>"));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn count_by_status_is_scoped_to_the_given_universe() {
        let mut store = ProgressStore::new();
        let ids = [id("T1"), id("T2"), id("T3"), id("T4")];
        store.set_status(id("T1"), TestStatus::Done);
        store.set_status(id("T2"), TestStatus::InProgress);
        store.set_status(id("T3"), TestStatus::Done);
        store.set_status(id("orphan"), TestStatus::Done);

        assert_eq!(store.count_by_status(&ids, TestStatus::Done), 2);
        assert_eq!(store.count_by_status(&ids, TestStatus::InProgress), 1);
        assert_eq!(store.count_by_status(&ids, TestStatus::Pending), 1);
        assert_eq!(store.count_by_status(&ids[..1], TestStatus::Done), 1);
    }

    #[test]
    fn export_is_a_value_snapshot() {
        let mut store = ProgressStore::new();
        store.set_status(id("a"), TestStatus::Done);
        let snapshot = store.export_document();

        store.set_status(id("a"), TestStatus::Pending);
        store.set_note(id("a"), "later");

        assert_eq!(
            snapshot.status().and_then(|s| s.get("a")),
            Some(&TestStatus::Done)
        );
        assert!(snapshot.notes().is_some_and(BTreeMap::is_empty));
    }

    #[test]
    fn export_import_round_trip_preserves_values() {
        let mut store = ProgressStore::new();
        store.set_status(id("a"), TestStatus::Done);
        store.set_status(id("b"), TestStatus::InProgress);
        store.set_note(id("b"), "<b>finding</b>");

        let mut other = ProgressStore::new();
        other.import_document(store.export_document());

        for key in ["a", "b", "c"] {
            assert_eq!(other.status(&id(key)), store.status(&id(key)));
            assert_eq!(other.note(&id(key)), store.note(&id(key)));
        }
        assert_eq!(other.export_document(), store.export_document());
    }

    #[test]
    fn import_without_notes_keeps_existing_notes() {
        let mut store = ProgressStore::new();
        store.set_note(id("a"), "keep me");
        store.set_status(id("a"), TestStatus::InProgress);

        let doc = ProgressDocument::from_json(r#"{"status":{"b":"done"}}"#).unwrap();
        store.import_document(doc);

        assert_eq!(store.note(&id("a")), "keep me");
        assert_eq!(store.status(&id("a")), TestStatus::Pending);
        assert_eq!(store.status(&id("b")), TestStatus::Done);
    }

    #[test]
    fn import_of_empty_object_changes_nothing() {
        let mut store = ProgressStore::new();
        store.set_status(id("a"), TestStatus::Done);
        let before = store.export_document();

        store.import_document(ProgressDocument::from_json("{}").unwrap());

        assert_eq!(store.export_document(), before);
    }

    #[test]
    fn import_drops_default_entries() {
        let mut store = ProgressStore::new();
        let doc = ProgressDocument::from_json(
            r#"{"status":{"a":"pending","b":"done"},"notes":{"a":"","b":"n"}}"#,
        )
        .unwrap();
        store.import_document(doc);

        let exported = store.export_document();
        assert_eq!(exported.status().map(BTreeMap::len), Some(1));
        assert_eq!(exported.notes().map(BTreeMap::len), Some(1));
    }

    #[test]
    fn document_parsing_tolerates_unknown_fields_and_keys() {
        let doc = ProgressDocument::from_json(
            r#"{"version":3,"status":{"WSTG-FUTURE-99":"in-progress"},"extra":[1,2]}"#,
        )
        .unwrap();
        assert_eq!(
            doc.status().and_then(|s| s.get("WSTG-FUTURE-99")),
            Some(&TestStatus::InProgress)
        );
        assert!(doc.notes().is_none());
    }

    #[test]
    fn document_parsing_rejects_garbage_and_bad_status_values() {
        assert!(matches!(
            ProgressDocument::from_json("not json"),
            Err(DocumentError::Corrupt(_))
        ));
        assert!(matches!(
            ProgressDocument::from_json(r#"{"status":{"a":"blocked"}}"#),
            Err(DocumentError::Corrupt(_))
        ));
        assert!(matches!(
            ProgressDocument::from_json("42"),
            Err(DocumentError::Corrupt(_))
        ));
    }

    #[test]
    fn pretty_json_has_sorted_keys() {
        let mut store = ProgressStore::new();
        store.set_status(id("b"), TestStatus::Done);
        store.set_status(id("a"), TestStatus::Done);
        let text = store.export_document().to_json_pretty().unwrap();
        let a = text.find("\"a\"").unwrap();
        let b = text.find("\"b\"").unwrap();
        assert!(a < b);
        assert!(text.contains("\"notes\": {}"));
    }
}
