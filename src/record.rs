// Generic record trait for any storable resource type

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use uuid::Uuid;

/// Core trait that any storable record must implement
///
/// A record type fixes its schema at compile time. The store only interprets
/// the identifier and the filterable text field; everything else flows
/// through the associated `Draft` and `Patch` payloads.
pub trait Record: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Identifier type assigned by the store
    type Id: RecordId;

    /// Full payload used by create and replace (no id, no creation timestamp)
    type Draft: Validate + DeserializeOwned + Send + 'static;

    /// Merge payload: every merge-eligible field, each optional
    type Patch: Validate + DeserializeOwned + Send + 'static;

    /// Collection name for this record type (e.g., "tasks", "blogposts")
    fn collection_name() -> &'static str;

    /// Unique identifier for this record
    fn id(&self) -> &Self::Id;

    /// Build a new record from a draft, with store-assigned id and timestamp
    fn from_draft(id: Self::Id, draft: Self::Draft, created_at: DateTime<Utc>) -> Self;

    /// Overwrite the fields present in `patch`, leaving the rest untouched
    fn merge(&mut self, patch: Self::Patch);

    /// Overwrite every mutable field from `draft`; id and creation time stay
    fn replace(&mut self, draft: Self::Draft);

    /// The field searched by `Store::list`
    fn filter_text(&self) -> &str;
}

/// Identifier types the store knows how to generate
pub trait RecordId: Clone + Eq + Hash + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Identifier for the n-th record ever created (n starts at 1)
    fn from_sequence(n: u64) -> Self;

    /// Identifier drawn from a space large enough that collisions are negligible
    fn random() -> Self;
}

impl RecordId for u64 {
    fn from_sequence(n: u64) -> Self {
        n
    }

    fn random() -> Self {
        Uuid::new_v4().as_u128() as u64
    }
}

impl RecordId for Uuid {
    fn from_sequence(n: u64) -> Self {
        Uuid::from_u128(n as u128)
    }

    fn random() -> Self {
        Uuid::new_v4()
    }
}

impl RecordId for String {
    fn from_sequence(n: u64) -> Self {
        n.to_string()
    }

    fn random() -> Self {
        Uuid::new_v4().to_string()
    }
}

/// Payload checks run by the adapter layer before the store is touched
pub trait Validate {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestRecord {
        id: String,
        name: String,
        created_at: DateTime<Utc>,
    }

    #[derive(Debug, Deserialize)]
    struct TestDraft {
        name: String,
    }

    #[derive(Debug, Deserialize)]
    struct TestPatch {
        name: Option<String>,
    }

    impl Validate for TestDraft {}
    impl Validate for TestPatch {}

    impl Record for TestRecord {
        type Id = String;
        type Draft = TestDraft;
        type Patch = TestPatch;

        fn collection_name() -> &'static str {
            "test"
        }

        fn id(&self) -> &String {
            &self.id
        }

        fn from_draft(id: String, draft: TestDraft, created_at: DateTime<Utc>) -> Self {
            Self {
                id,
                name: draft.name,
                created_at,
            }
        }

        fn merge(&mut self, patch: TestPatch) {
            if let Some(name) = patch.name {
                self.name = name;
            }
        }

        fn replace(&mut self, draft: TestDraft) {
            self.name = draft.name;
        }

        fn filter_text(&self) -> &str {
            &self.name
        }
    }

    #[test]
    fn test_record_trait_implementation() {
        let now = Utc::now();
        let mut record = TestRecord::from_draft("test-1".to_string(), TestDraft { name: "Test".into() }, now);

        assert_eq!(record.id(), "test-1");
        assert_eq!(record.filter_text(), "Test");
        assert_eq!(TestRecord::collection_name(), "test");

        record.merge(TestPatch { name: None });
        assert_eq!(record.name, "Test");

        record.merge(TestPatch {
            name: Some("Renamed".into()),
        });
        assert_eq!(record.name, "Renamed");
        assert_eq!(record.created_at, now);
    }

    #[test]
    fn test_sequence_ids() {
        assert_eq!(<u64 as RecordId>::from_sequence(7), 7);
        assert_eq!(<String as RecordId>::from_sequence(7), "7");
        assert_eq!(<Uuid as RecordId>::from_sequence(7), Uuid::from_u128(7));
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(<Uuid as RecordId>::random(), <Uuid as RecordId>::random());
        assert_ne!(<String as RecordId>::random(), <String as RecordId>::random());
        assert_ne!(<u64 as RecordId>::random(), <u64 as RecordId>::random());
    }

    #[test]
    fn test_default_validate_accepts() {
        assert!(TestDraft { name: String::new() }.validate().is_ok());
    }
}
