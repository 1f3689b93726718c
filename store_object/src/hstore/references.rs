//! References to other records stored as hstore values
//!
//! Each referenced record is written as `<table><sep><pk>` (`users:42`).
//! Reading the column back yields lazy references that load their record
//! on first access.

use crate::id_type::HasUniversalId;
use crate::traits::{RecordProvider, Referenceable};
use config::HStoreConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::OnceCell;

/// How reference identifiers are written and read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFormat {
    pub separator: String,
    /// Stored for a missing reference
    pub empty: String,
    /// Only resolve identifiers whose table matches the target type
    pub strict_tables: bool,
}

impl Default for ReferenceFormat {
    fn default() -> Self {
        Self::from(&HStoreConfig::default())
    }
}

impl From<&HStoreConfig> for ReferenceFormat {
    fn from(config: &HStoreConfig) -> Self {
        Self {
            separator: config.reference_separator.clone(),
            empty: config.empty_reference.clone(),
            strict_tables: config.strict_reference_tables,
        }
    }
}

/// Table and primary key of a referenced record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceId {
    pub table: String,
    pub primary_key: String,
}

impl ReferenceId {
    pub fn new(table: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.into(),
        }
    }

    pub fn for_entity<E: Referenceable>(entity: &E) -> Self {
        Self::new(E::table_name(), entity.extract_id().universal_id().to_string())
    }

    pub fn encode(&self, format: &ReferenceFormat) -> String {
        format!("{}{}{}", self.table, format.separator, self.primary_key)
    }

    /// Parse a stored identifier; the sentinel and malformed values give `None`
    ///
    /// Only the first separator splits, so primary keys may contain it.
    pub fn parse(raw: &str, format: &ReferenceFormat) -> Option<Self> {
        if raw == format.empty {
            return None;
        }
        let (table, primary_key) = raw.split_once(format.separator.as_str())?;
        if table.is_empty() || primary_key.is_empty() {
            return None;
        }
        Some(Self::new(table, primary_key))
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode(&ReferenceFormat::default()))
    }
}

/// Write each entity as its identifier, `None` as the empty sentinel
pub fn serialize_references<'a, E, I>(references: I, format: &ReferenceFormat) -> BTreeMap<String, String>
where
    E: Referenceable + 'a,
    I: IntoIterator<Item = (&'a String, &'a Option<E>)>,
{
    references
        .into_iter()
        .map(|(key, entity)| {
            let identifier = match entity {
                Some(entity) => ReferenceId::for_entity(entity).encode(format),
                None => format.empty.clone(),
            };
            (key.clone(), identifier)
        })
        .collect()
}

/// Read identifiers back as lazy references; no record is loaded here
pub fn deserialize_references<E: Referenceable>(
    values: &BTreeMap<String, String>,
    format: &ReferenceFormat,
) -> BTreeMap<String, LazyReference<E>> {
    values
        .iter()
        .map(|(key, raw)| {
            let mut id = ReferenceId::parse(raw, format);
            if format.strict_tables {
                id = id.filter(|id| id.table == E::table_name());
            }
            if id.is_none() && *raw != format.empty {
                crate::debug_log!("Reference '{}' = '{}' will not resolve", key, raw);
            }
            (key.clone(), LazyReference::new(id))
        })
        .collect()
}

/// A reference loaded on first read and cached afterwards
///
/// The outcome of the first fetch is kept, including a miss, so a
/// reference hits the provider at most once.
pub struct LazyReference<E> {
    id: Option<ReferenceId>,
    resolved: OnceCell<Option<E>>,
}

impl<E> LazyReference<E> {
    pub fn new(id: Option<ReferenceId>) -> Self {
        Self {
            id,
            resolved: OnceCell::new(),
        }
    }

    pub fn id(&self) -> Option<&ReferenceId> {
        self.id.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.initialized()
    }

    /// Resolved record, without fetching
    pub fn cached(&self) -> Option<&E> {
        self.resolved.get().and_then(Option::as_ref)
    }

    /// Resolve through `provider` on first call
    ///
    /// Missing records and provider errors both give `None`.
    pub async fn get<P>(&self, provider: &P) -> Option<&E>
    where
        P: RecordProvider<E> + ?Sized,
    {
        self.resolved
            .get_or_init(|| async {
                let id = self.id.as_ref()?;
                match provider.fetch_by_identifier(&id.table, &id.primary_key).await {
                    Ok(record) => {
                        if record.is_none() {
                            crate::debug_log!("Reference {} points to a missing record", id);
                        }
                        record
                    }
                    Err(e) => {
                        tracing::warn!("Failed to resolve reference {}: {}", id, e);
                        None
                    }
                }
            })
            .await
            .as_ref()
    }
}

impl<E: Referenceable> LazyReference<E> {
    /// Reference that is already resolved to `entity`
    pub fn from_entity(entity: E) -> Self {
        Self {
            id: Some(ReferenceId::for_entity(&entity)),
            resolved: OnceCell::new_with(Some(Some(entity))),
        }
    }

    /// Stored form of this reference
    pub fn identifier(&self, format: &ReferenceFormat) -> String {
        self.id
            .as_ref()
            .map(|id| id.encode(format))
            .unwrap_or_else(|| format.empty.clone())
    }
}

impl<E: fmt::Debug> fmt::Debug for LazyReference<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyReference")
            .field("id", &self.id)
            .field("resolved", &self.resolved.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StorehausError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        id: i32,
        name: String,
    }

    impl Referenceable for User {
        type Id = i32;

        fn table_name() -> &'static str {
            "users"
        }

        fn extract_id(&self) -> i32 {
            self.id
        }
    }

    #[derive(Default)]
    struct MemoryProvider {
        rows: Mutex<HashMap<String, User>>,
        fetches: AtomicUsize,
    }

    impl MemoryProvider {
        fn insert(&self, user: User) {
            self.rows.lock().unwrap().insert(user.id.to_string(), user);
        }

        fn delete(&self, id: i32) {
            self.rows.lock().unwrap().remove(&id.to_string());
        }
    }

    #[async_trait]
    impl RecordProvider<User> for MemoryProvider {
        async fn fetch_by_identifier(
            &self,
            table_name: &str,
            primary_key: &str,
        ) -> Result<Option<User>, StorehausError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if table_name != "users" {
                return Err(StorehausError::NotFound(table_name.to_string()));
            }
            Ok(self.rows.lock().unwrap().get(primary_key).cloned())
        }
    }

    fn user(id: i32, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_serialize_references() {
        let mut refs = BTreeMap::new();
        refs.insert("owner".to_string(), Some(user(7, "ann")));
        refs.insert("editor".to_string(), None);

        let stored = serialize_references(&refs, &ReferenceFormat::default());
        assert_eq!(stored["owner"], "users:7");
        assert_eq!(stored["editor"], "");
    }

    #[test]
    fn test_parse_identifier() {
        let format = ReferenceFormat::default();
        assert_eq!(
            ReferenceId::parse("users:a:b", &format),
            Some(ReferenceId::new("users", "a:b"))
        );
        assert_eq!(ReferenceId::parse("", &format), None);
        assert_eq!(ReferenceId::parse("users", &format), None);
        assert_eq!(ReferenceId::parse(":3", &format), None);
    }

    #[tokio::test]
    async fn test_round_trip_resolves_entity() {
        let provider = MemoryProvider::default();
        provider.insert(user(1, "ann"));

        let mut refs = BTreeMap::new();
        refs.insert("a".to_string(), Some(user(1, "ann")));
        let format = ReferenceFormat::default();

        let lazy = deserialize_references::<User>(&serialize_references(&refs, &format), &format);
        let reference = &lazy["a"];
        assert!(!reference.is_resolved());
        assert_eq!(reference.get(&provider).await, Some(&user(1, "ann")));
        assert_eq!(reference.identifier(&format), "users:1");
    }

    #[tokio::test]
    async fn test_deleted_record_resolves_to_none() {
        let provider = MemoryProvider::default();
        provider.insert(user(2, "bob"));

        let mut refs = BTreeMap::new();
        refs.insert("a".to_string(), Some(user(2, "bob")));
        let format = ReferenceFormat::default();
        let lazy = deserialize_references::<User>(&serialize_references(&refs, &format), &format);

        provider.delete(2);
        assert_eq!(lazy["a"].get(&provider).await, None);
        assert!(lazy["a"].is_resolved());
    }

    #[tokio::test]
    async fn test_resolution_is_cached() {
        let provider = MemoryProvider::default();
        provider.insert(user(3, "cy"));

        let reference = LazyReference::<User>::new(Some(ReferenceId::new("users", "3")));
        assert!(reference.get(&provider).await.is_some());
        provider.delete(3);
        assert_eq!(reference.get(&provider).await.map(|u| u.name.as_str()), Some("cy"));
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sentinel_and_provider_errors_are_soft() {
        let provider = MemoryProvider::default();
        let mut stored = BTreeMap::new();
        stored.insert("none".to_string(), String::new());
        stored.insert("other".to_string(), "groups:1".to_string());

        let lazy = deserialize_references::<User>(&stored, &ReferenceFormat::default());
        assert!(lazy["none"].id().is_none());
        assert_eq!(lazy["none"].get(&provider).await, None);
        assert_eq!(lazy["other"].get(&provider).await, None);
        // Only the identifier with a table reached the provider
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_strict_tables_skip_foreign_identifiers() {
        let provider = MemoryProvider::default();
        let format = ReferenceFormat {
            strict_tables: true,
            ..ReferenceFormat::default()
        };
        let mut stored = BTreeMap::new();
        stored.insert("other".to_string(), "groups:1".to_string());

        let lazy = deserialize_references::<User>(&stored, &format);
        assert!(lazy["other"].id().is_none());
        assert_eq!(lazy["other"].get(&provider).await, None);
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_from_entity_is_resolved() {
        let reference = LazyReference::from_entity(user(4, "dee"));
        assert!(reference.is_resolved());
        assert_eq!(reference.cached().map(|u| u.id), Some(4));
        assert_eq!(
            reference.identifier(&ReferenceFormat::default()),
            "users:4"
        );
    }

    #[test]
    fn test_custom_separator() {
        let config = HStoreConfig::new("/".to_string(), "-".to_string(), false);
        let format = ReferenceFormat::from(&config);
        let mut refs: BTreeMap<String, Option<User>> = BTreeMap::new();
        refs.insert("x".to_string(), Some(user(9, "eve")));
        refs.insert("y".to_string(), None);

        let stored = serialize_references(&refs, &format);
        assert_eq!(stored["x"], "users/9");
        assert_eq!(stored["y"], "-");
        assert_eq!(ReferenceId::parse("-", &format), None);
    }
}
