//! Dictionary value holder
//!
//! The loaded value of an hstore column, bound to its field and, when it
//! was read from a row, to that row's primary key.

use crate::errors::StorehausError;
use crate::id_type::UniversalId;
use crate::manager::HStoreManager;
use crate::query_builder::QueryBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use type_mapping::{to_hstore_text, PostgresValue};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HStoreDictionary {
    field: String,
    owner: Option<UniversalId>,
    values: BTreeMap<String, String>,
}

impl HStoreDictionary {
    pub fn new(field: &str, values: BTreeMap<String, String>) -> Self {
        Self {
            field: field.to_string(),
            owner: None,
            values,
        }
    }

    /// Bind the dictionary to the row it was loaded from
    pub fn with_owner(mut self, owner: UniversalId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field
    }

    pub fn owner(&self) -> Option<&UniversalId> {
        self.owner.as_ref()
    }

    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Store a scalar under `key`, returning the previous value
    ///
    /// Dates are stored as `YYYY-MM-DD`; sequences, mappings and nulls are
    /// rejected because hstore holds text only.
    pub fn set_field(
        &mut self,
        key: &str,
        value: impl Into<PostgresValue>,
    ) -> Result<Option<String>, StorehausError> {
        let value = value.into();
        let text = to_hstore_text(&value).ok_or_else(|| {
            StorehausError::invalid_value(format!(
                "cannot store a {} under hstore key '{}'",
                value.shape(),
                key
            ))
        })?;
        Ok(self.values.insert(key.to_string(), text))
    }

    pub fn remove_field(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.values
    }

    /// Merge `other` into this dictionary, overwriting existing keys
    pub fn update(&mut self, other: BTreeMap<String, String>) {
        self.values.extend(other);
    }

    /// Value bound when writing the dictionary back to its column
    pub fn to_bind_value(&self) -> PostgresValue {
        PostgresValue::HStore(self.values.clone())
    }

    /// Remove `keys` from the owning row, then locally
    ///
    /// Fails with `NotFound` when the dictionary was not loaded from a row.
    /// The local values are left untouched when the row update fails.
    pub async fn remove(
        &mut self,
        manager: &HStoreManager,
        keys: &[&str],
    ) -> Result<u64, StorehausError> {
        let owner = self.owner.clone().ok_or_else(|| {
            StorehausError::NotFound(format!(
                "dictionary for field '{}' is not bound to a row",
                self.field
            ))
        })?;

        let query = QueryBuilder::new().filter(manager.owner_filter(&owner));
        let removed = manager.hremove(&self.field, keys, &query).await?;

        for key in keys {
            self.values.remove(*key);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_get_and_set_field() {
        let mut dictionary = HStoreDictionary::new("data", BTreeMap::new());
        assert!(dictionary.is_empty());

        assert_eq!(dictionary.set_field("a", "1").unwrap(), None);
        assert_eq!(dictionary.set_field("a", 2).unwrap(), Some("1".to_string()));
        dictionary
            .set_field("since", NaiveDate::from_ymd_opt(2021, 1, 5).unwrap())
            .unwrap();

        assert_eq!(dictionary.get_field("a"), Some("2"));
        assert_eq!(dictionary.get_field("since"), Some("2021-01-05"));
        assert_eq!(dictionary.get_field("missing"), None);
        assert_eq!(dictionary.keys().collect::<Vec<_>>(), vec!["a", "since"]);
    }

    #[test]
    fn test_set_field_rejects_collections() {
        let mut dictionary = HStoreDictionary::default();
        let err = dictionary.set_field("list", vec!["x"]).unwrap_err();
        assert!(matches!(err, StorehausError::InvalidValue(_)));

        let err = dictionary.set_field("nothing", PostgresValue::Null).unwrap_err();
        assert!(matches!(err, StorehausError::InvalidValue(_)));
        assert!(dictionary.is_empty());
    }

    #[test]
    fn test_update_and_remove_field() {
        let mut values = BTreeMap::new();
        values.insert("a".to_string(), "1".to_string());
        let mut dictionary = HStoreDictionary::new("data", values);

        let mut other = BTreeMap::new();
        other.insert("a".to_string(), "10".to_string());
        other.insert("b".to_string(), "20".to_string());
        dictionary.update(other);

        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.remove_field("a"), Some("10".to_string()));
        assert!(!dictionary.contains_key("a"));
        assert_eq!(
            dictionary.iter().collect::<Vec<_>>(),
            vec![("b", "20")]
        );
        assert!(matches!(dictionary.to_bind_value(), PostgresValue::HStore(m) if m.len() == 1));
    }

    #[tokio::test]
    async fn test_failed_remove_keeps_local_values() {
        let pool = crate::DbPool::connect_lazy("postgres://localhost/unused").unwrap();
        let manager = HStoreManager::new(pool, "bags").unwrap();

        let mut values = BTreeMap::new();
        values.insert("a".to_string(), "1".to_string());
        let mut dictionary =
            HStoreDictionary::new("not a column", values).with_owner(UniversalId::Numeric(1));

        let err = dictionary.remove(&manager, &["a"]).await.unwrap_err();
        assert!(matches!(err, StorehausError::ValidationError(_)));
        assert_eq!(dictionary.get_field("a"), Some("1"));
    }

    #[tokio::test]
    async fn test_remove_without_owner_is_not_found() {
        let pool = crate::DbPool::connect_lazy("postgres://localhost/unused").unwrap();
        let manager = HStoreManager::new(pool, "bags").unwrap();

        let mut dictionary = HStoreDictionary::new("data", BTreeMap::new());
        let err = dictionary.remove(&manager, &["a"]).await.unwrap_err();
        assert!(matches!(err, StorehausError::NotFound(_)));
    }
}
