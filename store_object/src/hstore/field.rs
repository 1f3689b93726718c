//! HStore column definition

use crate::errors::StorehausError;
use crate::hstore::dictionary::HStoreDictionary;
use crate::id_type::UniversalId;
use crate::query_builder::field_lookups::default_registry;
use crate::query_builder::filter::QueryFilter;
use crate::query_builder::hstore_lookup::{HStoreLookupResolver, LookupRequest, ResolvedLookup};
use crate::traits::LookupRegistry;
use crate::validation::ValidatedFieldName;
use std::collections::BTreeMap;
use type_mapping::{mapping_to_hstore, PostgresValue};

/// Database column type of every hstore field
pub const HSTORE_DB_TYPE: &str = "hstore";

/// What the values of an hstore column hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HStoreFieldKind {
    /// Free-form string to string data
    Dictionary,
    /// `<table>:<pk>` identifiers of other records
    References,
}

/// An hstore column of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HStoreField {
    name: ValidatedFieldName,
    kind: HStoreFieldKind,
}

impl HStoreField {
    pub fn new(name: &str, kind: HStoreFieldKind) -> Result<Self, StorehausError> {
        Ok(Self {
            name: ValidatedFieldName::new(name)?,
            kind,
        })
    }

    pub fn dictionary(name: &str) -> Result<Self, StorehausError> {
        Self::new(name, HStoreFieldKind::Dictionary)
    }

    pub fn references(name: &str) -> Result<Self, StorehausError> {
        Self::new(name, HStoreFieldKind::References)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn kind(&self) -> HStoreFieldKind {
        self.kind
    }

    pub fn db_type(&self) -> &'static str {
        HSTORE_DB_TYPE
    }

    /// Resolve lookup tokens; the first token is the lookup type
    pub fn get_lookup<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ResolvedLookup, StorehausError> {
        self.get_lookup_with(default_registry(), tokens)
    }

    /// Resolve lookup tokens against a custom registry
    pub fn get_lookup_with<S: AsRef<str>>(
        &self,
        registry: &dyn LookupRegistry,
        tokens: &[S],
    ) -> Result<ResolvedLookup, StorehausError> {
        let (lookup_type, nested) = match tokens.split_first() {
            Some((first, rest)) => (first.as_ref(), rest),
            None => ("exact", tokens),
        };
        HStoreLookupResolver::new(registry).resolve(lookup_type, nested)
    }

    /// Filter on this column from a lookup path relative to it
    pub fn filter(
        &self,
        path: &str,
        value: impl Into<PostgresValue>,
    ) -> Result<QueryFilter, StorehausError> {
        self.filter_with(default_registry(), path, value)
    }

    pub fn filter_with(
        &self,
        registry: &dyn LookupRegistry,
        path: &str,
        value: impl Into<PostgresValue>,
    ) -> Result<QueryFilter, StorehausError> {
        let request = LookupRequest::parse(path);
        let resolved = HStoreLookupResolver::new(registry).resolve_request(&request)?;
        let fragment = resolved.render(self.name(), &value.into())?;
        Ok(QueryFilter::Lookup(fragment))
    }

    /// Prepare a value for storage in this column
    ///
    /// References columns store an empty map instead of NULL.
    pub fn get_prep_value(&self, value: &PostgresValue) -> Result<PostgresValue, StorehausError> {
        match (value, self.kind) {
            (PostgresValue::Null, HStoreFieldKind::Dictionary) => Ok(PostgresValue::Null),
            (PostgresValue::Null, HStoreFieldKind::References) => {
                Ok(PostgresValue::HStore(BTreeMap::new()))
            }
            (v, _) if v.is_mapping() => Ok(PostgresValue::HStore(mapping_to_hstore(v)?)),
            (v, _) => Err(StorehausError::invalid_value(format!(
                "hstore column '{}' expects a mapping, got {}",
                self.name(),
                v.shape()
            ))),
        }
    }

    /// Wrap a loaded column value in a dictionary bound to this field
    pub fn to_dictionary(
        &self,
        values: BTreeMap<String, String>,
        owner: Option<UniversalId>,
    ) -> HStoreDictionary {
        let dictionary = HStoreDictionary::new(self.name(), values);
        match owner {
            Some(owner) => dictionary.with_owner(owner),
            None => dictionary,
        }
    }
}
