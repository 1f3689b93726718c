//! HStore lookup resolution
//!
//! A lookup path on an hstore column is either a whole-column comparison
//! (`exact`, `contains`) or a keyed lookup: the first token names the key,
//! an optional `asint`/`asdate` token casts the extracted text, and a final
//! token picks the comparison (`exact` when omitted).
//!
//! ```text
//! data                    -> data = %s
//! data__contains          -> data @> %s | data ?& %s | data ? %s
//! data__color             -> data -> %s = %s
//! data__size__asint__gte  -> (data -> %s)::INTEGER >= %s
//! ```

use crate::errors::StorehausError;
use crate::query_builder::field_lookups::{default_registry, FieldKind, FieldLookup};
use crate::query_builder::sql_generation::{SqlFragment, PLACEHOLDER};
use crate::query_builder::LOOKUP_SEP;
use crate::traits::LookupRegistry;
use type_mapping::{mapping_to_hstore, sequence_to_text_array, PostgresValue};

/// Deepest keyed path: a cast token followed by a comparison token
const MAX_NESTING: usize = 2;

const DEFAULT_COMPARISON: &str = "exact";

/// Cast applied to a value extracted by key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CastMode {
    #[default]
    None,
    ToInteger,
    ToDate,
}

impl CastMode {
    /// Cast selected by a nested token, if the token is a cast
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "asint" => Some(CastMode::ToInteger),
            "asdate" => Some(CastMode::ToDate),
            _ => None,
        }
    }

    /// Wrap `expr` in the cast
    pub fn apply(&self, expr: &str) -> String {
        match self {
            CastMode::None => expr.to_string(),
            CastMode::ToInteger => format!("({})::INTEGER", expr),
            CastMode::ToDate => format!("({})::DATE", expr),
        }
    }

    /// Kind the comparison is delegated to after casting
    pub fn field_kind(&self) -> FieldKind {
        match self {
            CastMode::None => FieldKind::Text,
            CastMode::ToInteger => FieldKind::Integer,
            CastMode::ToDate => FieldKind::Date,
        }
    }
}

/// A lookup type and the nested tokens that follow it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    lookup_type: String,
    nested: Vec<String>,
}

impl LookupRequest {
    pub fn new<S: AsRef<str>>(lookup_type: &str, nested: &[S]) -> Self {
        Self {
            lookup_type: lookup_type.to_string(),
            nested: nested.iter().map(|t| t.as_ref().to_string()).collect(),
        }
    }

    /// Split a `__`-separated path; the empty path is `exact`
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::new::<&str>(DEFAULT_COMPARISON, &[]);
        }
        let mut tokens = path.split(LOOKUP_SEP);
        let lookup_type = tokens.next().unwrap_or(DEFAULT_COMPARISON);
        let nested: Vec<&str> = tokens.collect();
        Self::new(lookup_type, &nested)
    }

    pub fn lookup_type(&self) -> &str {
        &self.lookup_type
    }

    pub fn nested(&self) -> &[String] {
        &self.nested
    }
}

/// Result of resolving a lookup path, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLookup {
    lookup_type: String,
    cast_mode: CastMode,
    retval_kind: FieldKind,
    inner_lookup: Option<FieldLookup>,
}

impl ResolvedLookup {
    pub fn lookup_type(&self) -> &str {
        &self.lookup_type
    }

    pub fn cast_mode(&self) -> CastMode {
        self.cast_mode
    }

    pub fn retval_kind(&self) -> FieldKind {
        self.retval_kind
    }

    pub fn inner_lookup(&self) -> Option<&FieldLookup> {
        self.inner_lookup.as_ref()
    }

    /// Whether this lookup extracts a value by key
    pub fn is_keyed(&self) -> bool {
        self.inner_lookup.is_some()
    }

    /// Render against the hstore expression `lhs`
    ///
    /// Keyed lookups bind the extraction key first, followed by the
    /// parameters of the inner comparison.
    pub fn render(&self, lhs: &str, value: &PostgresValue) -> Result<SqlFragment, StorehausError> {
        let fragment = match &self.inner_lookup {
            Some(inner) => self.render_keyed(inner, lhs, value)?,
            None if self.lookup_type == "exact" => Self::render_exact(lhs, value)?,
            None => Self::render_contains(lhs, value)?,
        };

        if !fragment.is_complete() {
            return Err(StorehausError::invalid_lookup(format!(
                "lookup '{}' rendered {} placeholders for {} parameters in `{}`",
                self.lookup_type,
                fragment.placeholder_count(),
                fragment.params.len(),
                fragment.sql
            )));
        }

        crate::trace_log!(
            "Rendered hstore lookup '{}': {} ({} params)",
            self.lookup_type,
            fragment.sql,
            fragment.params.len()
        );
        Ok(fragment)
    }

    fn render_exact(lhs: &str, value: &PostgresValue) -> Result<SqlFragment, StorehausError> {
        if !value.is_mapping() {
            return Err(StorehausError::invalid_value(format!(
                "exact lookup on an hstore column expects a mapping, got {}",
                value.shape()
            )));
        }
        let map = mapping_to_hstore(value)?;
        Ok(SqlFragment::new(
            format!("{} = {}", lhs, PLACEHOLDER),
            vec![PostgresValue::HStore(map)],
        ))
    }

    fn render_contains(lhs: &str, value: &PostgresValue) -> Result<SqlFragment, StorehausError> {
        match value {
            PostgresValue::Record(_) | PostgresValue::HStore(_) => {
                let map = mapping_to_hstore(value)?;
                Ok(SqlFragment::new(
                    format!("{} @> {}", lhs, PLACEHOLDER),
                    vec![PostgresValue::HStore(map)],
                ))
            }
            PostgresValue::Array(_) | PostgresValue::TextArray(_) => {
                let keys = sequence_to_text_array(value)?;
                if keys.is_empty() {
                    return Err(StorehausError::invalid_value(
                        "contains lookup requires at least one key",
                    ));
                }
                Ok(SqlFragment::new(
                    format!("{} ?& {}", lhs, PLACEHOLDER),
                    vec![PostgresValue::TextArray(keys)],
                ))
            }
            PostgresValue::Text(key) => Ok(SqlFragment::new(
                format!("{} ? {}", lhs, PLACEHOLDER),
                vec![PostgresValue::Text(key.clone())],
            )),
            other => Err(StorehausError::invalid_value(format!(
                "contains lookup expects a mapping, a sequence or a string, got {}",
                other.shape()
            ))),
        }
    }

    fn render_keyed(
        &self,
        inner: &FieldLookup,
        lhs: &str,
        value: &PostgresValue,
    ) -> Result<SqlFragment, StorehausError> {
        let extract = self
            .cast_mode
            .apply(&format!("{} -> {}", lhs, PLACEHOLDER));
        let comparison = inner.render(&extract, self.retval_kind, value)?;

        let mut params = Vec::with_capacity(comparison.params.len() + 1);
        params.push(PostgresValue::Text(self.lookup_type.clone()));
        params.extend(comparison.params);

        Ok(SqlFragment::new(comparison.sql, params))
    }
}

/// Resolves hstore lookup paths against a field lookup registry
#[derive(Clone, Copy)]
pub struct HStoreLookupResolver<'r> {
    registry: &'r dyn LookupRegistry,
}

impl Default for HStoreLookupResolver<'static> {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

impl<'r> HStoreLookupResolver<'r> {
    pub fn new(registry: &'r dyn LookupRegistry) -> Self {
        Self { registry }
    }

    /// Resolve a lookup type and its nested tokens
    pub fn resolve<S: AsRef<str>>(
        &self,
        lookup_type: &str,
        nested: &[S],
    ) -> Result<ResolvedLookup, StorehausError> {
        if lookup_type.is_empty() {
            return Err(StorehausError::invalid_lookup("empty hstore lookup type"));
        }

        if matches!(lookup_type, "exact" | "contains") {
            if !nested.is_empty() {
                return Err(StorehausError::invalid_lookup(format!(
                    "`{}` lookup does not support nesting",
                    lookup_type
                )));
            }
            return Ok(ResolvedLookup {
                lookup_type: lookup_type.to_string(),
                cast_mode: CastMode::None,
                retval_kind: FieldKind::Text,
                inner_lookup: None,
            });
        }

        if nested.len() > MAX_NESTING {
            return Err(Self::too_deep(lookup_type, nested));
        }

        let (cast_mode, rest) = match nested.split_first() {
            Some((first, rest)) => match CastMode::from_token(first.as_ref()) {
                Some(cast) => (cast, rest),
                None => (CastMode::None, nested),
            },
            None => (CastMode::None, nested),
        };
        if rest.len() > 1 {
            return Err(Self::too_deep(lookup_type, nested));
        }

        let comparison = rest
            .first()
            .map(|token| token.as_ref())
            .unwrap_or(DEFAULT_COMPARISON);
        let retval_kind = cast_mode.field_kind();

        let inner = self
            .registry
            .get_lookup(retval_kind, comparison)
            .ok_or_else(|| {
                StorehausError::invalid_lookup(format!(
                    "unknown nested lookup `{}` for {} values under key `{}`",
                    comparison, retval_kind, lookup_type
                ))
            })?;

        crate::debug_log!(
            "Resolved hstore key '{}' with {:?} and '{}' on {}",
            lookup_type,
            cast_mode,
            inner.name(),
            retval_kind
        );

        Ok(ResolvedLookup {
            lookup_type: lookup_type.to_string(),
            cast_mode,
            retval_kind,
            inner_lookup: Some(inner),
        })
    }

    pub fn resolve_request(&self, request: &LookupRequest) -> Result<ResolvedLookup, StorehausError> {
        self.resolve(request.lookup_type(), request.nested())
    }

    /// Resolve a `__`-separated path such as `size__asint__gte`
    pub fn resolve_path(&self, path: &str) -> Result<ResolvedLookup, StorehausError> {
        self.resolve_request(&LookupRequest::parse(path))
    }

    fn too_deep<S: AsRef<str>>(lookup_type: &str, nested: &[S]) -> StorehausError {
        let path: Vec<&str> = nested.iter().map(|t| t.as_ref()).collect();
        StorehausError::invalid_lookup(format!(
            "hstore lookup `{}__{}` is nesting too deep",
            lookup_type,
            path.join(LOOKUP_SEP)
        ))
    }
}
