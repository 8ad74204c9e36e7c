//! Immutable query builder for PDK resource collections.
//!
//! A [`Query`] is a declarative specification of filters, exclusions and
//! ordering over one resource type. Every chaining call returns a new query
//! with one appended clause set, leaving the receiver untouched, so a base
//! query can serve as a template for many derived queries without
//! cross-contamination.

use crate::client::SessionInner;
use crate::errors::{PdkResult, RequestError};
use crate::pagination::Cursor;
use crate::types::Record;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: u64 = 500;

/// A clause value.
///
/// Timestamps are rendered as ISO-8601 strings on the wire; the server parses
/// that form, so the encoding rule is part of the protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string value.
    String(String),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// A timestamp value, serialized as ISO-8601.
    Timestamp(DateTime<Utc>),
    /// A null value.
    Null,
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(v) => serializer.serialize_str(v),
            Value::Integer(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Boolean(v) => serializer.serialize_bool(*v),
            Value::Timestamp(v) => {
                serializer.serialize_str(&v.to_rfc3339_opts(SecondsFormat::Micros, false))
            }
            Value::Null => serializer.serialize_none(),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

/// One filter or exclusion term: a mapping from field expression to value,
/// combined with AND semantics within the set.
///
/// Field expressions are field names optionally suffixed with a comparison
/// operator, e.g. `recorded__lte`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClauseSet(BTreeMap<String, Value>);

impl ClauseSet {
    /// Creates an empty clause set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a clause, returning the updated set.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Returns the value for a field expression, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the number of clauses in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set holds no clauses.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The resource collection a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Data points collected by the server.
    DataPoints,
    /// Data sources registered with the server.
    DataSources,
}

impl Resource {
    pub(crate) fn endpoint(self) -> &'static str {
        match self {
            Resource::DataPoints => "api/data-points.json",
            Resource::DataSources => "api/data-sources.json",
        }
    }
}

/// An immutable query specification over one resource collection.
///
/// Obtained from [`PdkClient::query_data_points`] or
/// [`PdkClient::query_data_sources`]; executed lazily through a [`Cursor`].
///
/// [`PdkClient::query_data_points`]: crate::client::PdkClient::query_data_points
/// [`PdkClient::query_data_sources`]: crate::client::PdkClient::query_data_sources
#[derive(Clone)]
pub struct Query {
    pub(crate) session: Arc<SessionInner>,
    pub(crate) resource: Resource,
    pub(crate) page_size: u64,
    pub(crate) filters: Vec<ClauseSet>,
    pub(crate) excludes: Vec<ClauseSet>,
    pub(crate) order_bys: Vec<Vec<String>>,
}

impl Query {
    pub(crate) fn new(session: Arc<SessionInner>, resource: Resource, page_size: u64) -> Self {
        Self {
            session,
            resource,
            page_size,
            filters: Vec::new(),
            excludes: Vec::new(),
            order_bys: Vec::new(),
        }
    }

    /// Returns a new query with a different page size.
    pub fn with_page_size(&self, page_size: u64) -> Query {
        let mut query = self.clone();
        query.page_size = page_size;
        query
    }

    /// Returns a new query with one appended filter clause set.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use integrations_pdk::{ClauseSet, PdkClient};
    /// # fn example(client: &PdkClient) {
    /// let base = client.query_data_points();
    /// let recent = base.filter(ClauseSet::new().with("generator_id", "pdk-location"));
    /// // `base` is unchanged and can seed further queries.
    /// # }
    /// ```
    pub fn filter(&self, clauses: ClauseSet) -> Query {
        let mut query = self.clone();
        query.filters.push(clauses);
        query
    }

    /// Returns a new query with one appended exclusion clause set.
    pub fn exclude(&self, clauses: ClauseSet) -> Query {
        let mut query = self.clone();
        query.excludes.push(clauses);
        query
    }

    /// Returns a new query with one appended ordering directive.
    ///
    /// Fields prefixed with `-` sort descending, following the server's
    /// convention.
    pub fn order_by<I, S>(&self, fields: I) -> Query
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut query = self.clone();
        query
            .order_bys
            .push(fields.into_iter().map(Into::into).collect());
        query
    }

    /// Returns the resource collection this query targets.
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Returns the configured page size.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Returns the filter clause sets in application order.
    pub fn filters(&self) -> &[ClauseSet] {
        &self.filters
    }

    /// Returns the exclusion clause sets in application order.
    pub fn excludes(&self) -> &[ClauseSet] {
        &self.excludes
    }

    /// Returns the ordering directives in application order.
    pub fn order_bys(&self) -> &[Vec<String>] {
        &self.order_bys
    }

    pub(crate) fn serialized_filters(&self) -> PdkResult<String> {
        serialize_clauses(&self.filters)
    }

    pub(crate) fn serialized_excludes(&self) -> PdkResult<String> {
        serialize_clauses(&self.excludes)
    }

    pub(crate) fn serialized_order_bys(&self) -> PdkResult<String> {
        serde_json::to_string(&self.order_bys).map_err(|e| {
            RequestError::ValidationError(format!("failed to serialize order directives: {}", e))
                .into()
        })
    }

    /// Materializes a cursor without fetching anything yet.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.clone())
    }

    /// Begins sequential iteration, eagerly fetching the first page.
    ///
    /// Each call starts a fresh traversal from page zero; cursors are
    /// forward-only and single-pass.
    pub async fn items(&self) -> PdkResult<Cursor> {
        let mut cursor = self.cursor();
        cursor.load_page(0).await?;
        Ok(cursor)
    }

    /// Returns the total number of matches.
    pub async fn count(&self) -> PdkResult<u64> {
        let mut cursor = self.cursor();
        cursor.count().await
    }

    /// Returns the first match.
    pub async fn first(&self) -> PdkResult<Record> {
        let mut cursor = self.cursor();
        cursor.first().await
    }

    /// Returns the last match.
    pub async fn last(&self) -> PdkResult<Record> {
        let mut cursor = self.cursor();
        cursor.last().await
    }

    /// Drains the full result set into a vector.
    pub async fn collect_all(&self) -> PdkResult<Vec<Record>> {
        let mut cursor = self.items().await?;
        cursor.collect_all().await
    }

    /// Range access is not supported by the PDK wire protocol; the request is
    /// logged and an empty result returned.
    pub fn slice(&self, range: Range<u64>) -> Vec<Record> {
        self.cursor().slice(range)
    }
}

fn serialize_clauses(clauses: &[ClauseSet]) -> PdkResult<String> {
    serde_json::to_string(clauses).map_err(|e| {
        RequestError::ValidationError(format!("failed to serialize clause sets: {}", e)).into()
    })
}
