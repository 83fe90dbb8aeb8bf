use crate::Document;

/// Equality filter on a top-level field of the document body.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Name of the top-level body field.
    pub field: String,

    /// Value the field must equal. `Value::Null` also matches a missing field.
    pub value: serde_json::Value,
}

impl FieldFilter {
    /// Creates a new equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true if the document satisfies this filter.
    pub fn matches(&self, document: &Document) -> bool {
        match document.field(&self.field) {
            Some(value) => value == &self.value,
            None => self.value.is_null(),
        }
    }
}

/// Builder for querying documents within a collection.
///
/// Results are returned in creation order, ties broken by document id.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    /// Collection to search.
    pub collection: String,

    /// All filters must match.
    pub filters: Vec<FieldFilter>,

    /// Maximum number of documents to return.
    pub limit: Option<usize>,

    /// Number of documents to skip.
    pub offset: Option<usize>,
}

impl DocumentQuery {
    /// Creates a query over every document in a collection.
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    /// Adds an equality filter on a top-level field.
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.filters.push(FieldFilter::eq(field, value));
        self
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `offset` results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the document belongs to the collection and passes every filter.
    pub fn matches(&self, document: &Document) -> bool {
        document.collection == self.collection && self.filters.iter().all(|f| f.matches(document))
    }
}
