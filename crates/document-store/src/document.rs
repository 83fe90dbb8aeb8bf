use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::DocumentId;

/// Revision number of a stored document.
///
/// A document that has never been written is at version 0; the first put
/// stores version 1 and every later put increments by one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) of a document that does not exist yet.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the version (1) stored by the first put.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// A stored document together with its bookkeeping columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Key of the document within its collection.
    pub id: DocumentId,

    /// Collection the document belongs to (e.g. "carts", "categories").
    pub collection: String,

    /// Current revision.
    pub version: Version,

    /// When the document was first written.
    pub created_at: DateTime<Utc>,

    /// When the document was last replaced.
    pub updated_at: DateTime<Utc>,

    /// The JSON body.
    pub body: serde_json::Value,
}

impl Document {
    /// Deserializes the body into a concrete type.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }

    /// Consumes the document and deserializes its body.
    pub fn into_body<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body)
    }

    /// Returns the value of a top-level body field, if present.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.body.get(name)
    }
}
