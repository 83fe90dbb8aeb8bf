use chrono::{DateTime, Utc};
use common::DocumentId;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;

common::uuid_id! {
    /// Unique identifier for a category.
    pub struct CategoryId;
}

/// Value type of a category attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Text,
    Number,
    Boolean,
    Select,
    Multiselect,
}

/// An attribute that products in a category may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: AttributeKind,

    /// Allowed values for `select` and `multiselect` attributes.
    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub filterable: bool,
}

impl AttributeDefinition {
    /// Creates an optional, non-filterable attribute.
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            options: Vec::new(),
            required: false,
            filterable: false,
        }
    }
}

/// Search engine metadata for a category page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,

    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,

    /// URL-safe form of the name, unique across categories.
    pub slug: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Parent category, or None for a root.
    pub parent: Option<CategoryId>,

    /// Position among siblings; lower sorts first.
    #[serde(default)]
    pub display_order: u32,

    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,

    #[serde(default)]
    pub seo: Option<SeoMetadata>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Category {
    fn collection() -> &'static str {
        "categories"
    }

    fn document_id(&self) -> DocumentId {
        self.id.into()
    }
}

impl Category {
    /// Returns true if the category has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// Name and slug of a related category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// A category with its parent and direct subcategories resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,

    /// None for roots and for categories whose parent no longer exists.
    pub parent_summary: Option<CategorySummary>,

    pub subcategories: Vec<CategorySummary>,
}
