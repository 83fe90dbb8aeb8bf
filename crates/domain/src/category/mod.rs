//! Product categories and the category tree.

mod model;
mod service;
mod tree;

pub use model::{
    AttributeDefinition, AttributeKind, Category, CategoryDetail, CategoryId, CategorySummary,
    SeoMetadata,
};
pub use service::{CategoryOrder, CategoryService, CreateCategory, UpdateCategory};
pub use tree::{CategoryNode, TreeStrategy, build_tree};

use thiserror::Error;

/// Errors that can occur during category operations.
#[derive(Debug, Error)]
pub enum CategoryError {
    /// Categories need a non-blank name.
    #[error("Category name is required")]
    NameRequired,

    /// Another category already uses the slug.
    #[error("Category slug already in use: {slug}")]
    DuplicateSlug { slug: String },

    /// Categories with children cannot be deleted.
    #[error("Cannot delete category {category_id}: it has subcategories")]
    HasSubcategories { category_id: CategoryId },

    /// The requested parent does not exist, or would make the parent graph cyclic.
    #[error("Invalid parent {parent_id} for category: {reason}")]
    InvalidParent {
        parent_id: CategoryId,
        reason: &'static str,
    },

    /// The stored parent chain loops back on itself.
    #[error("Cycle detected in parent chain of category {category_id}")]
    CycleDetected { category_id: CategoryId },
}
