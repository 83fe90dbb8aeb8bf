//! Category service.

use std::collections::HashSet;

use chrono::Utc;
use document_store::DocumentStore;
use serde::Deserialize;

use crate::error::DomainError;
use crate::repository::Repository;
use crate::slug::slugify;

use super::{
    AttributeDefinition, Category, CategoryDetail, CategoryError, CategoryId, CategoryNode,
    SeoMetadata, TreeStrategy, build_tree,
};

/// Command to create a category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCategory {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parent: Option<CategoryId>,

    #[serde(default)]
    pub display_order: u32,

    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,

    #[serde(default)]
    pub seo: Option<SeoMetadata>,
}

impl CreateCategory {
    /// Creates a root category command with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Places the category under a parent.
    pub fn with_parent(mut self, parent: CategoryId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the display order.
    pub fn with_display_order(mut self, display_order: u32) -> Self {
        self.display_order = display_order;
        self
    }
}

/// Command to update a category. Fields left as None keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    /// New name; the slug follows it.
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent: Option<CategoryId>,
    pub display_order: Option<u32>,
    pub attributes: Option<Vec<AttributeDefinition>>,
    pub seo: Option<SeoMetadata>,
    pub is_active: Option<bool>,
}

/// New display order for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CategoryOrder {
    pub id: CategoryId,
    pub display_order: u32,
}

/// Service for managing categories.
pub struct CategoryService<S: DocumentStore> {
    categories: Repository<S, Category>,
}

impl<S: DocumentStore> CategoryService<S> {
    /// Creates a new category service with the given document store.
    pub fn new(store: S) -> Self {
        Self {
            categories: Repository::new(store),
        }
    }

    /// Creates a category with a slug derived from its name.
    #[tracing::instrument(skip(self))]
    pub async fn create_category(&self, cmd: CreateCategory) -> Result<Category, DomainError> {
        let name = required_name(&cmd.name)?;
        let slug = slugify(&name);
        self.ensure_slug_free(&slug, None).await?;

        let id = CategoryId::new();
        if let Some(parent_id) = cmd.parent {
            self.validate_parent(id, parent_id).await?;
        }

        let now = Utc::now();
        let category = Category {
            id,
            name,
            slug,
            description: cmd.description,
            parent: cmd.parent,
            display_order: cmd.display_order,
            attributes: cmd.attributes,
            seo: cmd.seo,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.categories.insert(&category).await?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "category created");

        Ok(category)
    }

    /// Applies a partial update.
    #[tracing::instrument(skip(self))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        cmd: UpdateCategory,
    ) -> Result<Category, DomainError> {
        let mut category = self.load_existing(id).await?;

        if let Some(name) = cmd.name {
            let name = required_name(&name)?;
            let slug = slugify(&name);
            if slug != category.slug {
                self.ensure_slug_free(&slug, Some(id)).await?;
            }
            category.name = name;
            category.slug = slug;
        }
        if let Some(parent_id) = cmd.parent {
            self.validate_parent(id, parent_id).await?;
            category.parent = Some(parent_id);
        }
        if let Some(description) = cmd.description {
            category.description = Some(description);
        }
        if let Some(display_order) = cmd.display_order {
            category.display_order = display_order;
        }
        if let Some(attributes) = cmd.attributes {
            category.attributes = attributes;
        }
        if let Some(seo) = cmd.seo {
            category.seo = Some(seo);
        }
        if let Some(is_active) = cmd.is_active {
            category.is_active = is_active;
        }
        category.updated_at = Utc::now();

        self.categories.save(&category).await?;
        Ok(category)
    }

    /// Deletes a category that has no subcategories.
    #[tracing::instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), DomainError> {
        self.load_existing(id).await?;

        if !self.children_of(id).await?.is_empty() {
            return Err(CategoryError::HasSubcategories { category_id: id }.into());
        }

        self.categories.delete(id).await?;
        tracing::info!(category_id = %id, "category deleted");
        Ok(())
    }

    /// Loads a category by slug together with its parent and direct subcategories.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<CategoryDetail>, DomainError> {
        let Some(category) = self.categories.find_by("slug", slug).await?.into_iter().next()
        else {
            return Ok(None);
        };

        let parent_summary = match category.parent {
            Some(parent_id) => self
                .categories
                .load(parent_id)
                .await?
                .map(|parent| parent.summary()),
            None => None,
        };
        let subcategories = self
            .children_of(category.id)
            .await?
            .iter()
            .map(Category::summary)
            .collect();

        Ok(Some(CategoryDetail {
            category,
            parent_summary,
            subcategories,
        }))
    }

    /// Loads a category by ID.
    pub async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, DomainError> {
        self.categories.load(id).await
    }

    /// Returns every category sorted by display order, then name.
    pub async fn list_sorted(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories = self.categories.all().await?;
        categories.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(categories)
    }

    /// Builds the category tree.
    #[tracing::instrument(skip(self))]
    pub async fn list_tree(&self, strategy: TreeStrategy) -> Result<Vec<CategoryNode>, DomainError> {
        let categories = self.list_sorted().await?;
        let tree = build_tree(&categories, strategy);

        metrics::counter!("category_tree_builds_total").increment(1);
        tracing::debug!(
            categories = categories.len(),
            roots = tree.len(),
            "category tree built"
        );

        Ok(tree)
    }

    /// Sets display orders for several categories.
    ///
    /// Every id is checked before anything is written.
    #[tracing::instrument(skip(self))]
    pub async fn reorder(&self, orders: Vec<CategoryOrder>) -> Result<(), DomainError> {
        let mut categories = Vec::with_capacity(orders.len());
        for order in &orders {
            let mut category = self.load_existing(order.id).await?;
            category.display_order = order.display_order;
            category.updated_at = Utc::now();
            categories.push(category);
        }

        for category in &categories {
            self.categories.save(category).await?;
        }

        tracing::info!(count = categories.len(), "categories reordered");
        Ok(())
    }

    /// Returns the names from the root down to the category, joined by `" > "`.
    ///
    /// The path starts at the highest ancestor that still exists.
    #[tracing::instrument(skip(self))]
    pub async fn full_path(&self, id: CategoryId) -> Result<String, DomainError> {
        let category = self.load_existing(id).await?;

        let mut seen = HashSet::from([category.id]);
        let mut path = vec![category.name];
        let mut next = category.parent;

        while let Some(parent_id) = next {
            if !seen.insert(parent_id) {
                return Err(CategoryError::CycleDetected { category_id: id }.into());
            }
            match self.categories.load(parent_id).await? {
                Some(parent) => {
                    path.push(parent.name);
                    next = parent.parent;
                }
                None => break,
            }
        }

        path.reverse();
        Ok(path.join(" > "))
    }

    async fn load_existing(&self, id: CategoryId) -> Result<Category, DomainError> {
        self.categories
            .load(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    async fn children_of(&self, id: CategoryId) -> Result<Vec<Category>, DomainError> {
        self.categories.find_by("parent", id.to_string()).await
    }

    async fn ensure_slug_free(
        &self,
        slug: &str,
        except: Option<CategoryId>,
    ) -> Result<(), DomainError> {
        let taken = self
            .categories
            .find_by("slug", slug)
            .await?
            .iter()
            .any(|other| Some(other.id) != except);

        if taken {
            return Err(CategoryError::DuplicateSlug {
                slug: slug.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Checks that `parent_id` exists and that walking up from it never
    /// reaches `id`.
    async fn validate_parent(&self, id: CategoryId, parent_id: CategoryId) -> Result<(), DomainError> {
        if parent_id == id {
            return Err(CategoryError::InvalidParent {
                parent_id,
                reason: "a category cannot be its own parent",
            }
            .into());
        }

        let Some(parent) = self.categories.load(parent_id).await? else {
            return Err(CategoryError::InvalidParent {
                parent_id,
                reason: "parent does not exist",
            }
            .into());
        };

        let mut seen = HashSet::from([parent_id]);
        let mut next = parent.parent;
        while let Some(ancestor_id) = next {
            if ancestor_id == id {
                return Err(CategoryError::InvalidParent {
                    parent_id,
                    reason: "parent is a descendant of the category",
                }
                .into());
            }
            if !seen.insert(ancestor_id) {
                break;
            }
            next = self
                .categories
                .load(ancestor_id)
                .await?
                .and_then(|ancestor| ancestor.parent);
        }

        Ok(())
    }
}

fn required_name(name: &str) -> Result<String, CategoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CategoryError::NameRequired);
    }
    Ok(name.to_string())
}
