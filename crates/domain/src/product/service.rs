//! Product service.

use std::str::FromStr;

use chrono::Utc;
use document_store::DocumentStore;

use crate::cart::Money;
use crate::category::{Category, CategoryId};
use crate::error::DomainError;
use crate::repository::Repository;
use crate::slug::slugify;

use super::{Product, ProductError, ProductId};

/// Page size used when a listing does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page a listing returns.
pub const MAX_PAGE_SIZE: usize = 100;

/// Command to create a product.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<CategoryId>,
    pub brand: Option<String>,
    pub price: Money,
    pub stock: u32,
}

impl CreateProduct {
    /// Creates a new CreateProduct command.
    pub fn new(name: impl Into<String>, price: Money, stock: u32) -> Self {
        Self {
            name: name.into(),
            description: None,
            category: None,
            brand: None,
            price,
            stock,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Lists the product under a category.
    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the brand.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }
}

/// Partial update of a product. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    /// New name; the slug follows it.
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<CategoryId>,
    pub brand: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<u32>,

    /// Inactive products stay stored but drop out of listings and carts.
    pub is_active: Option<bool>,
}

/// Ordering of a product listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    /// Most recently created first.
    #[default]
    Newest,
    Oldest,
    PriceLowToHigh,
    PriceHighToLow,
    Name,
}

impl ProductSort {
    fn apply(self, products: &mut [Product]) {
        match self {
            ProductSort::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ProductSort::Oldest => products.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            ProductSort::PriceLowToHigh => products.sort_by_key(|product| product.price),
            ProductSort::PriceHighToLow => products.sort_by(|a, b| b.price.cmp(&a.price)),
            ProductSort::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
        }
    }
}

impl FromStr for ProductSort {
    type Err = String;

    /// Accepts `newest`, `oldest`, `price`, `-price` and `name`, plus the
    /// `createdAt`/`-createdAt` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" | "-createdAt" => Ok(ProductSort::Newest),
            "oldest" | "createdAt" => Ok(ProductSort::Oldest),
            "price" => Ok(ProductSort::PriceLowToHigh),
            "-price" => Ok(ProductSort::PriceHighToLow),
            "name" => Ok(ProductSort::Name),
            other => Err(format!("Unknown product sort: {other}")),
        }
    }
}

/// Filters, ordering and page selection for [`ProductService::list_products`].
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    pub brand: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,

    /// Only products with at least one unit in stock.
    pub in_stock: bool,
    pub sort: ProductSort,

    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category: None,
            brand: None,
            min_price: None,
            max_price: None,
            in_stock: false,
            sort: ProductSort::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        product.is_active
            && self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
            && (!self.in_stock || product.stock > 0)
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_products: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

/// Service for managing products.
pub struct ProductService<S: DocumentStore> {
    products: Repository<S, Product>,
    categories: Repository<S, Category>,
}

impl<S: DocumentStore + Clone> ProductService<S> {
    /// Creates a new product service with the given document store.
    pub fn new(store: S) -> Self {
        Self {
            products: Repository::new(store.clone()),
            categories: Repository::new(store),
        }
    }
}

impl<S: DocumentStore> ProductService<S> {
    /// Creates an active product with a slug derived from its name.
    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<Product, DomainError> {
        let name = required_name(&cmd.name)?;
        ensure_price(cmd.price)?;
        let slug = slugify(&name);
        self.ensure_slug_free(&slug, None).await?;
        if let Some(category_id) = cmd.category {
            self.ensure_category(category_id).await?;
        }

        let product = Product {
            id: ProductId::new(),
            name,
            slug,
            description: cmd.description,
            category: cmd.category,
            brand: cmd.brand,
            price: cmd.price,
            stock: cmd.stock,
            is_active: true,
            created_at: Utc::now(),
        };

        self.products.insert(&product).await?;
        tracing::info!(product_id = %product.id, slug = %product.slug, "product created");

        Ok(product)
    }

    /// Loads a product by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, DomainError> {
        self.products.load(product_id).await
    }

    /// Loads a product by slug.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError> {
        Ok(self.products.find_by("slug", slug).await?.into_iter().next())
    }

    /// Returns one page of active products matching the filter.
    ///
    /// `page` counts from 1 and `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> Result<ProductPage, DomainError> {
        let mut fields = Vec::new();
        if let Some(category_id) = filter.category {
            fields.push(("category", serde_json::Value::from(category_id.to_string())));
        }
        if let Some(brand) = &filter.brand {
            fields.push(("brand", serde_json::Value::from(brand.as_str())));
        }

        let mut products: Vec<Product> = self
            .products
            .find_matching(fields)
            .await?
            .into_iter()
            .filter(|product| filter.matches(product))
            .collect();
        filter.sort.apply(&mut products);

        let limit = filter.limit.clamp(1, MAX_PAGE_SIZE);
        let page = filter.page.max(1);
        let total_products = products.len();
        let products = products
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(ProductPage {
            products,
            total_products,
            total_pages: total_products.div_ceil(limit),
            current_page: page,
        })
    }

    /// Applies a partial update. Renaming re-derives the slug.
    #[tracing::instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        cmd: UpdateProduct,
    ) -> Result<Product, DomainError> {
        let mut product = self.load_existing(id).await?;

        if let Some(name) = cmd.name {
            let name = required_name(&name)?;
            let slug = slugify(&name);
            if slug != product.slug {
                self.ensure_slug_free(&slug, Some(id)).await?;
            }
            product.name = name;
            product.slug = slug;
        }
        if let Some(price) = cmd.price {
            ensure_price(price)?;
            product.price = price;
        }
        if let Some(category_id) = cmd.category {
            self.ensure_category(category_id).await?;
            product.category = Some(category_id);
        }
        if let Some(description) = cmd.description {
            product.description = Some(description);
        }
        if let Some(brand) = cmd.brand {
            product.brand = Some(brand);
        }
        if let Some(stock) = cmd.stock {
            product.stock = stock;
        }
        if let Some(is_active) = cmd.is_active {
            product.is_active = is_active;
        }

        self.products.save(&product).await?;
        tracing::info!(product_id = %id, "product updated");
        Ok(product)
    }

    /// Deletes a product.
    ///
    /// Cart lines that still point at it fail their next catalog lookup.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), DomainError> {
        self.load_existing(id).await?;
        self.products.delete(id).await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    async fn load_existing(&self, id: ProductId) -> Result<Product, DomainError> {
        self.products
            .load(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    async fn ensure_slug_free(
        &self,
        slug: &str,
        except: Option<ProductId>,
    ) -> Result<(), DomainError> {
        let taken = self
            .products
            .find_by("slug", slug)
            .await?
            .iter()
            .any(|other| Some(other.id) != except);

        if taken {
            return Err(ProductError::DuplicateSlug {
                slug: slug.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn ensure_category(&self, category_id: CategoryId) -> Result<(), DomainError> {
        if self.categories.load(category_id).await?.is_none() {
            return Err(ProductError::CategoryNotFound { category_id }.into());
        }
        Ok(())
    }
}

fn required_name(name: &str) -> Result<String, ProductError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProductError::NameRequired);
    }
    Ok(name.to_string())
}

fn ensure_price(price: Money) -> Result<(), ProductError> {
    if price.is_negative() {
        return Err(ProductError::NegativePrice { price });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{CategoryService, CreateCategory};
    use document_store::InMemoryDocumentStore;

    fn service() -> ProductService<InMemoryDocumentStore> {
        ProductService::new(InMemoryDocumentStore::new())
    }

    async fn create(
        service: &ProductService<InMemoryDocumentStore>,
        name: &str,
        price_cents: i64,
        stock: u32,
    ) -> Product {
        service
            .create_product(CreateProduct::new(name, Money::from_cents(price_cents), stock))
            .await
            .unwrap()
    }

    fn names(page: &ProductPage) -> Vec<&str> {
        page.products.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let service = service();

        let product = service
            .create_product(
                CreateProduct::new("Desk Lamp", Money::from_cents(2999), 12)
                    .with_description("Warm light")
                    .with_brand("Lumen"),
            )
            .await
            .unwrap();

        assert_eq!(product.slug, "desk-lamp");
        assert_eq!(product.brand.as_deref(), Some("Lumen"));
        assert!(product.is_active);

        let loaded = service.get_product(product.id).await.unwrap();
        assert_eq!(loaded, Some(product.clone()));

        let by_slug = service.get_by_slug("desk-lamp").await.unwrap();
        assert_eq!(by_slug, Some(product));
        assert!(service.get_by_slug("floor-lamp").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_product_validation() {
        let service = service();

        let result = service
            .create_product(CreateProduct::new("  ", Money::from_cents(100), 1))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Product(ProductError::NameRequired))
        ));

        let result = service
            .create_product(CreateProduct::new("Lamp", Money::from_cents(-1), 1))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Product(ProductError::NegativePrice { .. }))
        ));

        let result = service
            .create_product(
                CreateProduct::new("Lamp", Money::from_cents(100), 1)
                    .with_category(CategoryId::new()),
            )
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Product(ProductError::CategoryNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let service = service();
        create(&service, "Desk Lamp", 100, 1).await;

        let result = service
            .create_product(CreateProduct::new("desk lamp", Money::from_cents(100), 1))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Product(ProductError::DuplicateSlug { .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let service = service();
        assert!(service.get_product(ProductId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_product() {
        let service = service();
        let lamp = create(&service, "Desk Lamp", 2999, 5).await;
        create(&service, "Floor Lamp", 5999, 5).await;

        let updated = service
            .update_product(
                lamp.id,
                UpdateProduct {
                    name: Some("Reading Lamp".to_string()),
                    price: Some(Money::from_cents(2499)),
                    stock: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.slug, "reading-lamp");
        assert_eq!(updated.price.cents(), 2499);
        assert_eq!(updated.stock, 0);
        assert_eq!(updated.created_at, lamp.created_at);
        assert_eq!(service.get_product(lamp.id).await.unwrap(), Some(updated));

        let result = service
            .update_product(
                lamp.id,
                UpdateProduct {
                    name: Some("Floor Lamp".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Product(ProductError::DuplicateSlug { .. }))
        ));

        let result = service
            .update_product(
                lamp.id,
                UpdateProduct {
                    price: Some(Money::from_cents(-1)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Product(ProductError::NegativePrice { .. }))
        ));

        let result = service
            .update_product(ProductId::new(), UpdateProduct::default())
            .await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_product() {
        let service = service();
        let lamp = create(&service, "Desk Lamp", 2999, 5).await;

        service.delete_product(lamp.id).await.unwrap();
        assert!(service.get_product(lamp.id).await.unwrap().is_none());

        let result = service.delete_product(lamp.id).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let store = InMemoryDocumentStore::new();
        let service = ProductService::new(store.clone());
        let lighting = CategoryService::new(store)
            .create_category(CreateCategory::new("Lighting"))
            .await
            .unwrap();

        service
            .create_product(
                CreateProduct::new("Desk Lamp", Money::from_cents(2999), 4)
                    .with_category(lighting.id)
                    .with_brand("Lumen"),
            )
            .await
            .unwrap();
        service
            .create_product(
                CreateProduct::new("Floor Lamp", Money::from_cents(8999), 0)
                    .with_category(lighting.id),
            )
            .await
            .unwrap();
        let mug = create(&service, "Mug", 999, 20).await;
        let retired = create(&service, "Old Mug", 499, 3).await;
        service
            .update_product(
                retired.id,
                UpdateProduct {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let all = service
            .list_products(ProductFilter {
                sort: ProductSort::Name,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(names(&all), vec!["Desk Lamp", "Floor Lamp", "Mug"]);
        assert_eq!(all.total_products, 3);

        let in_category = service
            .list_products(ProductFilter {
                category: Some(lighting.id),
                in_stock: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(names(&in_category), vec!["Desk Lamp"]);

        let by_brand = service
            .list_products(ProductFilter {
                brand: Some("Lumen".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(names(&by_brand), vec!["Desk Lamp"]);

        let cheap = service
            .list_products(ProductFilter {
                min_price: Some(Money::from_cents(500)),
                max_price: Some(Money::from_cents(2999)),
                sort: ProductSort::PriceHighToLow,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(names(&cheap), vec!["Desk Lamp", "Mug"]);
        assert_eq!(cheap.products[1].id, mug.id);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let service = service();
        for i in 0..7 {
            create(&service, &format!("Item {i}"), 100 * (i + 1), 1).await;
        }

        let first = service
            .list_products(ProductFilter {
                sort: ProductSort::PriceLowToHigh,
                limit: 3,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(names(&first), vec!["Item 0", "Item 1", "Item 2"]);
        assert_eq!(first.total_products, 7);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.current_page, 1);

        let last = service
            .list_products(ProductFilter {
                sort: ProductSort::PriceLowToHigh,
                page: 3,
                limit: 3,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(names(&last), vec!["Item 6"]);

        let beyond = service
            .list_products(ProductFilter {
                page: 9,
                limit: 3,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(beyond.products.is_empty());
        assert_eq!(beyond.total_pages, 3);

        let clamped = service
            .list_products(ProductFilter {
                page: 0,
                limit: 0,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(clamped.current_page, 1);
        assert_eq!(clamped.products.len(), 1);
        assert_eq!(clamped.total_pages, 7);
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!("-createdAt".parse::<ProductSort>(), Ok(ProductSort::Newest));
        assert_eq!("oldest".parse::<ProductSort>(), Ok(ProductSort::Oldest));
        assert_eq!("price".parse::<ProductSort>(), Ok(ProductSort::PriceLowToHigh));
        assert_eq!("-price".parse::<ProductSort>(), Ok(ProductSort::PriceHighToLow));
        assert!("rating".parse::<ProductSort>().is_err());
    }
}
