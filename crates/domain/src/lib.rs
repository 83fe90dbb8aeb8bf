//! Domain layer for the storefront backend.
//!
//! This crate provides:
//! - `Entity` and `Repository` for whole-document persistence
//! - the cart aggregate, whose totals always follow its line items
//! - the product catalog consulted for prices and stock
//! - categories and the category tree builder

pub mod cart;
pub mod category;
pub mod entity;
pub mod error;
pub mod product;
pub mod repository;
mod slug;

pub use cart::{
    AddCartItem, ApplyDiscount, Cart, CartError, CartLineItem, CartService, ClearCart, Discount,
    ItemId, Money, RemoveCartItem, SetShipping, SetTax, ShippingSelection, UpdateCartItem,
    VariantSelector,
};
pub use category::{
    AttributeDefinition, AttributeKind, Category, CategoryDetail, CategoryError, CategoryId,
    CategoryNode, CategoryOrder, CategoryService, CategorySummary, CreateCategory, SeoMetadata,
    TreeStrategy, UpdateCategory, build_tree,
};
pub use common::UserId;
pub use entity::Entity;
pub use error::DomainError;
pub use product::{
    CreateProduct, InMemoryProductCatalog, Product, ProductCatalog, ProductError, ProductFilter,
    ProductId, ProductPage, ProductService, ProductSnapshot, ProductSort, StoredProductCatalog,
    UpdateProduct,
};
pub use repository::Repository;
pub use slug::slugify;
