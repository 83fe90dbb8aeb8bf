//! Identifier types shared by every storefront crate.

mod types;

pub use types::{DocumentId, UserId};

#[doc(hidden)]
pub use uuid as __uuid;
