//! State stores backing the storefront UI.
//!
//! Each store is an explicit, injectable container: UI components hold a
//! clone (clones share state) and dispatch intents through a fixed set of
//! mutation operations, then re-render from a [`snapshot`]. No ambient
//! globals.
//!
//! Cart and wishlist mutations are synchronous and applied strictly in call
//! order. Catalog fetches are async; overlapping requests are sequenced by a
//! stale-response guard so the installed view always belongs to the most
//! recently issued request.
//!
//! [`snapshot`]: catalog::CatalogStore::snapshot

pub mod catalog;
pub mod cart;
pub mod wishlist;

pub use catalog::{CatalogState, CatalogStore};
pub use cart::{CartLine, CartState, CartStore};
pub use wishlist::WishlistStore;
