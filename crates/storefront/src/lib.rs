//! Trellis Storefront data layer.
//!
//! This crate is the client-side state layer behind the Trellis storefront
//! UI: it owns catalog, cart, wishlist, and auth-session state, and talks to
//! the remote catalog service and the external auth provider.
//!
//! # Architecture
//!
//! - [`catalog`] - REST client for the remote catalog service, plus the
//!   combined-filter query builder
//! - [`store`] - the state stores UI components subscribe to
//! - [`services::auth`] - the auth provider boundary and session mirror
//! - [`state`] - the [`state::Storefront`] container bundling all of the above
//!
//! Screens dispatch intents to a store, the store mutates its state and
//! recomputes derived values, and the UI re-renders from a fresh snapshot.
//! Nothing here renders or navigates.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod services;
pub mod state;
pub mod store;
