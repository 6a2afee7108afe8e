//! Service-layer boundaries to external collaborators.

pub mod auth;
