//! The authenticated principal mirrored from the external auth provider.

use serde::{Deserialize, Serialize};

/// A signed-in user, as reported by the auth provider.
///
/// The ID is an opaque provider-issued string; this system never mints or
/// interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider-issued user ID.
    pub id: String,
    /// Email address the account was created with.
    pub email: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Optional avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}
