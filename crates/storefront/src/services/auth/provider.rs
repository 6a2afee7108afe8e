//! REST client for the external identity provider.
//!
//! Consumes an identity-toolkit-style HTTP contract: account endpoints keyed
//! by an API key query parameter, JSON request/response bodies, and error
//! reasons reported as upper-snake-case message codes. Tokens returned by
//! the provider are used only to complete the current call (profile update
//! on sign-up); nothing is stored.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::instrument;

use trellis_core::{Email, User};

use crate::config::{AuthConfig, DEFAULT_REQUEST_TIMEOUT_SECS};

use super::{AuthError, AuthProvider};

/// Identity provider client.
///
/// Cheaply cloneable; clones share the HTTP connection pool and the
/// current-principal channel.
#[derive(Clone)]
pub struct RestAuthProvider {
    inner: Arc<RestAuthProviderInner>,
}

struct RestAuthProviderInner {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    current: watch::Sender<Option<User>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUpdateRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl RestAuthProvider {
    /// Create a provider client from configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            inner: Arc::new(RestAuthProviderInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint.as_str().trim_end_matches('/').to_owned(),
                api_key: config.api_key.clone(),
                current,
            }),
        }
    }

    /// Call an account endpoint and decode the response, mapping provider
    /// error codes onto [`AuthError`].
    async fn call_account_endpoint<B: Serialize>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<AccountResponse, AuthError> {
        let url = format!("{}/accounts:{action}", self.inner.endpoint);

        let response = self
            .inner
            .client
            .post(url)
            .query(&[("key", self.inner.api_key.expose_secret())])
            .json(body)
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let reason = response
                .json::<ErrorResponse>()
                .await
                .map_or_else(|_| format!("HTTP {status}"), |body| body.error.message);
            return Err(map_provider_reason(reason));
        }

        response.json::<AccountResponse>().await.map_err(map_transport_error)
    }

    fn install_principal(&self, user: &User) {
        self.inner.current.send_replace(Some(user.clone()));
    }
}

impl AuthProvider for RestAuthProvider {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, AuthError> {
        let account = self
            .call_account_endpoint(
                "signUp",
                &CredentialsRequest {
                    email: email.as_str(),
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        // Display names are a separate profile update on this contract
        let display_name = match (display_name, account.id_token.as_deref()) {
            (Some(name), Some(id_token)) => {
                let updated = self
                    .call_account_endpoint(
                        "update",
                        &ProfileUpdateRequest {
                            id_token,
                            display_name: name,
                            return_secure_token: false,
                        },
                    )
                    .await?;
                updated.display_name
            }
            _ => account.display_name,
        };

        let user = User {
            id: account.local_id,
            email: account.email,
            display_name,
            photo_url: account.photo_url,
        };
        self.install_principal(&user);
        Ok(user)
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(&self, email: &Email, password: &str) -> Result<User, AuthError> {
        let account = self
            .call_account_endpoint(
                "signInWithPassword",
                &CredentialsRequest {
                    email: email.as_str(),
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        let user = User {
            id: account.local_id,
            email: account.email,
            display_name: account.display_name,
            photo_url: account.photo_url,
        };
        self.install_principal(&user);
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), AuthError> {
        // Stateless contract: no server-side session to revoke. Dropping the
        // principal is the whole operation.
        self.inner.current.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.inner.current.subscribe()
    }
}

/// Classify a transport-level reqwest failure.
fn map_transport_error(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        AuthError::Timeout
    } else {
        AuthError::Http(err)
    }
}

/// Map a provider failure reason onto the error taxonomy.
///
/// Unknown reasons pass through verbatim so the caller can decide whether to
/// attach them to a field or show a generic notice.
fn map_provider_reason(reason: String) -> AuthError {
    match reason.as_str() {
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            AuthError::InvalidCredentials
        }
        r if r.starts_with("WEAK_PASSWORD") => AuthError::WeakPassword(reason),
        _ => AuthError::Provider(reason),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_map_provider_reason() {
        assert!(matches!(
            map_provider_reason("EMAIL_EXISTS".to_owned()),
            AuthError::EmailInUse
        ));
        assert!(matches!(
            map_provider_reason("INVALID_LOGIN_CREDENTIALS".to_owned()),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            map_provider_reason("WEAK_PASSWORD : Password should be at least 6 characters".to_owned()),
            AuthError::WeakPassword(_)
        ));
        assert!(matches!(
            map_provider_reason("TOO_MANY_ATTEMPTS_TRY_LATER".to_owned()),
            AuthError::Provider(_)
        ));
    }

    #[test]
    fn test_unknown_reason_is_verbatim() {
        let err = map_provider_reason("OPERATION_NOT_ALLOWED".to_owned());
        assert_eq!(err.to_string(), "auth provider error: OPERATION_NOT_ALLOWED");
    }

    #[test]
    fn test_account_response_shape() {
        let json = r#"{
            "localId": "uid-1",
            "email": "user@example.com",
            "idToken": "tok",
            "refreshToken": "ignored",
            "expiresIn": "3600"
        }"#;
        let account: AccountResponse = serde_json::from_str(json).unwrap();
        assert_eq!(account.local_id, "uid-1");
        assert_eq!(account.id_token.as_deref(), Some("tok"));
        assert!(account.display_name.is_none());
    }
}
