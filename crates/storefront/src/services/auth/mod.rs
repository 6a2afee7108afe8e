//! Auth session mirror over the external identity provider.
//!
//! This system does not implement authentication. It validates input shape
//! locally (email structure, password length), forwards sign-up/sign-in/
//! sign-out to the provider, and mirrors the provider's current-principal
//! notifications into [`AuthState`]. Credentials and tokens never live here.

mod error;
mod provider;

pub use error::AuthError;
pub use provider::RestAuthProvider;

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::error;

use trellis_core::{Email, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Auth state as seen by the UI.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    /// The mirrored principal, if signed in.
    pub user: Option<User>,
    /// True while an auth request is in flight.
    pub is_loading: bool,
    /// Failure reason from the last auth operation, verbatim from the
    /// provider where it supplied one.
    pub error: Option<String>,
}

/// The external identity provider, treated as a black box.
///
/// The only contract asserted here: after each state-change notification,
/// exactly one of "authenticated as U" or "unauthenticated" is observable.
pub trait AuthProvider {
    /// Create an account and sign the new user in.
    fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: Option<&str>,
    ) -> impl Future<Output = Result<User, AuthError>> + Send;

    /// Sign an existing user in.
    fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<User, AuthError>> + Send;

    /// Sign the current user out.
    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Subscribe to current-principal changes.
    fn subscribe(&self) -> watch::Receiver<Option<User>>;
}

/// Mirrors the provider's session state into local [`AuthState`].
///
/// Cheaply cloneable; clones share state.
pub struct SessionMirror<P> {
    inner: Arc<SessionMirrorInner<P>>,
}

impl<P> Clone for SessionMirror<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SessionMirrorInner<P> {
    provider: P,
    state: Mutex<AuthState>,
}

impl<P: AuthProvider> SessionMirror<P> {
    /// Create a mirror over the given provider.
    pub fn new(provider: P) -> Self {
        Self {
            inner: Arc::new(SessionMirrorInner {
                provider,
                state: Mutex::new(AuthState::default()),
            }),
        }
    }

    /// A copy of the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AuthState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) {
        let mut state = self.lock();
        state.is_loading = true;
        state.error = None;
    }

    fn finish(&self, result: &Result<User, AuthError>) {
        let mut state = self.lock();
        state.is_loading = false;
        match result {
            Ok(user) => {
                state.user = Some(user.clone());
                state.error = None;
            }
            Err(err) => {
                error!(error = %err, "auth operation failed");
                state.error = Some(err.to_string());
            }
        }
    }

    /// Register a new account and sign in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::WeakPassword` before
    /// any provider call, or the provider's failure reason. Either way the
    /// failure is also recorded in the state's `error` field.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, AuthError> {
        self.begin();
        let result = async {
            let email = Email::parse(email)?;
            validate_password(password)?;
            self.inner
                .provider
                .sign_up(&email, password, display_name)
                .await
        }
        .await;
        self.finish(&result);
        result
    }

    /// Sign an existing user in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed address, or the
    /// provider's failure reason (default-deny: on any failure the mirrored
    /// principal is left unchanged).
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.begin();
        let result = async {
            let email = Email::parse(email)?;
            self.inner.provider.sign_in(&email, password).await
        }
        .await;
        self.finish(&result);
        result
    }

    /// Sign the current user out and clear the mirrored principal.
    ///
    /// # Errors
    ///
    /// Returns the provider's failure reason; the principal is only cleared
    /// on success.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.begin();
        let result = self.inner.provider.sign_out().await;
        let mut state = self.lock();
        state.is_loading = false;
        match &result {
            Ok(()) => {
                state.user = None;
                state.error = None;
            }
            Err(err) => {
                error!(error = %err, "sign-out failed");
                state.error = Some(err.to_string());
            }
        }
        result
    }

    /// Follow the provider's state-change notifications forever, mirroring
    /// each one atomically. Run this on a background task.
    pub async fn run(&self) {
        let mut rx = self.inner.provider.subscribe();
        self.apply(rx.borrow().clone());
        while rx.changed().await.is_ok() {
            let user = rx.borrow_and_update().clone();
            self.apply(user);
        }
    }

    /// Install a mirrored principal: exactly one of "authenticated as U" or
    /// "unauthenticated", in one state update.
    fn apply(&self, user: Option<User>) {
        let mut state = self.lock();
        state.user = user;
        state.is_loading = false;
    }
}

/// Validate a candidate password before it reaches the provider.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Provider fake: scripted outcomes, plus a principal channel the test
    /// can drive directly to simulate out-of-band state changes.
    struct FakeProvider {
        accept_password: String,
        current: watch::Sender<Option<User>>,
    }

    impl FakeProvider {
        fn new(accept_password: &str) -> Self {
            Self {
                accept_password: accept_password.to_owned(),
                current: watch::channel(None).0,
            }
        }

        fn user_for(email: &Email) -> User {
            User {
                id: format!("uid-{}", email.local_part()),
                email: email.as_str().to_owned(),
                display_name: None,
                photo_url: None,
            }
        }
    }

    impl AuthProvider for FakeProvider {
        async fn sign_up(
            &self,
            email: &Email,
            _password: &str,
            display_name: Option<&str>,
        ) -> Result<User, AuthError> {
            let mut user = Self::user_for(email);
            user.display_name = display_name.map(str::to_owned);
            self.current.send_replace(Some(user.clone()));
            Ok(user)
        }

        async fn sign_in(&self, email: &Email, password: &str) -> Result<User, AuthError> {
            if password == self.accept_password {
                let user = Self::user_for(email);
                self.current.send_replace(Some(user.clone()));
                Ok(user)
            } else {
                Err(AuthError::InvalidCredentials)
            }
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            self.current.send_replace(None);
            Ok(())
        }

        fn subscribe(&self) -> watch::Receiver<Option<User>> {
            self.current.subscribe()
        }
    }

    #[tokio::test]
    async fn test_sign_in_success_mirrors_user() {
        let mirror = SessionMirror::new(FakeProvider::new("hunter22hunter22"));

        let user = mirror
            .sign_in("user@example.com", "hunter22hunter22")
            .await
            .unwrap();
        assert_eq!(user.email, "user@example.com");

        let state = mirror.snapshot();
        assert_eq!(state.user.unwrap().id, "uid-user");
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_sign_in_failure_is_default_deny() {
        let mirror = SessionMirror::new(FakeProvider::new("correct-password-1"));

        let result = mirror.sign_in("user@example.com", "wrong-password-1").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        let state = mirror.snapshot();
        assert!(state.user.is_none());
        assert!(!state.is_loading);
        assert_eq!(state.error.unwrap(), "invalid credentials");
    }

    #[tokio::test]
    async fn test_sign_up_validates_locally_first() {
        let mirror = SessionMirror::new(FakeProvider::new("whatever"));

        let result = mirror.sign_up("not-an-email", "longenough1", None).await;
        assert!(matches!(result, Err(AuthError::InvalidEmail(_))));

        let result = mirror.sign_up("user@example.com", "short", None).await;
        assert!(matches!(result, Err(AuthError::WeakPassword(_))));
        assert!(mirror.snapshot().error.is_some());
    }

    #[tokio::test]
    async fn test_sign_up_carries_display_name() {
        let mirror = SessionMirror::new(FakeProvider::new("whatever"));

        let user = mirror
            .sign_up("user@example.com", "longenough1", Some("Sam"))
            .await
            .unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Sam"));
    }

    #[tokio::test]
    async fn test_sign_out_clears_principal() {
        let mirror = SessionMirror::new(FakeProvider::new("hunter22hunter22"));
        mirror
            .sign_in("user@example.com", "hunter22hunter22")
            .await
            .unwrap();

        mirror.sign_out().await.unwrap();

        let state = mirror.snapshot();
        assert!(state.user.is_none());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_run_mirrors_out_of_band_changes() {
        let provider = FakeProvider::new("whatever");
        let principal = provider.current.clone();
        let mirror = SessionMirror::new(provider);

        let background = mirror.clone();
        let task = tokio::spawn(async move { background.run().await });

        principal.send_replace(Some(User {
            id: "uid-42".to_owned(),
            email: "user@example.com".to_owned(),
            display_name: None,
            photo_url: None,
        }));
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert_eq!(mirror.snapshot().user.unwrap().id, "uid-42");

        principal.send_replace(None);
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert!(mirror.snapshot().user.is_none());

        task.abort();
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345678").is_ok());
        assert!(matches!(
            validate_password("1234567"),
            Err(AuthError::WeakPassword(_))
        ));
    }
}
