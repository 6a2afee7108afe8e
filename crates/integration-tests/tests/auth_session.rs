//! Auth session scenarios across the assembled state layer.
//!
//! Sign-up, sign-in, and sign-out flow through the `Storefront`'s session
//! mirror against a scripted identity provider; the mirror's snapshot is the
//! state a screen would render.

#![allow(clippy::unwrap_used)]

use trellis_core::User;
use trellis_integration_tests::{InMemoryCatalog, ScriptedAuthProvider, test_config};
use trellis_storefront::services::auth::AuthError;
use trellis_storefront::state::Storefront;

fn storefront_with(provider: ScriptedAuthProvider) -> Storefront<InMemoryCatalog, ScriptedAuthProvider> {
    Storefront::from_parts(
        test_config(),
        InMemoryCatalog::new(Vec::new(), Vec::new()),
        provider,
    )
}

#[tokio::test]
async fn test_sign_up_then_sign_out() {
    let app = storefront_with(ScriptedAuthProvider::new());

    let user = app
        .session()
        .sign_up("ada@example.com", "correct-horse-battery", Some("Ada"))
        .await
        .unwrap();
    assert_eq!(user.display_name.as_deref(), Some("Ada"));

    let state = app.session().snapshot();
    assert_eq!(state.user.as_ref().unwrap().email, "ada@example.com");
    assert!(!state.is_loading);
    assert!(state.error.is_none());

    app.session().sign_out().await.unwrap();
    assert!(app.session().snapshot().user.is_none());
}

#[tokio::test]
async fn test_duplicate_sign_up_is_rejected() {
    let provider = ScriptedAuthProvider::new();
    provider.register("ada@example.com", "correct-horse-battery");
    let app = storefront_with(provider);

    let result = app
        .session()
        .sign_up("ada@example.com", "another-password-9", None)
        .await;
    assert!(matches!(result, Err(AuthError::EmailInUse)));

    let state = app.session().snapshot();
    assert!(state.user.is_none());
    assert_eq!(
        state.error.as_deref(),
        Some("an account with this email already exists")
    );
}

#[tokio::test]
async fn test_sign_in_with_wrong_password_is_denied() {
    let provider = ScriptedAuthProvider::new();
    provider.register("ada@example.com", "correct-horse-battery");
    let app = storefront_with(provider);

    let result = app
        .session()
        .sign_in("ada@example.com", "wrong-horse-battery")
        .await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    assert!(app.session().snapshot().user.is_none());
}

#[tokio::test]
async fn test_malformed_email_never_reaches_the_provider() {
    let app = storefront_with(ScriptedAuthProvider::new());

    let result = app.session().sign_in("not-an-email", "whatever-pass").await;
    assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
    assert!(app.session().snapshot().error.is_some());
}

#[tokio::test]
async fn test_mirror_follows_out_of_band_provider_changes() {
    trellis_integration_tests::init_tracing();
    let provider = ScriptedAuthProvider::new();
    let principal = provider.principal();
    let app = storefront_with(provider);

    let session = app.session().clone();
    let task = tokio::spawn(async move { session.run().await });

    principal.send_replace(Some(User {
        id: "uid-remote".to_owned(),
        email: "remote@example.com".to_owned(),
        display_name: None,
        photo_url: None,
    }));
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    assert_eq!(app.session().snapshot().user.unwrap().id, "uid-remote");

    principal.send_replace(None);
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    assert!(app.session().snapshot().user.is_none());

    task.abort();
}

#[tokio::test]
async fn test_cart_and_wishlist_are_unaffected_by_session_changes() {
    let provider = ScriptedAuthProvider::new();
    provider.register("ada@example.com", "correct-horse-battery");
    let app = storefront_with(provider);

    app.wishlist().add(trellis_core::ProductId::new(7));

    app.session()
        .sign_in("ada@example.com", "correct-horse-battery")
        .await
        .unwrap();
    app.session().sign_out().await.unwrap();

    // Local shopping state is per-device, not per-account
    assert!(app.wishlist().contains(trellis_core::ProductId::new(7)));
}
