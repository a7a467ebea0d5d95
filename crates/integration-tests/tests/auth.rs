//! Login outcomes and their classification.

#![allow(clippy::unwrap_used)]

use erp_storefront_client::{
    AuthFailure, ErpConfig, ErpError, RetryPolicy, classify_auth_failure,
};
use erp_storefront_integration_tests::{ErpSite, client_for};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn login_responds(site: &ErpSite, status: u16, body: Option<Value>) {
    let template = match body {
        Some(body) => ResponseTemplate::new(status).set_body_json(body),
        None => ResponseTemplate::new(status),
    };
    Mock::given(method("POST"))
        .and(path("/api/method/login"))
        .respond_with(template)
        .mount(&site.server)
        .await;
}

async fn login_failure(site: &ErpSite) -> AuthFailure {
    let session = site.client().open_session().unwrap();
    let err = session
        .login("jane@example.com", &SecretString::from("hunter22"))
        .await
        .unwrap_err();
    match err {
        ErpError::Auth(failure) => failure,
        other => panic!("expected an auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_password() {
    let site = ErpSite::start().await;
    login_responds(
        &site,
        401,
        Some(json!({"message": "Invalid Login. Try again.", "exc_type": "AuthenticationError"})),
    )
    .await;

    let failure = login_failure(&site).await;
    assert_eq!(failure, AuthFailure::InvalidCredentials);
    assert_eq!(failure.user_message(), "Invalid email/phone or password.");
}

#[tokio::test]
async fn disabled_account() {
    let site = ErpSite::start().await;
    login_responds(
        &site,
        401,
        Some(json!({"message": "User disabled or missing", "exc_type": "AuthenticationError"})),
    )
    .await;

    assert_eq!(login_failure(&site).await, AuthFailure::AccountDisabled);
}

#[tokio::test]
async fn message_nested_in_server_messages() {
    let site = ErpSite::start().await;
    let inner = json!({"message": "Not permitted", "indicator": "red"}).to_string();
    let server_messages = json!([inner]).to_string();
    login_responds(
        &site,
        417,
        Some(json!({"_server_messages": server_messages})),
    )
    .await;

    assert_eq!(login_failure(&site).await, AuthFailure::AccessDenied);
}

#[tokio::test]
async fn bare_server_error() {
    let site = ErpSite::start().await;
    login_responds(&site, 500, None).await;

    assert_eq!(login_failure(&site).await, AuthFailure::ServerError);
}

#[tokio::test]
async fn unreachable_site_is_a_network_failure() {
    // Port 9 (discard) is closed on test machines
    let config = ErpConfig::new(
        "http://127.0.0.1:9",
        "3c9e1f0a2b4d6e8",
        SecretString::from("9a8b7c6d5e4f3a2"),
    )
    .unwrap()
    .with_retry(RetryPolicy::no_retry());
    let session = client_for(config).open_session().unwrap();

    let err = session
        .login("jane@example.com", &SecretString::from("hunter22"))
        .await
        .unwrap_err();

    assert!(matches!(err, ErpError::Auth(AuthFailure::Network)));
    assert_eq!(classify_auth_failure(&err), AuthFailure::Network);
}
