//! License synchronization feeding the next token's capabilities.

mod common;

use std::sync::Arc;

use capgate_capabilities::CapabilityMap;
use capgate_handlers::{GetThing, LicenseCheck, LicenseSync, PostSignUp, ProxyRequest, respond, respond_at};
use capgate_test::{TestToken, token_event};
use chrono::{TimeZone, Utc};
use common::{AuthorizerHarness, InMemoryIdentity, InMemoryLicenses, proxied};

fn eap_plan() -> CapabilityMap {
    [("eap", Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())]
        .into_iter()
        .collect()
}

#[tokio::test]
async fn test_sign_up_grants_access_on_next_token() {
    let licenses = Arc::new(InMemoryLicenses::with_plan(eap_plan()));
    let identity = Arc::new(InMemoryIdentity::default());
    let sync = LicenseSync::new(licenses, identity.clone());
    let harness = AuthorizerHarness::new();
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    // Before sign-up the token carries nothing.
    let before = harness
        .handle(token_event(&TestToken::new().subject("user_new").bearer()))
        .await
        .unwrap();
    assert_eq!(respond_at(&GetThing::new(), &proxied(&before), now).await.status_code, 403);

    let signed_up = respond(&PostSignUp::new(sync), &ProxyRequest::authorized("user_new", "")).await;
    assert_eq!(signed_up.status_code, 204);

    let granted = identity.token_capabilities("user_new");
    let pairs: Vec<(&str, &str)> = granted.iter().map(|(n, e)| (n.as_str(), e.as_str())).collect();
    let after = harness
        .handle(token_event(
            &TestToken::new().subject("user_new").capabilities(&pairs).bearer(),
        ))
        .await
        .unwrap();

    let response = respond_at(&GetThing::new(), &proxied(&after), now).await;
    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn test_lapsed_license_clears_capabilities() {
    let licenses = Arc::new(InMemoryLicenses::with_plan(eap_plan()));
    let identity = Arc::new(InMemoryIdentity::default());
    identity
        .capabilities
        .lock()
        .unwrap()
        .insert("user_1".to_string(), eap_plan());

    let endpoint = LicenseCheck::new(LicenseSync::new(licenses, identity.clone()));
    let response = respond(&endpoint, &ProxyRequest::authorized("user_1", "")).await;

    assert_eq!(response.status_code, 204);
    assert!(identity.token_capabilities("user_1").is_empty());
}

#[tokio::test]
async fn test_license_endpoints_require_principal() {
    let sync = LicenseSync::new(
        Arc::new(InMemoryLicenses::default()),
        Arc::new(InMemoryIdentity::default()),
    );

    let check = respond(&LicenseCheck::new(sync.clone()), &ProxyRequest::default()).await;
    let sign_up = respond(&PostSignUp::new(sync), &ProxyRequest::default()).await;

    assert_eq!(check.status_code, 401);
    assert_eq!(sign_up.status_code, 401);
}
