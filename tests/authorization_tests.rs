// Copyright (c) 2026 Vestibule Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Capability resolution against a procured session: fail-closed denial,
//! optional absence, and provider downcasting.

mod common;

use std::sync::Arc;

use http::StatusCode;

use common::FakeRequest;
use vestibule::{
    Authorization, AuthorizationOutcome, CapabilityId, InMemorySessionStore, ProcurerConfig,
    RequestTransport, SessionProcurer, SessionStore,
};

const SCRATCHPAD: CapabilityId = CapabilityId::new("vestibule.tests.IScratchpad");

async fn procured_request(store: &Arc<InMemorySessionStore>) -> FakeRequest {
    let procurer = SessionProcurer::new(
        Arc::clone(store) as Arc<dyn SessionStore>,
        ProcurerConfig::default(),
    )
    .unwrap();
    let mut request = FakeRequest::get(false);
    procurer
        .procure_session(&mut request, false)
        .await
        .unwrap()
        .expect("session procured");
    request
}

#[tokio::test]
async fn test_required_capability_absent_denies_with_401() {
    let store = Arc::new(InMemorySessionStore::new());
    let request = procured_request(&store).await;

    let outcome = Authorization::new(CapabilityId::new("X"))
        .resolve(&request)
        .await;

    let denied = match outcome {
        AuthorizationOutcome::Denied(denied) => denied,
        other => panic!("expected denial, got {other:?}"),
    };
    let response = denied.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.body(), &b"X DENIED".to_vec());
}

#[tokio::test]
async fn test_optional_capability_absent_resolves_absent() {
    let store = Arc::new(InMemorySessionStore::new());
    let request = procured_request(&store).await;

    let outcome = Authorization::optional(SCRATCHPAD).resolve(&request).await;
    assert!(matches!(outcome, AuthorizationOutcome::Absent));
}

#[tokio::test]
async fn test_granted_capability_resolves_to_provider() {
    let store = Arc::new(InMemorySessionStore::new());
    let request = procured_request(&store).await;
    let session = request.cached_session().unwrap();
    store
        .grant(
            session.identifier(),
            SCRATCHPAD,
            Arc::new("scratchpad contents".to_string()),
        )
        .await
        .unwrap();

    let outcome = Authorization::new(SCRATCHPAD).resolve(&request).await;
    let provider = match outcome {
        AuthorizationOutcome::Resolved(provider) => provider,
        other => panic!("expected resolution, got {other:?}"),
    };
    assert_eq!(
        provider.downcast_ref::<String>().map(String::as_str),
        Some("scratchpad contents")
    );
}

#[tokio::test]
async fn test_unprocured_request_fails_closed() {
    let request = FakeRequest::get(false);

    let outcome = Authorization::new(SCRATCHPAD).resolve(&request).await;
    assert!(matches!(outcome, AuthorizationOutcome::Denied(_)));

    let optional = Authorization::optional(SCRATCHPAD).resolve(&request).await;
    assert!(matches!(optional, AuthorizationOutcome::Absent));
}
