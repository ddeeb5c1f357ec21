// Copyright (c) 2026 Vestibule Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Shared test collaborators: a scripted request transport and a
//! call-counting session store.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue, Method};

use vestibule::{
    InMemorySessionStore, ProcurementError, RequestTransport, Session, SessionCookie,
    SessionMechanism, SessionStore,
};

/// A request/response exchange scripted by the test.
pub struct FakeRequest {
    method: Method,
    secure: bool,
    started_writing: bool,
    headers: HeaderMap,
    cookies: HashMap<String, String>,
    pub issued_cookies: Vec<SessionCookie>,
    cached: Option<Arc<dyn Session>>,
}

impl FakeRequest {
    pub fn new(method: Method, secure: bool) -> Self {
        Self {
            method,
            secure,
            started_writing: false,
            headers: HeaderMap::new(),
            cookies: HashMap::new(),
            issued_cookies: Vec::new(),
            cached: None,
        }
    }

    pub fn get(secure: bool) -> Self {
        Self::new(Method::GET, secure)
    }

    pub fn with_header(mut self, name: &str, value: &[u8]) -> Self {
        self.headers.append(
            HeaderName::from_bytes(name.as_bytes()).expect("valid header name"),
            HeaderValue::from_bytes(value).expect("valid header value"),
        );
        self
    }

    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name.to_string(), value.to_string());
        self
    }

    pub fn writing_started(mut self) -> Self {
        self.started_writing = true;
        self
    }
}

impl RequestTransport for FakeRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn started_writing(&self) -> bool {
        self.started_writing
    }

    fn header_values(&self, name: &str) -> Vec<HeaderValue> {
        self.headers.get_all(name).iter().cloned().collect()
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    fn add_cookie(&mut self, cookie: SessionCookie) {
        self.issued_cookies.push(cookie);
    }

    fn cached_session(&self) -> Option<Arc<dyn Session>> {
        self.cached.as_ref().map(Arc::clone)
    }

    fn cache_session(&mut self, session: Arc<dyn Session>) {
        self.cached = Some(session);
    }
}

/// Wraps [`InMemorySessionStore`] and records every call the procurer makes.
pub struct RecordingStore {
    pub inner: InMemorySessionStore,
    pub loads: AtomicUsize,
    pub creates: AtomicUsize,
    pub disclosures: Mutex<Vec<Vec<String>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemorySessionStore::new(),
            loads: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            disclosures: Mutex::new(Vec::new()),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn disclosure_reports(&self) -> Vec<Vec<String>> {
        self.disclosures.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionStore for RecordingStore {
    async fn load_session(
        &self,
        identifier: &str,
        sent_securely: bool,
        mechanism: SessionMechanism,
    ) -> Result<Arc<dyn Session>, ProcurementError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner
            .load_session(identifier, sent_securely, mechanism)
            .await
    }

    async fn new_session(
        &self,
        sent_securely: bool,
        mechanism: SessionMechanism,
    ) -> Result<Arc<dyn Session>, ProcurementError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.new_session(sent_securely, mechanism).await
    }

    async fn sent_insecurely(&self, candidates: &[String]) {
        self.disclosures.lock().unwrap().push(candidates.to_vec());
        self.inner.sent_insecurely(candidates).await;
    }
}
