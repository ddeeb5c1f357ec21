// Copyright (c) 2026 Vestibule Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Session Procurer
//!
//! The request-side half of the pipeline: given a request and a
//! [`SessionStore`], resolve the session the request belongs to — or decide
//! that it gets none.
//!
//! ## Procurement Pipeline
//!
//! ```text
//! procure_session(&mut request, force_insecure)
//!   └─ 1. request-scoped cache check (idempotent within a request)
//!   └─ 2. transport classification (+ disclosure check on insecure paths)
//!   └─ 3. identifier extraction: selected header, then selected cookie
//!   └─ 4. SessionStore::load_session
//!   └─ 5. creation decision (GET-only, headers not yet sent)
//!   └─ 6. Set-Cookie issuance
//!   └─ 7. request-scoped caching
//! ```
//!
//! The steps run strictly in order; none may be skipped or reordered. This
//! is the **single choke-point** through which every request acquires its
//! session.
//!
//! ## Invariants
//!
//! - An invalid identifier presented via a token header is a hard failure;
//!   an invalid cookie identifier falls through to the creation decision.
//! - On an insecure transport, the disclosure check runs **always**, even
//!   when no candidate credential was found.
//! - A cookie is never written once response headers have started; such an
//!   attempt is [`ProcurementError::TooLateForCookies`].
//! - An insecure-grade session is never cached onto a secure request.

use std::sync::Arc;
use std::time::Duration;

use http::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::session::{ProcurementError, Session, SessionMechanism, SessionStore};
use crate::domain::transport::{RequestTransport, SessionCookie};

/// Configuration error raised when constructing a [`SessionProcurer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcurerConfigError {
    /// Secure and insecure cookie (or header) names collide, which would
    /// make a secure-grade credential indistinguishable from an insecure one.
    #[error("secure and insecure {0} names must differ")]
    IndistinctNames(&'static str),
}

/// Immutable procurement configuration.
///
/// Constructed once and shared; the secure and insecure cookie names must
/// differ, as must the secure and insecure header names — credentials of
/// different grades must never travel under the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcurerConfig {
    /// Max-Age for issued session cookies.
    #[serde(with = "humantime_serde")]
    pub max_age: Duration,
    /// Cookie name for sessions on secure (TLS) transports.
    pub secure_cookie: String,
    /// Cookie name for sessions on insecure transports.
    pub insecure_cookie: String,
    /// Domain attribute for issued cookies, if restricted.
    pub cookie_domain: Option<String>,
    /// Path attribute for issued cookies.
    pub cookie_path: String,
    /// Token header consulted on secure transports. API clients should use
    /// this header rather than a cookie.
    pub secure_token_header: String,
    /// Token header consulted on insecure transports.
    pub insecure_token_header: String,
    /// Whether a session may be auto-created (and its cookie set) on GET
    /// requests that present no valid session.
    pub set_cookie_on_get: bool,
}

impl Default for ProcurerConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(3600),
            secure_cookie: "Vestibule-Secure-Session".to_string(),
            insecure_cookie: "Vestibule-INSECURE-Session".to_string(),
            cookie_domain: None,
            cookie_path: "/".to_string(),
            secure_token_header: "X-Auth-Token".to_string(),
            insecure_token_header: "X-INSECURE-Auth-Token".to_string(),
            set_cookie_on_get: true,
        }
    }
}

impl ProcurerConfig {
    /// Check the cross-field invariant: secure and insecure names differ.
    ///
    /// # Errors
    ///
    /// [`ProcurerConfigError::IndistinctNames`] naming the colliding pair.
    pub fn validate(&self) -> Result<(), ProcurerConfigError> {
        if self.secure_cookie == self.insecure_cookie {
            return Err(ProcurerConfigError::IndistinctNames("cookie"));
        }
        if self.secure_token_header == self.insecure_token_header {
            return Err(ProcurerConfigError::IndistinctNames("token header"));
        }
        Ok(())
    }
}

/// Procures a session from a request and a store.
///
/// Stateless beyond its immutable configuration; a single instance is shared
/// across request handlers.
pub struct SessionProcurer {
    store: Arc<dyn SessionStore>,
    config: ProcurerConfig,
}

impl SessionProcurer {
    /// Create a procurer over `store` with the given configuration.
    ///
    /// # Errors
    ///
    /// [`ProcurerConfigError`] if the configuration's secure/insecure names
    /// collide.
    pub fn new(
        store: Arc<dyn SessionStore>,
        config: ProcurerConfig,
    ) -> Result<Self, ProcurerConfigError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// The configuration this procurer was built with.
    pub fn config(&self) -> &ProcurerConfig {
        &self.config
    }

    /// Resolve (or create) the session for `request`.
    ///
    /// `force_insecure` makes a secure request undergo insecure-grade
    /// handling — insecure cookie/header names, `sent_securely = false` —
    /// for callers fronting mixed-trust proxies or exercising the insecure
    /// path in tests.
    ///
    /// Returns `Ok(None)` when no session was presented and the request is
    /// not eligible for auto-creation (non-GET, or `set_cookie_on_get` is
    /// off).
    ///
    /// # Errors
    ///
    /// - [`ProcurementError::NoSuchSession`] — a header-presented identifier
    ///   did not resolve. Cookie-presented identifiers never surface this;
    ///   they fall through to the creation decision.
    /// - [`ProcurementError::TooLateForCookies`] — a session had to be
    ///   created, or its identifier cookie rewritten, after response headers
    ///   were already sent.
    pub async fn procure_session(
        &self,
        request: &mut dyn RequestTransport,
        force_insecure: bool,
    ) -> Result<Option<Arc<dyn Session>>, ProcurementError> {
        // 1. Idempotent within a request.
        if let Some(session) = request.cached_session() {
            return Ok(Some(session));
        }

        // 2. Transport classification.
        let (token_header, cookie_name, sent_securely) = if request.is_secure() {
            if force_insecure {
                (
                    self.config.insecure_token_header.as_str(),
                    self.config.insecure_cookie.as_str(),
                    false,
                )
            } else {
                (
                    self.config.secure_token_header.as_str(),
                    self.config.secure_cookie.as_str(),
                    true,
                )
            }
        } else {
            // Did a buggy client disclose a secure-grade token over this
            // insecure transport? Harvest every place one could have leaked
            // and let the store decide. Runs even when the harvest is empty.
            let candidates = self.harvest_candidates(request);
            if !candidates.is_empty() {
                warn!(
                    count = candidates.len(),
                    "credentials observed on insecure transport; reporting to store"
                );
            }
            self.store.sent_insecurely(&candidates).await;
            (
                self.config.insecure_token_header.as_str(),
                self.config.insecure_cookie.as_str(),
                false,
            )
        };

        // 3. Identifier extraction: header first, then cookie. Values that
        // do not decode as visible ASCII were never well-formed credentials
        // and are treated as absent.
        let mut mechanism = SessionMechanism::Header;
        let mut session_id: Option<String> = request
            .header_values(token_header)
            .first()
            .and_then(|v| v.to_str().ok().map(str::to_owned));
        if session_id.is_none() {
            mechanism = SessionMechanism::Cookie;
            session_id = request.cookie(cookie_name).filter(|v| v.is_ascii());
        }

        // 4. Lookup.
        let mut session: Option<Arc<dyn Session>> = None;
        if let Some(id) = session_id.as_deref() {
            match self.store.load_session(id, sent_securely, mechanism).await {
                Ok(loaded) => session = Some(loaded),
                Err(ProcurementError::NoSuchSession) => {
                    if mechanism == SessionMechanism::Header {
                        warn!(%mechanism, "unknown session identifier presented via header");
                        return Err(ProcurementError::NoSuchSession);
                    }
                    session_id = None;
                }
                Err(other) => return Err(other),
            }
        }

        // 5. Creation decision.
        let session = match session {
            Some(session) => session,
            None => {
                if request.method() != Method::GET || !self.config.set_cookie_on_get {
                    // No identifier and no permission to set a cookie: don't
                    // waste store resources allocating a session.
                    return Ok(None);
                }
                if request.started_writing() {
                    return Err(ProcurementError::TooLateForCookies(
                        "session initialised after response headers were sent",
                    ));
                }
                let created = self.store.new_session(sent_securely, mechanism).await?;
                debug!(identifier = created.identifier(), sent_securely, "created new session");
                created
            }
        };

        // 6. Cookie issuance. The identifier differs from the presented one
        // when the session is new or the store rotated it.
        if session_id.as_deref() != Some(session.identifier())
            && request.method() == Method::GET
            && self.config.set_cookie_on_get
        {
            if request.started_writing() {
                return Err(ProcurementError::TooLateForCookies(
                    "session identifier changed after response headers were sent",
                ));
            }
            request.add_cookie(SessionCookie {
                name: cookie_name.to_string(),
                value: session.identifier().to_string(),
                max_age: self.config.max_age,
                domain: self.config.cookie_domain.clone(),
                path: self.config.cookie_path.clone(),
                secure: sent_securely,
                http_only: true,
            });
        }

        // 7. Never cache the insecure-grade session on the secure request.
        if sent_securely || !request.is_secure() {
            request.cache_session(Arc::clone(&session));
        }
        Ok(Some(session))
    }

    /// Collect every credential value sent under any secure or insecure
    /// header/cookie name. Values are reported even when they are not valid
    /// ASCII: a malformed credential is still a disclosure.
    fn harvest_candidates(&self, request: &dyn RequestTransport) -> Vec<String> {
        let mut candidates = Vec::new();
        for header in [
            &self.config.secure_token_header,
            &self.config.insecure_token_header,
        ] {
            for value in request.header_values(header) {
                candidates.push(String::from_utf8_lossy(value.as_bytes()).into_owned());
            }
        }
        for cookie in [&self.config.secure_cookie, &self.config.insecure_cookie] {
            if let Some(value) = request.cookie(cookie) {
                candidates.push(value);
            }
        }
        candidates
    }
}
