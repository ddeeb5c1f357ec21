// Copyright (c) 2026 Vestibule Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Request Transport Boundary
//!
//! [`RequestTransport`] is the anti-corruption layer between the procurement
//! pipeline and whatever HTTP machinery actually carries the request. The
//! pipeline only ever reads headers and cookies, writes at most one
//! `Set-Cookie`, and parks the procured session in the request-scoped cache
//! slot; everything else about the transport stays on the framework's side
//! of this trait.

use std::sync::Arc;
use std::time::Duration;

use http::{HeaderValue, Method};

use crate::domain::session::Session;

/// The attributes of one `Set-Cookie` write issued by the procurer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    /// Cookie name (the configured secure or insecure session cookie).
    pub name: String,
    /// The session identifier being issued.
    pub value: String,
    /// Max-Age for the cookie.
    pub max_age: Duration,
    /// Optional Domain attribute.
    pub domain: Option<String>,
    /// Path attribute.
    pub path: String,
    /// Whether the Secure attribute is set. Mirrors the security grade the
    /// session was procured under.
    pub secure: bool,
    /// Whether the HttpOnly attribute is set. Always true for session
    /// cookies issued by the procurer.
    pub http_only: bool,
}

impl SessionCookie {
    /// Render the `Set-Cookie` header value for this cookie.
    pub fn header_value(&self) -> String {
        let mut out = format!(
            "{}={}; Max-Age={}; Path={}",
            self.name,
            self.value,
            self.max_age.as_secs(),
            self.path
        );
        if let Some(domain) = &self.domain {
            out.push_str("; Domain=");
            out.push_str(domain);
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}

/// One in-flight HTTP request/response exchange, as seen by the pipeline.
///
/// Implementations wrap the framework's request object. The cache slot holds
/// the session procured for this request so that repeated procurement (and
/// authorization resolution) within the request reuses it.
pub trait RequestTransport: Send + Sync {
    /// The request method.
    fn method(&self) -> &Method;

    /// Whether the transport the request arrived over is secure (TLS).
    fn is_secure(&self) -> bool;

    /// Whether response headers have already begun transmitting. Once true,
    /// no further cookie can be attached.
    fn started_writing(&self) -> bool;

    /// Every value transmitted for the named request header, in order.
    fn header_values(&self, name: &str) -> Vec<HeaderValue>;

    /// The value of the named request cookie, if present.
    fn cookie(&self, name: &str) -> Option<String>;

    /// Attach a `Set-Cookie` to the response.
    fn add_cookie(&mut self, cookie: SessionCookie);

    /// The session cached on this request by a prior procurement, if any.
    fn cached_session(&self) -> Option<Arc<dyn Session>>;

    /// Cache the procured session on this request.
    fn cache_session(&mut self, session: Arc<dyn Session>);
}
