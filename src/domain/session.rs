// Copyright (c) 2026 Vestibule Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Session Domain Model
//!
//! The [`Session`] and [`SessionStore`] traits are the contract between the
//! procurement pipeline and whatever storage backend is in use. Each request
//! that carries (or is granted) a session goes through
//! [`crate::application::procurer::SessionProcurer::procure_session`], which
//! resolves an existing session or asks the store for a new one.
//!
//! ## Invariants
//!
//! - A session loaded with `sent_securely = true` was created over a secure
//!   transport; stores **must not** hand out a secure-grade session for an
//!   insecure load (or vice versa) — mismatched grade is [`ProcurementError::NoSuchSession`].
//! - An identifier presented via [`SessionMechanism::Header`] that does not
//!   resolve is a hard failure; via [`SessionMechanism::Cookie`] it silently
//!   falls through to session creation.
//!
//! ## Anti-Corruption Layer
//!
//! [`Session`] keeps the pipeline free of any storage or serialization
//! dependencies. The in-memory implementation lives in
//! [`crate::infrastructure::memory`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::capability::{CapabilityId, CapabilityMap};

/// How a session identifier was transmitted by the client.
///
/// Decides the failure policy on lookup: API clients presenting a token via
/// a header get a hard error for an unknown identifier, while an unknown
/// cookie identifier is treated as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionMechanism {
    /// The identifier arrived in a token header (API-client style).
    Header,
    /// The identifier arrived in a cookie (browser style).
    Cookie,
}

impl std::fmt::Display for SessionMechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Cookie => write!(f, "cookie"),
        }
    }
}

/// Errors surfaced by session procurement.
///
/// Neither variant is retried internally: procurement is not idempotent-safe
/// to blindly retry, since it may create a session as a side effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcurementError {
    /// The presented identifier is unknown, expired, or of a mismatched
    /// security grade.
    #[error("no such session")]
    NoSuchSession,

    /// A session cookie had to be written after response headers were
    /// already sent. Always fatal to the current procurement call.
    #[error("too late for cookies: {0}")]
    TooLateForCookies(&'static str),
}

/// A server-side session, borrowed from the [`SessionStore`] for the
/// duration of one request.
#[async_trait]
pub trait Session: Send + Sync {
    /// The opaque identifier this session is stored under.
    fn identifier(&self) -> &str;

    /// Whether this session is bound to a secure transport.
    fn is_confidential(&self) -> bool;

    /// Resolve the requested capabilities to providers.
    ///
    /// The returned map contains an entry for each capability the session's
    /// authorization surface can provide; requested capabilities with no
    /// provider are simply omitted.
    async fn authorize(&self, capabilities: &[CapabilityId]) -> CapabilityMap;
}

/// Persistent storage for sessions, consumed by the procurer.
///
/// The store is the authority on consistency: concurrent loads of the same
/// identifier from different requests are its problem, not the pipeline's.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the session stored under `identifier`.
    ///
    /// # Errors
    ///
    /// [`ProcurementError::NoSuchSession`] when the identifier is unknown,
    /// expired, or its security grade does not match `sent_securely`.
    async fn load_session(
        &self,
        identifier: &str,
        sent_securely: bool,
        mechanism: SessionMechanism,
    ) -> Result<Arc<dyn Session>, ProcurementError>;

    /// Create and persist a brand-new session.
    async fn new_session(
        &self,
        sent_securely: bool,
        mechanism: SessionMechanism,
    ) -> Result<Arc<dyn Session>, ProcurementError>;

    /// Report credential values observed on an insecure transport.
    ///
    /// Called with every candidate token harvested from the request, or an
    /// empty slice when none were present. Stores should treat any
    /// secure-grade identifier in the set as compromised.
    async fn sent_insecurely(&self, candidates: &[String]);
}
