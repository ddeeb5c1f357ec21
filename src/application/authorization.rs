// Copyright (c) 2026 Vestibule Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Authorization Requirement
//!
//! The post-procurement half of the pipeline: an [`Authorization`] names one
//! capability a handler needs and resolves it from the request's procured
//! session. Required capabilities fail closed — if no provider resolves, the
//! outcome carries a ready-made 401 response and the handler must not run.
//!
//! Denial is a value variant, not an error: routing layers pattern-match on
//! [`AuthorizationOutcome`] rather than catching anything.

use http::{Response, StatusCode};
use tracing::warn;

use crate::domain::capability::{CapabilityId, Provider};
use crate::domain::transport::RequestTransport;

/// The fail-closed denial produced when a required capability is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationDenied {
    capability: CapabilityId,
}

impl AuthorizationDenied {
    /// The capability that failed to resolve.
    pub fn capability(&self) -> CapabilityId {
        self.capability
    }

    /// The response status: 401 Unauthorized.
    pub fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    /// The response body: the qualified capability name followed by
    /// `" DENIED"`, as bytes.
    pub fn body(&self) -> Vec<u8> {
        format!("{} DENIED", self.capability).into_bytes()
    }

    /// Render the short-circuit response sent in place of normal handling.
    pub fn into_response(self) -> Response<Vec<u8>> {
        let mut response = Response::new(self.body());
        *response.status_mut() = StatusCode::UNAUTHORIZED;
        response
    }
}

/// The result of resolving one [`Authorization`] against a request.
#[derive(Clone)]
pub enum AuthorizationOutcome {
    /// The session provided the capability.
    Resolved(Provider),
    /// The capability was absent but not required.
    Absent,
    /// The capability was required and absent; handling must short-circuit
    /// with the carried response.
    Denied(AuthorizationDenied),
}

impl std::fmt::Debug for AuthorizationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // The provider is type-erased; there is nothing useful to print.
            Self::Resolved(_) => f.write_str("Resolved(..)"),
            Self::Absent => f.write_str("Absent"),
            Self::Denied(denied) => f.debug_tuple("Denied").field(denied).finish(),
        }
    }
}

/// One capability a route requires (or would like) from the session.
///
/// Purely a post-procurement lookup: never touches the store or the
/// transport's credentials, only the session already cached on the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorization {
    capability: CapabilityId,
    required: bool,
}

impl Authorization {
    /// Require `capability`: resolution failure denies the request.
    pub fn new(capability: CapabilityId) -> Self {
        Self {
            capability,
            required: true,
        }
    }

    /// Ask for `capability` without requiring it. Convenience only; absence
    /// resolves to [`AuthorizationOutcome::Absent`] instead of a denial.
    pub fn optional(capability: CapabilityId) -> Self {
        Self {
            capability,
            required: false,
        }
    }

    /// The capability this requirement names.
    pub fn capability(&self) -> CapabilityId {
        self.capability
    }

    /// Whether absence of the capability denies the request.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Resolve the capability from the request's procured session.
    ///
    /// Assumes procurement already ran for this request. A request with no
    /// cached session resolves nothing: required requirements are denied,
    /// optional ones come back [`AuthorizationOutcome::Absent`].
    pub async fn resolve(&self, request: &dyn RequestTransport) -> AuthorizationOutcome {
        let provider = match request.cached_session() {
            Some(session) => session
                .authorize(&[self.capability])
                .await
                .remove(&self.capability),
            None => None,
        };
        match provider {
            Some(provider) => AuthorizationOutcome::Resolved(provider),
            None if self.required => {
                warn!(capability = %self.capability, "required capability absent; denying request");
                AuthorizationOutcome::Denied(AuthorizationDenied {
                    capability: self.capability,
                })
            }
            None => AuthorizationOutcome::Absent,
        }
    }
}
