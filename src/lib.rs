// Copyright (c) 2026 Vestibule Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Vestibule
//!
//! Session procurement and capability-based authorization for async HTTP
//! services.
//!
//! ## Processing Pipeline
//!
//! ```text
//! incoming request
//!   └─ SessionProcurer::procure_session(&mut request, force_insecure)
//!         └─ transport classification + disclosure check
//!         └─ identifier extraction (header, then cookie)
//!         └─ SessionStore::load_session / new_session
//!         └─ Set-Cookie issuance + request-scoped caching
//!   └─ Authorization::resolve(&request)      ← per required capability
//!         └─ Session::authorize([capability])
//!         └─ Resolved(provider) | Absent | Denied(401 response)
//! ```
//!
//! The crate sits below the routing framework: it consumes the request
//! through the [`domain::transport::RequestTransport`] trait and talks to
//! session storage through [`domain::session::SessionStore`], so any
//! transport or store can be plugged in.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::authorization::{Authorization, AuthorizationDenied, AuthorizationOutcome};
pub use application::procurer::{ProcurerConfig, ProcurerConfigError, SessionProcurer};
pub use domain::capability::{CapabilityId, CapabilityMap, Provider};
pub use domain::session::{ProcurementError, Session, SessionMechanism, SessionStore};
pub use domain::transport::{RequestTransport, SessionCookie};
pub use infrastructure::memory::InMemorySessionStore;
