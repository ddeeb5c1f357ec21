// Copyright (c) 2026 Vestibule Contributors
// SPDX-License-Identifier: AGPL-3.0
//! In-memory [`SessionStore`] for tests and single-process deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::domain::capability::{CapabilityId, CapabilityMap, Provider};
use crate::domain::session::{ProcurementError, Session, SessionMechanism, SessionStore};

/// A session held by [`InMemorySessionStore`].
pub struct MemorySession {
    identifier: String,
    confidential: bool,
    providers: RwLock<CapabilityMap>,
}

#[async_trait]
impl Session for MemorySession {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn is_confidential(&self) -> bool {
        self.confidential
    }

    async fn authorize(&self, capabilities: &[CapabilityId]) -> CapabilityMap {
        let providers = self.providers.read().await;
        capabilities
            .iter()
            .filter_map(|capability| {
                providers
                    .get(capability)
                    .map(|provider| (*capability, Arc::clone(provider)))
            })
            .collect()
    }
}

/// Process-local session store.
///
/// Sessions are keyed by identifier and carry the security grade they were
/// created under; a load whose `sent_securely` does not match that grade is
/// `NoSuchSession`, so a secure-grade session can never be satisfied by (or
/// satisfy) an insecure request.
pub struct InMemorySessionStore {
    // Maps identifier -> session
    sessions: Arc<RwLock<HashMap<String, Arc<MemorySession>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Grant `capability` on the session stored under `identifier`.
    ///
    /// # Errors
    ///
    /// [`ProcurementError::NoSuchSession`] if the identifier is unknown.
    pub async fn grant(
        &self,
        identifier: &str,
        capability: CapabilityId,
        provider: Provider,
    ) -> Result<(), ProcurementError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(identifier)
            .ok_or(ProcurementError::NoSuchSession)?;
        session.providers.write().await.insert(capability, provider);
        Ok(())
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load_session(
        &self,
        identifier: &str,
        sent_securely: bool,
        _mechanism: SessionMechanism,
    ) -> Result<Arc<dyn Session>, ProcurementError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(identifier)
            .ok_or(ProcurementError::NoSuchSession)?;
        if session.confidential != sent_securely {
            return Err(ProcurementError::NoSuchSession);
        }
        Ok(Arc::clone(session) as Arc<dyn Session>)
    }

    async fn new_session(
        &self,
        sent_securely: bool,
        _mechanism: SessionMechanism,
    ) -> Result<Arc<dyn Session>, ProcurementError> {
        let session = Arc::new(MemorySession {
            identifier: Uuid::new_v4().to_string(),
            confidential: sent_securely,
            providers: RwLock::new(CapabilityMap::new()),
        });
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.identifier.clone(), Arc::clone(&session));
        Ok(session)
    }

    async fn sent_insecurely(&self, candidates: &[String]) {
        // Only secure-grade sessions are compromised by insecure transit;
        // insecure-grade identifiers travel in the clear as a matter of course.
        let mut sessions = self.sessions.write().await;
        for candidate in candidates {
            let confidential = sessions
                .get(candidate)
                .is_some_and(|session| session.confidential);
            if confidential {
                warn!(identifier = %candidate, "secure-grade session disclosed insecurely; revoking");
                sessions.remove(candidate);
            }
        }
    }
}
