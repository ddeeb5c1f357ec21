// Copyright (c) 2026 Vestibule Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Capability identifiers and the type-erased providers they resolve to.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A named capability that a session may be able to provide.
///
/// The name is the qualified, stable identifier used both as the lookup key
/// and in the denial response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityId(&'static str);

impl CapabilityId {
    /// Declare a capability by its qualified name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The qualified capability name.
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// A provider resolved from a session's authorization surface.
///
/// Providers are duck-typed by design; callers downcast to the concrete type
/// they registered for the capability.
pub type Provider = Arc<dyn Any + Send + Sync>;

/// The result of one `authorize` call: each resolvable capability mapped to
/// its provider. Unresolvable capabilities are absent from the map.
pub type CapabilityMap = HashMap<CapabilityId, Provider>;
