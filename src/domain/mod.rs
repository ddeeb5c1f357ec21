// Copyright (c) 2026 Vestibule Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: session and capability traits, the transport
//! anti-corruption boundary, and the procurement error model.

pub mod capability;
pub mod session;
pub mod transport;
