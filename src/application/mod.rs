// Copyright (c) 2026 Vestibule Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Application layer: the procurement service and the authorization
//! requirement it feeds.

pub mod authorization;
pub mod procurer;
