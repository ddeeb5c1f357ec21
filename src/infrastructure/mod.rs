// Copyright (c) 2026 Vestibule Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure layer: concrete implementations of the domain
//! collaborators.

pub mod memory;
