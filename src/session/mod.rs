// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated session lifecycle and its background enrichment.

pub mod enhancer;
pub mod store;

pub use enhancer::{EnrichmentPatch, ProfileEdits, SessionEnhancer};
pub use store::{SessionStore, UpdateOutcome};
