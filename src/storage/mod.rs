// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Local Storage
//!
//! The persisted mirror of the session. It is written only by the session
//! store and its enrichment merge, one write transaction at a time.
//!
//! ## Storage Layout
//!
//! ```text
//! {DASHBOARD_DATA_DIR}/
//!   session.redb      # accessToken, refreshToken, user
//! ```

pub mod vault;

pub use vault::{SessionVault, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};
