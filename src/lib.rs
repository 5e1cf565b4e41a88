// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Creator Dashboard State - client-side state layer for a creator payout
//! dashboard.
//!
//! Keeps a locally persisted creator session consistent with remote profile
//! and wallet data, and turns raw ledger pages into a filtered, paged view.
//!
//! ## Modules
//!
//! - `session` - Session lifecycle (login, register, logout, update) and
//!   background enrichment
//! - `transactions` - Normalization, filtering and pagination of ledger rows
//! - `wallet` - Wallet summary and payout schedule loading
//! - `dashboard` - Coordinates the wallet and ledger sources for one screen
//! - `gateway` - Remote API contract and its HTTP implementation
//! - `storage` - Persisted session mirror (redb)

pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod load_state;
pub mod models;
pub mod session;
pub mod storage;
pub mod telemetry;
pub mod transactions;
pub mod wallet;

pub use config::ClientConfig;
pub use dashboard::{Dashboard, DashboardMode};
pub use gateway::{HttpGateway, RemoteGateway};
pub use session::{SessionStore, UpdateOutcome};
pub use storage::SessionVault;
