// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Data Models
//!
//! Wire and domain types exchanged with the remote API and persisted in the
//! session vault. Remote payloads are loosely typed (amounts arrive as
//! strings or numbers, identifiers as integers or strings, keys in camelCase
//! or snake_case), so deserialization here is deliberately lenient and the
//! strict canonical forms are produced by the normalization stages.
//!
//! ## Model Categories
//!
//! - **Session**: [`Profile`], [`TokenPair`], [`Session`]
//! - **Forms**: [`RegistrationForm`], [`ProfileUpdateForm`]
//! - **Wallet**: [`WalletSummary`], [`PayoutSchedule`]
//! - **Ledger**: [`RawTransaction`], [`TransactionPage`]

mod forms;
mod lenient;
mod session;
mod wallet;

pub(crate) use forms::supplied;
pub use forms::{ImageUpload, ProfileUpdateForm, RegistrationForm, UpdateResponse};
pub use lenient::{coerce_decimal, lenient_decimal, lenient_opt_decimal, lenient_opt_string};
pub use session::{CreatorProfile, Profile, ProfileResponse, Registration, Session, TokenPair};
pub use wallet::{
    PaginationMeta, PayoutSchedule, RawTransaction, TransactionPage, WalletSummary,
    DEFAULT_CURRENCY,
};
