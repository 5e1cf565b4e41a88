// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Remote Gateway
//!
//! The request/response contract the client consumes. Every call is a
//! suspension point; timeouts and retries below this boundary belong to the
//! implementation, never to the session or ledger logic.
//!
//! | Call | Input | Success | Failure |
//! |------|-------|---------|---------|
//! | `authenticate` | email, password | [`TokenPair`] | rejected credentials |
//! | `get_profile` | current token | [`ProfileResponse`] | non-success status |
//! | `register_user` | [`RegistrationForm`] | [`Registration`] | validation error |
//! | `logout_user` | current token | acknowledgement | ignorable |
//! | `get_creator_by_slug` | slug | [`CreatorProfile`] | not found |
//! | `get_wallet_data` | page | [`WalletSummary`] | service error |
//! | `get_wallet_txn_data` | page | [`TransactionPage`] | service error |
//! | `get_payouts_data` | - | [`PayoutSchedule`] | service error |
//! | `update_creator` | [`ProfileUpdateForm`] | [`UpdateResponse`] | validation error |

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::models::{
    CreatorProfile, PayoutSchedule, ProfileResponse, ProfileUpdateForm, Registration,
    RegistrationForm, TokenPair, TransactionPage, UpdateResponse, WalletSummary,
};

pub use http::HttpGateway;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Remote API consumed by the session store, enhancer and loaders.
#[async_trait]
pub trait RemoteGateway: Send + Sync + 'static {
    /// Install (or remove) the credentials attached to subsequent calls.
    fn install_credentials(&self, tokens: Option<TokenPair>);

    async fn authenticate(&self, email: &str, password: &str) -> GatewayResult<TokenPair>;

    async fn get_profile(&self) -> GatewayResult<ProfileResponse>;

    async fn register_user(&self, form: &RegistrationForm) -> GatewayResult<Registration>;

    async fn logout_user(&self) -> GatewayResult<()>;

    async fn get_creator_by_slug(&self, slug: &str) -> GatewayResult<CreatorProfile>;

    async fn get_wallet_data(&self, page: u32) -> GatewayResult<WalletSummary>;

    async fn get_wallet_txn_data(&self, page: u32) -> GatewayResult<TransactionPage>;

    async fn get_payouts_data(&self) -> GatewayResult<PayoutSchedule>;

    async fn update_creator(&self, form: &ProfileUpdateForm) -> GatewayResult<UpdateResponse>;
}
