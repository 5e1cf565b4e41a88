// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy.
//!
//! - [`GatewayError`]: anything the remote boundary can report.
//! - [`AuthError`], [`UpdateError`], [`FetchError`]: user-facing results of
//!   login/register, profile update and data reads. Each carries a message
//!   that is safe to render as-is.
//! - [`EnhancementError`]: background enrichment failures. Only ever logged.
//! - [`VaultError`]: local session persistence failures.

/// Error reported by a [`crate::gateway::RemoteGateway`] call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("request rejected with status {status}")]
    Rejected { status: u16, message: Option<String> },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("no credentials installed")]
    Unauthenticated,
}

impl GatewayError {
    /// Server-supplied message, if the remote sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Message shown to the user: the server message, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const NO_USER_FOUND: &str = "No user found";
pub const UPDATE_FAILED: &str = "Profile Update failed";
pub const TRANSACTIONS_UNAVAILABLE: &str = "Unable to load transactions.";
pub const WALLET_UNAVAILABLE: &str = "Failed to load data.";
pub const PAYOUTS_UNAVAILABLE: &str = "Failed to load payout schedule.";

/// Login or registration failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn from_gateway(err: &GatewayError, fallback: &str) -> Self {
        Self::new(err.user_message(fallback))
    }
}

/// Profile update was rejected. Local state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UpdateError {
    pub message: String,
}

impl UpdateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A wallet, transaction or payout read failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn from_gateway(err: &GatewayError, fallback: &str) -> Self {
        Self::new(err.user_message(fallback))
    }
}

/// Background enrichment failed. Never surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum EnhancementError {
    #[error("remote fetch failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("session ended before enrichment could be merged")]
    SessionGone,

    #[error("session was replaced before enrichment could be merged")]
    SessionReplaced,

    #[error("failed to persist enriched session: {0}")]
    Persistence(#[from] VaultError),
}

/// Session vault error.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type VaultResult<T> = Result<T, VaultError>;
