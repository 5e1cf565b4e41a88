// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet summary, payout schedule and raw ledger payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient::{lenient_decimal, lenient_opt_decimal, lenient_opt_string};

/// Currency assumed when the wallet payload omits one.
pub const DEFAULT_CURRENCY: &str = "ZMW";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Ledger entry exactly as the remote sent it.
///
/// Every field is optional and loosely typed; see
/// [`crate::transactions::normalize`] for the canonical form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub fee: Option<Value>,
    #[serde(default, alias = "transaction_type")]
    pub transaction_type: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, alias = "type_display")]
    pub type_display: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "status_display")]
    pub status_display: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

/// One server page of the full ledger plus the total item count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    #[serde(default, alias = "results")]
    pub data: Vec<RawTransaction>,
    #[serde(default)]
    pub count: u64,
}

/// Server-reported pagination metadata attached to the wallet summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    #[serde(default, alias = "pages", alias = "total_pages")]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
}

/// Combined balance/earnings read feeding the stat cards and the recent
/// activity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub balance: Decimal,
    #[serde(
        default,
        alias = "cashIn",
        alias = "total_incoming",
        deserialize_with = "lenient_decimal"
    )]
    pub total_incoming: Decimal,
    #[serde(
        default,
        alias = "cashOut",
        alias = "total_outgoing",
        deserialize_with = "lenient_decimal"
    )]
    pub total_outgoing: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, alias = "kyc_level", deserialize_with = "lenient_opt_string")]
    pub kyc_level: Option<String>,
    #[serde(default, alias = "kyc_verified")]
    pub kyc_verified: bool,
    #[serde(default, alias = "total_earnings", deserialize_with = "lenient_opt_decimal")]
    pub total_earnings: Option<Decimal>,
    #[serde(default, alias = "transaction_count")]
    pub transaction_count: Option<u64>,
    #[serde(default, alias = "recent_transactions")]
    pub recent_transactions: Vec<RawTransaction>,
    #[serde(default)]
    pub pagination: Option<PaginationMeta>,
}

impl Default for WalletSummary {
    fn default() -> Self {
        Self {
            balance: Decimal::ZERO,
            total_incoming: Decimal::ZERO,
            total_outgoing: Decimal::ZERO,
            currency: default_currency(),
            kyc_level: None,
            kyc_verified: false,
            total_earnings: None,
            transaction_count: None,
            recent_transactions: Vec::new(),
            pagination: None,
        }
    }
}

impl WalletSummary {
    /// Whether the creator has ever earned anything.
    pub fn has_earnings(&self) -> bool {
        self.total_earnings.is_some_and(|e| e > Decimal::ZERO)
            || self.transaction_count.is_some_and(|c| c > 0)
    }

    /// Page count reported by the server, if any.
    pub fn total_pages(&self) -> Option<u32> {
        self.pagination.as_ref().and_then(|p| p.total_pages)
    }
}

/// Next payout estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutSchedule {
    #[serde(default, alias = "estimated_amount", deserialize_with = "lenient_decimal")]
    pub estimated_amount: Decimal,
    #[serde(default, alias = "date", alias = "payout_date")]
    pub payout_date: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
}
