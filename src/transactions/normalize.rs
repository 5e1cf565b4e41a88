// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canonical ledger entries.
//!
//! Normalization is total: every [`RawTransaction`] maps to a
//! [`Transaction`], whatever shape the remote sent.
//!
//! ## Type classification
//!
//! | Raw code | Kind |
//! |----------|------|
//! | `CASH_IN` | `cash_in` |
//! | `FEE` | `fee` |
//! | `PAYOUT` | `payout` |
//! | `TRANSFER` | `transfer` |
//! | `REFUND` | `refund` |
//! | any other non-empty code | the code, lower-cased |
//! | empty or missing | `unknown` |
//!
//! The raw code is `transactionType`, falling back to `type`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::models::{coerce_decimal, RawTransaction};

/// Canonical transaction type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    CashIn,
    Fee,
    Payout,
    Transfer,
    Refund,
    Unknown,
    /// Unmapped server code, lower-cased.
    Other(String),
}

impl TransactionKind {
    /// Classify a raw server code.
    pub fn from_code(raw: Option<&str>) -> Self {
        let Some(code) = raw.filter(|c| !c.trim().is_empty()) else {
            return TransactionKind::Unknown;
        };
        match code {
            "CASH_IN" => TransactionKind::CashIn,
            "FEE" => TransactionKind::Fee,
            "PAYOUT" => TransactionKind::Payout,
            "TRANSFER" => TransactionKind::Transfer,
            "REFUND" => TransactionKind::Refund,
            other => Self::from_canonical(&other.to_lowercase()),
        }
    }

    /// Parse an already lower-cased canonical name.
    pub fn from_canonical(name: &str) -> Self {
        match name {
            "cash_in" => TransactionKind::CashIn,
            "fee" => TransactionKind::Fee,
            "payout" => TransactionKind::Payout,
            "transfer" => TransactionKind::Transfer,
            "refund" => TransactionKind::Refund,
            "unknown" => TransactionKind::Unknown,
            other => TransactionKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransactionKind::CashIn => "cash_in",
            TransactionKind::Fee => "fee",
            TransactionKind::Payout => "payout",
            TransactionKind::Transfer => "transfer",
            TransactionKind::Refund => "refund",
            TransactionKind::Unknown => "unknown",
            TransactionKind::Other(code) => code.as_str(),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Canonical transaction status, always lower-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TxStatus {
    Completed,
    Pending,
    Failed,
    Other(String),
}

impl TxStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        let lowered = raw.unwrap_or_default().to_lowercase();
        match lowered.as_str() {
            "completed" => TxStatus::Completed,
            "pending" => TxStatus::Pending,
            "failed" => TxStatus::Failed,
            _ => TxStatus::Other(lowered),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TxStatus::Completed => "completed",
            TxStatus::Pending => "pending",
            TxStatus::Failed => "failed",
            TxStatus::Other(status) => status.as_str(),
        }
    }
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TxStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A normalized ledger entry. Never mutated after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Option<String>,
    pub amount: Decimal,
    pub fee: Decimal,
    pub kind: TransactionKind,
    pub type_display: String,
    pub status: TxStatus,
    pub status_display: String,
    pub created_at: Option<DateTime<Utc>>,
    pub reference: Option<String>,
}

impl Transaction {
    /// Money leaving the wallet: negative amounts, fees and payouts.
    pub fn is_outgoing(&self) -> bool {
        self.amount < Decimal::ZERO
            || matches!(self.kind, TransactionKind::Fee | TransactionKind::Payout)
    }

    /// Absolute amount signed by direction, for display.
    pub fn signed_display_amount(&self) -> Decimal {
        let magnitude = self.amount.abs();
        if self.is_outgoing() {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// Serialized with the derived `display_amount` alongside the stored fields.
impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_struct("Transaction", 11)?;
        row.serialize_field("id", &self.id)?;
        row.serialize_field("amount", &self.amount)?;
        row.serialize_field("display_amount", &self.signed_display_amount())?;
        row.serialize_field("fee", &self.fee)?;
        row.serialize_field("kind", &self.kind)?;
        row.serialize_field("type_display", &self.type_display)?;
        row.serialize_field("status", &self.status)?;
        row.serialize_field("status_display", &self.status_display)?;
        row.serialize_field("created_at", &self.created_at)?;
        row.serialize_field("reference", &self.reference)?;
        row.serialize_field("outgoing", &self.is_outgoing())?;
        row.end()
    }
}

/// Normalize one raw entry.
pub fn normalize(raw: &RawTransaction) -> Transaction {
    let code = non_empty(&raw.transaction_type).or_else(|| non_empty(&raw.kind));

    let type_display = non_empty(&raw.type_display)
        .map(str::to_string)
        .unwrap_or_else(|| title_case_code(code));

    let status_display = non_empty(&raw.status_display)
        .or_else(|| non_empty(&raw.status))
        .unwrap_or("Unknown")
        .to_string();

    Transaction {
        id: raw.id.clone(),
        amount: coerce_amount(raw, "amount", raw.amount.as_ref()),
        fee: coerce_amount(raw, "fee", raw.fee.as_ref()),
        kind: TransactionKind::from_code(code),
        type_display,
        status: TxStatus::parse(raw.status.as_deref()),
        status_display,
        created_at: raw.created_at.as_deref().and_then(parse_timestamp),
        reference: raw.reference.clone(),
    }
}

/// Normalize a page of raw entries, preserving order.
pub fn normalize_all(raw: &[RawTransaction]) -> Vec<Transaction> {
    raw.iter().map(normalize).collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn coerce_amount(raw: &RawTransaction, field: &str, value: Option<&serde_json::Value>) -> Decimal {
    match value {
        None | Some(serde_json::Value::Null) => Decimal::ZERO,
        Some(value) => coerce_decimal(value).unwrap_or_else(|| {
            warn!(id = ?raw.id, field, value = %value, "Non-numeric amount, treating as zero");
            Decimal::ZERO
        }),
    }
}

/// `CASH_IN` → `Cash In`; empty → `Unknown`.
pub fn title_case_code(code: Option<&str>) -> String {
    let Some(code) = code.filter(|c| !c.is_empty()) else {
        return "Unknown".to_string();
    };
    code.to_lowercase()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse RFC 3339, then naive ISO date-time (assumed UTC), then a bare date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawTransaction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn mapped_codes_produce_canonical_kinds() {
        let table = [
            ("CASH_IN", TransactionKind::CashIn),
            ("FEE", TransactionKind::Fee),
            ("PAYOUT", TransactionKind::Payout),
            ("TRANSFER", TransactionKind::Transfer),
            ("REFUND", TransactionKind::Refund),
        ];
        for (code, expected) in table {
            assert_eq!(TransactionKind::from_code(Some(code)), expected);
        }
    }

    #[test]
    fn unmapped_codes_pass_through_lower_cased() {
        let kind = TransactionKind::from_code(Some("CHARGEBACK"));
        assert_eq!(kind, TransactionKind::Other("chargeback".to_string()));
        assert_eq!(kind.as_str(), "chargeback");
        assert_eq!(TransactionKind::from_code(Some("Tip")).as_str(), "tip");
        // lower-cased passthrough lands on a canonical name
        assert_eq!(TransactionKind::from_code(Some("Cash_In")), TransactionKind::CashIn);
    }

    #[test]
    fn empty_or_missing_code_is_unknown() {
        assert_eq!(TransactionKind::from_code(None), TransactionKind::Unknown);
        assert_eq!(TransactionKind::from_code(Some("")), TransactionKind::Unknown);
    }

    #[test]
    fn string_amount_and_status_are_canonicalized() {
        let txn = normalize(&raw(json!({
            "type": "CASH_IN",
            "amount": "10.50",
            "status": "COMPLETED"
        })));
        assert_eq!(txn.kind, TransactionKind::CashIn);
        assert_eq!(txn.amount, Decimal::new(105, 1));
        assert_eq!(txn.status, TxStatus::Completed);
        assert_eq!(txn.fee, Decimal::ZERO);
    }

    #[test]
    fn numeric_and_string_amounts_agree() {
        let from_number = normalize(&raw(json!({ "amount": 12.25, "fee": 0.75 })));
        let from_string = normalize(&raw(json!({ "amount": "12.25", "fee": "0.75" })));
        assert_eq!(from_number.amount, from_string.amount);
        assert_eq!(from_number.fee, from_string.fee);
        assert_eq!(from_number.fee, Decimal::new(75, 2));
    }

    #[test]
    fn garbage_amount_coerces_to_zero() {
        let txn = normalize(&raw(json!({ "amount": "n/a", "fee": null })));
        assert_eq!(txn.amount, Decimal::ZERO);
        assert_eq!(txn.fee, Decimal::ZERO);
    }

    #[test]
    fn transaction_type_takes_precedence_over_type() {
        let txn = normalize(&raw(json!({ "transactionType": "PAYOUT", "type": "FEE" })));
        assert_eq!(txn.kind, TransactionKind::Payout);
        let txn = normalize(&raw(json!({ "transactionType": "", "type": "FEE" })));
        assert_eq!(txn.kind, TransactionKind::Fee);
    }

    #[test]
    fn display_labels_carry_through_or_derive() {
        let supplied = normalize(&raw(json!({
            "type": "CASH_IN",
            "typeDisplay": "Tip received",
            "status": "PENDING",
            "statusDisplay": "Awaiting"
        })));
        assert_eq!(supplied.type_display, "Tip received");
        assert_eq!(supplied.status_display, "Awaiting");

        let derived = normalize(&raw(json!({ "type": "CASH_IN", "status": "PENDING" })));
        assert_eq!(derived.type_display, "Cash In");
        assert_eq!(derived.status_display, "PENDING");

        let empty = normalize(&raw(json!({})));
        assert_eq!(empty.type_display, "Unknown");
        assert_eq!(empty.status_display, "Unknown");
        assert_eq!(empty.status, TxStatus::Other(String::new()));
    }

    #[test]
    fn timestamps_parse_in_several_shapes() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 1, 8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2026-10-01T08:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-01T10:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-01T08:30:00.000"), Some(expected));
        assert_eq!(
            parse_timestamp("2026-10-01"),
            Some(Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn direction_follows_sign_and_kind() {
        let payout = normalize(&raw(json!({ "type": "PAYOUT", "amount": "20" })));
        assert!(payout.is_outgoing());
        assert_eq!(payout.signed_display_amount(), Decimal::new(-20, 0));

        let tip = normalize(&raw(json!({ "type": "CASH_IN", "amount": "20" })));
        assert!(!tip.is_outgoing());
        assert_eq!(tip.signed_display_amount(), Decimal::new(20, 0));

        let reversal = normalize(&raw(json!({ "type": "REFUND", "amount": -5 })));
        assert!(reversal.is_outgoing());
    }

    #[test]
    fn rows_serialize_with_signed_display_amount() {
        let fee = normalize(&raw(json!({ "id": 9, "type": "FEE", "amount": "1.50" })));
        let row = serde_json::to_value(&fee).unwrap();
        assert_eq!(row["display_amount"], json!("-1.50"));
        assert_eq!(row["amount"], json!("1.50"));
        assert_eq!(row["kind"], json!("fee"));
        assert_eq!(row["outgoing"], json!(true));
    }
}
