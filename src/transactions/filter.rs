// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client-side ledger filters.
//!
//! Filtering is a pure function of the loaded page, the criteria and the
//! caller's `now`. Date ranges are evaluated in the timezone of `now`.

use std::str::FromStr;

use chrono::{DateTime, Days, TimeDelta, TimeZone, Utc};

use super::normalize::{Transaction, TransactionKind};

/// Matches on canonical type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Only(TransactionKind),
}

/// Matches on canonical status, case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    Today,
    Last7Days,
    Last30Days,
}

impl DateRange {
    fn lookback_days(self) -> Option<u64> {
        match self {
            DateRange::Last7Days => Some(7),
            DateRange::Last30Days => Some(30),
            DateRange::All | DateRange::Today => None,
        }
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(DateRange::All),
            "today" => Ok(DateRange::Today),
            "7days" | "7d" => Ok(DateRange::Last7Days),
            "30days" | "30d" => Ok(DateRange::Last30Days),
            other => Err(format!("unknown date range: {other}")),
        }
    }
}

impl FromStr for KindFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(KindFilter::All),
            "" => Err("empty type filter".to_string()),
            other => Ok(KindFilter::Only(TransactionKind::from_canonical(other))),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "" => Err("empty status filter".to_string()),
            other => Ok(StatusFilter::Only(other.to_string())),
        }
    }
}

/// The three independent filters applied to a loaded page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub kind: KindFilter,
    pub status: StatusFilter,
    pub date_range: DateRange,
}

impl FilterCriteria {
    pub fn is_identity(&self) -> bool {
        *self == FilterCriteria::default()
    }

    pub fn matches<Tz: TimeZone>(&self, txn: &Transaction, now: &DateTime<Tz>) -> bool {
        self.matches_kind(txn) && self.matches_status(txn) && self.matches_date(txn, now)
    }

    /// Retain entries matching every filter, preserving order.
    pub fn apply<'a, Tz: TimeZone>(
        &self,
        txns: &'a [Transaction],
        now: &DateTime<Tz>,
    ) -> Vec<&'a Transaction> {
        txns.iter().filter(|txn| self.matches(txn, now)).collect()
    }

    fn matches_kind(&self, txn: &Transaction) -> bool {
        match &self.kind {
            KindFilter::All => true,
            KindFilter::Only(kind) => txn.kind == *kind,
        }
    }

    fn matches_status(&self, txn: &Transaction) -> bool {
        match &self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => txn.status.as_str().eq_ignore_ascii_case(status),
        }
    }

    fn matches_date<Tz: TimeZone>(&self, txn: &Transaction, now: &DateTime<Tz>) -> bool {
        if self.date_range == DateRange::All {
            return true;
        }
        // Undated entries only survive the `all` range
        let Some(created_at) = txn.created_at else {
            return false;
        };

        if self.date_range == DateRange::Today {
            return created_at.with_timezone(&now.timezone()).date_naive() == now.date_naive();
        }

        let Some(days) = self.date_range.lookback_days() else {
            return true;
        };
        let start = now
            .clone()
            .checked_sub_days(Days::new(days))
            .unwrap_or_else(|| now.clone() - TimeDelta::days(days as i64));
        created_at >= start.with_timezone(&Utc)
    }
}
