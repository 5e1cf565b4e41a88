// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger rows from raw server payloads to a filtered, paged view.

pub mod filter;
pub mod normalize;
pub mod pagination;
pub mod pipeline;

pub use filter::{DateRange, FilterCriteria, KindFilter, StatusFilter};
pub use normalize::{normalize, normalize_all, Transaction, TransactionKind, TxStatus};
pub use pagination::{total_pages, PageControls, ViewMode};
pub use pipeline::{FetchOutcome, LedgerView, TransactionPipeline};
