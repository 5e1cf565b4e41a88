// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Dashboard
//!
//! Coordinates the wallet loader (parent source) with a transaction
//! pipeline (internal source) for one screen.
//!
//! - **Overview**: wallet summary for page 1, payout estimate, and the first
//!   few recent transactions taken from the summary.
//! - **Statement**: wallet summary for the current page plus the pipeline's
//!   own paged fetch, with filters and page controls.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::gateway::RemoteGateway;
use crate::load_state::LoadState;
use crate::models::{PayoutSchedule, WalletSummary};
use crate::transactions::{
    FetchOutcome, FilterCriteria, LedgerView, TransactionPipeline, ViewMode,
};
use crate::wallet::WalletSummaryLoader;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardMode {
    #[default]
    Overview,
    Statement,
}

impl DashboardMode {
    pub fn view_mode(self) -> ViewMode {
        match self {
            DashboardMode::Overview => ViewMode::Summary,
            DashboardMode::Statement => ViewMode::FullStatement,
        }
    }
}

/// Outcome of one refresh, per source.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub wallet: Result<(), FetchError>,
    pub payouts: Result<(), FetchError>,
    pub ledger: FetchOutcome,
}

/// Snapshot of everything the screen renders.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub mode: DashboardMode,
    pub summary: Option<WalletSummary>,
    /// Page count reported with the wallet summary; statement mode only.
    pub server_pages: Option<u32>,
    pub wallet_error: Option<String>,
    pub payouts: Option<PayoutSchedule>,
    pub payouts_error: Option<String>,
    pub ledger: LedgerView,
}

pub struct Dashboard<G> {
    mode: DashboardMode,
    wallet: WalletSummaryLoader<G>,
    ledger: TransactionPipeline<G>,
}

impl<G: RemoteGateway> Dashboard<G> {
    pub fn new(gateway: Arc<G>, config: &ClientConfig, mode: DashboardMode) -> Self {
        Self {
            mode,
            wallet: WalletSummaryLoader::new(gateway.clone()),
            ledger: TransactionPipeline::new(gateway, mode.view_mode(), config),
        }
    }

    pub fn mode(&self) -> DashboardMode {
        self.mode
    }

    pub fn wallet(&self) -> &WalletSummaryLoader<G> {
        &self.wallet
    }

    pub fn ledger(&self) -> &TransactionPipeline<G> {
        &self.ledger
    }

    /// Reload every source concurrently, then hand the wallet's state to the
    /// pipeline as its parent source.
    pub async fn refresh(&self) -> RefreshReport {
        let page = match self.mode {
            DashboardMode::Overview => 1,
            DashboardMode::Statement => self.ledger.page(),
        };
        debug!(mode = ?self.mode, page, "Refreshing dashboard");

        self.ledger.absorb_parent(LoadState::Loading, None);
        let (wallet, payouts, ledger) = tokio::join!(
            self.wallet.load(page),
            self.wallet.load_payouts(),
            self.ledger.fetch(),
        );
        let recent = self.wallet.recent_transactions();
        self.ledger.absorb_parent(self.wallet.state(), recent.as_deref());

        RefreshReport {
            wallet: wallet.map(|_| ()),
            payouts: payouts.map(|_| ()),
            ledger,
        }
    }

    /// Move the statement to `page` (at least 1) and refresh.
    pub async fn go_to_page(&self, page: u32) -> RefreshReport {
        self.ledger.set_page(page);
        self.refresh().await
    }

    /// Re-run only the transaction fetch.
    pub async fn retry(&self) -> FetchOutcome {
        self.ledger.retry().await
    }

    pub fn set_filters(&self, filters: FilterCriteria) {
        self.ledger.set_filters(filters);
    }

    pub fn view(&self) -> DashboardView {
        let wallet_state = self.wallet.state();
        let payouts_state = self.wallet.payouts_state();
        let summary = self.wallet.summary();
        let server_pages = match self.mode {
            DashboardMode::Overview => None,
            DashboardMode::Statement => summary.as_ref().and_then(WalletSummary::total_pages),
        };
        DashboardView {
            mode: self.mode,
            summary,
            server_pages,
            wallet_error: wallet_state.error().map(str::to_string),
            payouts: self.wallet.payouts(),
            payouts_error: payouts_state.error().map(str::to_string),
            ledger: self.ledger.view(),
        }
    }
}
