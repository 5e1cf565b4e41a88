// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet summary and payout schedule loading.
//!
//! The summary feeds both the stat cards and the recent-activity rows. A
//! failed load keeps the previously held page and summary; nothing is reset
//! to page 1 implicitly.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::{FetchError, PAYOUTS_UNAVAILABLE, WALLET_UNAVAILABLE};
use crate::gateway::RemoteGateway;
use crate::load_state::LoadState;
use crate::models::{PayoutSchedule, RawTransaction, WalletSummary};

#[derive(Debug, Default)]
struct LoaderState {
    page: u32,
    generation: u64,
    summary: Option<WalletSummary>,
    load: LoadState,
    payouts_generation: u64,
    payouts: Option<PayoutSchedule>,
    payouts_load: LoadState,
}

pub struct WalletSummaryLoader<G> {
    gateway: Arc<G>,
    state: Mutex<LoaderState>,
}

impl<G: RemoteGateway> WalletSummaryLoader<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            state: Mutex::new(LoaderState {
                page: 1,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Load the summary for `page`.
    ///
    /// Returns `Ok(None)` when a newer load started before this one resolved;
    /// its result is discarded.
    pub async fn load(&self, page: u32) -> Result<Option<WalletSummary>, FetchError> {
        let page = page.max(1);
        let generation = {
            let mut state = self.lock();
            state.generation += 1;
            state.load = LoadState::Loading;
            state.generation
        };

        let result = self.gateway.get_wallet_data(page).await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(page, generation, "Discarding superseded wallet summary");
            return Ok(None);
        }
        match result {
            Ok(summary) => {
                state.page = page;
                state.summary = Some(summary.clone());
                state.load = LoadState::Loaded;
                Ok(Some(summary))
            }
            Err(e) => {
                warn!(page, held_page = state.page, error = %e, "Failed to load wallet summary");
                let error = FetchError::from_gateway(&e, WALLET_UNAVAILABLE);
                state.load = LoadState::Failed(error.message.clone());
                Err(error)
            }
        }
    }

    /// Load the next payout estimate. Independent of the summary state.
    pub async fn load_payouts(&self) -> Result<Option<PayoutSchedule>, FetchError> {
        let generation = {
            let mut state = self.lock();
            state.payouts_generation += 1;
            state.payouts_load = LoadState::Loading;
            state.payouts_generation
        };

        let result = self.gateway.get_payouts_data().await;

        let mut state = self.lock();
        if state.payouts_generation != generation {
            return Ok(None);
        }
        match result {
            Ok(schedule) => {
                state.payouts = Some(schedule.clone());
                state.payouts_load = LoadState::Loaded;
                Ok(Some(schedule))
            }
            Err(e) => {
                warn!(error = %e, "Failed to load payout schedule");
                let error = FetchError::from_gateway(&e, PAYOUTS_UNAVAILABLE);
                state.payouts_load = LoadState::Failed(error.message.clone());
                Err(error)
            }
        }
    }

    /// Page of the summary currently held.
    pub fn page(&self) -> u32 {
        self.lock().page
    }

    pub fn summary(&self) -> Option<WalletSummary> {
        self.lock().summary.clone()
    }

    pub fn recent_transactions(&self) -> Option<Vec<RawTransaction>> {
        self.lock()
            .summary
            .as_ref()
            .map(|s| s.recent_transactions.clone())
    }

    pub fn state(&self) -> LoadState {
        self.lock().load.clone()
    }

    pub fn payouts(&self) -> Option<PayoutSchedule> {
        self.lock().payouts.clone()
    }

    pub fn payouts_state(&self) -> LoadState {
        self.lock().payouts_load.clone()
    }
}
