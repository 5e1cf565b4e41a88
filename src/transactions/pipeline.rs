// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction pipeline: fetch → normalize → filter → paginate.
//!
//! In full-statement mode the pipeline owns a paged fetch. Each fetch is
//! tagged with a generation; a response whose generation is no longer the
//! latest is dropped on arrival, so a slow page 1 can never overwrite page 2.
//!
//! A failed fetch keeps the last good page on display and surfaces the error
//! next to it until [`TransactionPipeline::retry`] succeeds.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use tracing::{debug, warn};

use super::filter::FilterCriteria;
use super::normalize::{normalize_all, Transaction};
use super::pagination::{total_pages, PageControls, ViewMode};
use crate::config::ClientConfig;
use crate::error::{FetchError, TRANSACTIONS_UNAVAILABLE};
use crate::gateway::RemoteGateway;
use crate::load_state::{combine, CombinedState, LoadState};
use crate::models::RawTransaction;

/// Result of one fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was loaded and is now displayed.
    Applied,
    /// The fetch failed; the previous page is still displayed.
    Failed(FetchError),
    /// A newer fetch started before this one resolved.
    Superseded,
    /// Summary views are fed by their parent and never fetch.
    Skipped,
}

/// Everything a ledger view needs to render.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerView {
    pub rows: Vec<Transaction>,
    pub loading: bool,
    pub error: Option<String>,
    pub controls: Option<PageControls>,
}

#[derive(Default)]
struct PipelineState {
    requested_page: u32,
    loaded_page: Option<u32>,
    generation: u64,
    transactions: Vec<Transaction>,
    total_count: u64,
    filters: FilterCriteria,
    parent: LoadState,
    internal: LoadState,
}

pub struct TransactionPipeline<G> {
    gateway: Arc<G>,
    mode: ViewMode,
    page_size: u32,
    summary_rows: usize,
    state: Mutex<PipelineState>,
}

impl<G: RemoteGateway> TransactionPipeline<G> {
    pub fn new(gateway: Arc<G>, mode: ViewMode, config: &ClientConfig) -> Self {
        Self {
            gateway,
            mode,
            page_size: config.page_size,
            summary_rows: config.summary_rows,
            state: Mutex::new(PipelineState {
                requested_page: 1,
                ..Default::default()
            }),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    fn lock(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Page the next fetch will request.
    pub fn page(&self) -> u32 {
        self.lock().requested_page
    }

    /// Page whose rows are currently displayed, if any.
    pub fn loaded_page(&self) -> Option<u32> {
        self.lock().loaded_page
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.lock().total_count, self.page_size)
    }

    /// Select the page for the next fetch. Pages start at 1.
    pub fn set_page(&self, page: u32) {
        self.lock().requested_page = page.max(1);
    }

    /// Select a page and fetch it.
    pub async fn go_to_page(&self, page: u32) -> FetchOutcome {
        self.set_page(page);
        self.fetch().await
    }

    /// Fetch the selected page.
    pub async fn fetch(&self) -> FetchOutcome {
        if self.mode == ViewMode::Summary {
            return FetchOutcome::Skipped;
        }

        let (page, generation) = {
            let mut state = self.lock();
            state.generation += 1;
            state.internal = LoadState::Loading;
            (state.requested_page, state.generation)
        };

        let result = self.gateway.get_wallet_txn_data(page).await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(
                page,
                generation,
                latest = state.generation,
                "Discarding superseded transaction page"
            );
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(body) => {
                state.transactions = normalize_all(&body.data);
                state.total_count = body.count;
                state.loaded_page = Some(page);
                state.internal = LoadState::Loaded;
                FetchOutcome::Applied
            }
            Err(e) => {
                warn!(page, error = %e, "Failed to load transaction page");
                let error = FetchError::from_gateway(&e, TRANSACTIONS_UNAVAILABLE);
                state.internal = LoadState::Failed(error.message.clone());
                FetchOutcome::Failed(error)
            }
        }
    }

    /// Re-run the fetch for the selected page.
    pub async fn retry(&self) -> FetchOutcome {
        self.fetch().await
    }

    /// Feed the parent coordinator's load state and recent rows.
    ///
    /// Summary views take the parent's rows as their data. A full statement
    /// only uses them as a placeholder until its own first page arrives.
    pub fn absorb_parent(&self, parent: LoadState, recent: Option<&[RawTransaction]>) {
        let mut state = self.lock();
        state.parent = parent;
        let Some(recent) = recent else {
            return;
        };
        match self.mode {
            ViewMode::Summary => {
                state.transactions = normalize_all(recent);
                state.loaded_page = Some(1);
            }
            ViewMode::FullStatement if state.loaded_page.is_none() => {
                state.transactions = normalize_all(recent);
            }
            ViewMode::FullStatement => {}
        }
    }

    pub fn filters(&self) -> FilterCriteria {
        self.lock().filters.clone()
    }

    pub fn set_filters(&self, filters: FilterCriteria) {
        self.lock().filters = filters;
    }

    pub fn reset_filters(&self) {
        self.lock().filters = FilterCriteria::default();
    }

    pub fn combined_state(&self) -> CombinedState {
        let state = self.lock();
        combine(&state.parent, &state.internal)
    }

    /// Navigation controls; absent in summary mode, on a single page, while
    /// loading, or while an error is shown.
    pub fn page_controls(&self) -> Option<PageControls> {
        if self.mode == ViewMode::Summary {
            return None;
        }
        let state = self.lock();
        let combined = combine(&state.parent, &state.internal);
        let pages = total_pages(state.total_count, self.page_size);
        if pages <= 1 || combined.loading || combined.error.is_some() {
            return None;
        }
        Some(PageControls::new(state.requested_page, pages))
    }

    /// Filtered rows plus display state, evaluated at `now`.
    pub fn view_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> LedgerView {
        let (rows, combined) = {
            let state = self.lock();
            let mut rows: Vec<Transaction> = state
                .filters
                .apply(&state.transactions, now)
                .into_iter()
                .cloned()
                .collect();
            if self.mode == ViewMode::Summary {
                rows.truncate(self.summary_rows);
            }
            (rows, combine(&state.parent, &state.internal))
        };
        LedgerView {
            rows,
            loading: combined.loading,
            error: combined.error,
            controls: self.page_controls(),
        }
    }

    /// [`Self::view_at`] using the local clock.
    pub fn view(&self) -> LedgerView {
        self.view_at(&Local::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::mock::MockGateway;
    use crate::models::TransactionPage;
    use crate::transactions::filter::StatusFilter;
    use crate::transactions::normalize::TransactionKind;
    use chrono::Utc;
    use serde_json::json;
    use std::time::Duration;

    fn page(rows: serde_json::Value, count: u64) -> TransactionPage {
        serde_json::from_value(json!({ "data": rows, "count": count })).unwrap()
    }

    fn statement(gateway: &Arc<MockGateway>) -> Arc<TransactionPipeline<MockGateway>> {
        Arc::new(TransactionPipeline::new(
            gateway.clone(),
            ViewMode::FullStatement,
            &ClientConfig::default(),
        ))
    }

    async fn wait_for_call(gateway: &MockGateway, key: &str) {
        for _ in 0..100 {
            if gateway.calls().iter().any(|c| c == key) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("{key} was never called");
    }

    #[tokio::test]
    async fn fetch_normalizes_the_page() {
        let gateway = MockGateway::new();
        gateway.txns.push(Ok(page(
            json!([{ "id": 1, "type": "CASH_IN", "amount": "10.50", "status": "COMPLETED" }]),
            1,
        )));
        let pipeline = statement(&gateway);

        assert_eq!(pipeline.fetch().await, FetchOutcome::Applied);

        let view = pipeline.view_at(&Utc::now());
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].kind, TransactionKind::CashIn);
        assert_eq!(view.rows[0].amount.to_string(), "10.50");
        assert_eq!(view.rows[0].status.as_str(), "completed");
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert!(view.controls.is_none());
    }

    #[tokio::test]
    async fn stale_page_response_is_discarded() {
        let gateway = MockGateway::new();
        gateway.txns.push(Ok(page(json!([{ "id": "p1", "type": "FEE" }]), 30)));
        gateway.txns.push(Ok(page(json!([{ "id": "p2", "type": "PAYOUT" }]), 30)));
        let gate = gateway.hold("get_wallet_txn_data:1");
        let pipeline = statement(&gateway);

        let slow = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.go_to_page(1).await })
        };
        wait_for_call(&gateway, "get_wallet_txn_data:1").await;

        assert_eq!(pipeline.go_to_page(2).await, FetchOutcome::Applied);
        gate.notify_one();
        assert_eq!(slow.await.unwrap(), FetchOutcome::Superseded);

        let view = pipeline.view_at(&Utc::now());
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].id.as_deref(), Some("p2"));
        assert_eq!(pipeline.loaded_page(), Some(2));
        assert_eq!(view.controls, Some(PageControls::new(2, 3)));
    }

    #[tokio::test]
    async fn failure_keeps_previous_rows_until_retry() {
        let gateway = MockGateway::new();
        gateway.txns.push(Ok(page(json!([{ "id": "a", "type": "FEE" }]), 20)));
        gateway.txns.push(Err(GatewayError::Transport("reset".into())));
        gateway.txns.push(Ok(page(json!([{ "id": "b", "type": "REFUND" }]), 20)));
        let pipeline = statement(&gateway);

        pipeline.fetch().await;
        let outcome = pipeline.go_to_page(2).await;
        assert_eq!(
            outcome,
            FetchOutcome::Failed(FetchError::new(TRANSACTIONS_UNAVAILABLE))
        );

        let view = pipeline.view_at(&Utc::now());
        assert_eq!(view.rows[0].id.as_deref(), Some("a"));
        assert_eq!(view.error.as_deref(), Some(TRANSACTIONS_UNAVAILABLE));
        assert!(view.controls.is_none());

        assert_eq!(pipeline.retry().await, FetchOutcome::Applied);
        let view = pipeline.view_at(&Utc::now());
        assert_eq!(view.rows[0].id.as_deref(), Some("b"));
        assert!(view.error.is_none());
        assert_eq!(gateway.call_count("get_wallet_txn_data:2"), 2);
    }

    #[tokio::test]
    async fn server_message_surfaces_on_failure() {
        let gateway = MockGateway::new();
        gateway.txns.push(Err(GatewayError::Rejected {
            status: 503,
            message: Some("Ledger offline".into()),
        }));
        let pipeline = statement(&gateway);
        pipeline.fetch().await;
        assert_eq!(pipeline.combined_state().error.as_deref(), Some("Ledger offline"));
    }

    #[tokio::test]
    async fn loading_is_visible_while_fetch_is_pending() {
        let gateway = MockGateway::new();
        gateway.txns.always(Ok(page(json!([]), 0)));
        let gate = gateway.hold("get_wallet_txn_data:1");
        let pipeline = statement(&gateway);

        let pending = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.fetch().await })
        };
        wait_for_call(&gateway, "get_wallet_txn_data:1").await;
        assert!(pipeline.combined_state().loading);

        gate.notify_one();
        pending.await.unwrap();
        assert!(!pipeline.combined_state().loading);
    }

    #[tokio::test]
    async fn summary_mode_uses_parent_rows_and_never_fetches() {
        let gateway = MockGateway::new();
        let pipeline = TransactionPipeline::new(
            gateway.clone(),
            ViewMode::Summary,
            &ClientConfig::default(),
        );
        let recent: Vec<RawTransaction> =
            serde_json::from_value(json!((0..8).map(|i| json!({ "id": i })).collect::<Vec<_>>()))
                .unwrap();

        assert_eq!(pipeline.fetch().await, FetchOutcome::Skipped);
        pipeline.absorb_parent(LoadState::Loaded, Some(&recent));

        let view = pipeline.view_at(&Utc::now());
        assert_eq!(view.rows.len(), ClientConfig::default().summary_rows);
        assert!(view.controls.is_none());
        assert_eq!(gateway.call_count("get_wallet_txn_data"), 0);
    }

    #[tokio::test]
    async fn parent_error_takes_priority() {
        let gateway = MockGateway::new();
        gateway.txns.push(Err(GatewayError::Transport("down".into())));
        let pipeline = statement(&gateway);
        pipeline.fetch().await;
        pipeline.absorb_parent(LoadState::Failed("parent".into()), None);
        assert_eq!(pipeline.combined_state().error.as_deref(), Some("parent"));

        pipeline.absorb_parent(LoadState::Loading, None);
        let combined = pipeline.combined_state();
        assert!(combined.loading);
        assert_eq!(combined.error.as_deref(), Some(TRANSACTIONS_UNAVAILABLE));
    }

    #[tokio::test]
    async fn filters_narrow_the_loaded_page() {
        let gateway = MockGateway::new();
        gateway.txns.push(Ok(page(
            json!([
                { "id": "a", "type": "FEE", "status": "COMPLETED" },
                { "id": "b", "type": "CASH_IN", "status": "PENDING" },
            ]),
            2,
        )));
        let pipeline = statement(&gateway);
        pipeline.fetch().await;

        pipeline.set_filters(FilterCriteria {
            status: StatusFilter::Only("pending".into()),
            ..Default::default()
        });
        let view = pipeline.view_at(&Utc::now());
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].id.as_deref(), Some("b"));

        pipeline.reset_filters();
        assert_eq!(pipeline.view_at(&Utc::now()).rows.len(), 2);
        assert_eq!(gateway.call_count("get_wallet_txn_data"), 1);
    }

    #[test]
    fn page_selection_is_clamped() {
        let pipeline = TransactionPipeline::new(
            MockGateway::new(),
            ViewMode::FullStatement,
            &ClientConfig::default(),
        );
        pipeline.set_page(0);
        assert_eq!(pipeline.page(), 1);
    }
}
