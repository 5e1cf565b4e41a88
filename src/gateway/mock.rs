// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scripted in-process gateway for tests.
//!
//! Each call pops its next scripted result (falling back to a sticky default)
//! and then waits on an optional gate, so tests can hold a call open and
//! release it at a chosen moment or never.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{GatewayResult, RemoteGateway};
use crate::error::GatewayError;
use crate::models::{
    CreatorProfile, PayoutSchedule, ProfileResponse, ProfileUpdateForm, Registration,
    RegistrationForm, TokenPair, TransactionPage, UpdateResponse, WalletSummary,
};

pub(crate) struct Script<T> {
    queue: Mutex<VecDeque<GatewayResult<T>>>,
    fallback: Mutex<Option<GatewayResult<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(None),
        }
    }
}

impl<T: Clone> Script<T> {
    /// Queue a one-shot result.
    pub fn push(&self, result: GatewayResult<T>) {
        self.queue.lock().unwrap().push_back(result);
    }

    /// Result returned whenever the queue is empty.
    pub fn always(&self, result: GatewayResult<T>) {
        *self.fallback.lock().unwrap() = Some(result);
    }

    fn next(&self, call: &str) -> GatewayResult<T> {
        if let Some(result) = self.queue.lock().unwrap().pop_front() {
            return result;
        }
        self.fallback
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(GatewayError::Transport(format!("no script for {call}"))))
    }
}

#[derive(Default)]
pub(crate) struct MockGateway {
    pub authenticate: Script<TokenPair>,
    pub profile: Script<ProfileResponse>,
    pub register: Script<Registration>,
    pub logout: Script<()>,
    pub creator: Script<CreatorProfile>,
    pub wallet: Script<WalletSummary>,
    pub txns: Script<TransactionPage>,
    pub payouts: Script<PayoutSchedule>,
    pub update: Script<UpdateResponse>,
    calls: Mutex<Vec<String>>,
    credentials: Mutex<Option<TokenPair>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hold every call matching `key` until the returned gate is notified.
    ///
    /// Keys are call names, with `:{page}` appended for paged reads.
    pub fn hold(&self, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn installed_credentials(&self) -> Option<TokenPair> {
        self.credentials.lock().unwrap().clone()
    }

    async fn enter(&self, key: String) {
        self.calls.lock().unwrap().push(key.clone());
        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    fn install_credentials(&self, tokens: Option<TokenPair>) {
        *self.credentials.lock().unwrap() = tokens;
    }

    async fn authenticate(&self, _email: &str, _password: &str) -> GatewayResult<TokenPair> {
        let result = self.authenticate.next("authenticate");
        self.enter("authenticate".to_string()).await;
        result
    }

    async fn get_profile(&self) -> GatewayResult<ProfileResponse> {
        let result = self.profile.next("get_profile");
        self.enter("get_profile".to_string()).await;
        result
    }

    async fn register_user(&self, _form: &RegistrationForm) -> GatewayResult<Registration> {
        let result = self.register.next("register_user");
        self.enter("register_user".to_string()).await;
        result
    }

    async fn logout_user(&self) -> GatewayResult<()> {
        let result = self.logout.next("logout_user");
        self.enter("logout_user".to_string()).await;
        result
    }

    async fn get_creator_by_slug(&self, _slug: &str) -> GatewayResult<CreatorProfile> {
        let result = self.creator.next("get_creator_by_slug");
        self.enter("get_creator_by_slug".to_string()).await;
        result
    }

    async fn get_wallet_data(&self, page: u32) -> GatewayResult<WalletSummary> {
        let result = self.wallet.next("get_wallet_data");
        self.enter(format!("get_wallet_data:{page}")).await;
        result
    }

    async fn get_wallet_txn_data(&self, page: u32) -> GatewayResult<TransactionPage> {
        let result = self.txns.next("get_wallet_txn_data");
        self.enter(format!("get_wallet_txn_data:{page}")).await;
        result
    }

    async fn get_payouts_data(&self) -> GatewayResult<PayoutSchedule> {
        let result = self.payouts.next("get_payouts_data");
        self.enter("get_payouts_data".to_string()).await;
        result
    }

    async fn update_creator(&self, _form: &ProfileUpdateForm) -> GatewayResult<UpdateResponse> {
        let result = self.update.next("update_creator");
        self.enter("update_creator".to_string()).await;
        result
    }
}
