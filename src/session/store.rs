// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Store
//!
//! Sole owner of the authenticated session. Every mutation runs under one
//! write lock and persists to the [`SessionVault`] before it is published,
//! so the persisted mirror and the in-memory session never diverge.
//!
//! ## Versioning
//!
//! - `version` increases on every committed change.
//! - `generation` increases when the session identity changes (login,
//!   register, logout). Background enrichment captures the generation it
//!   was started for and is dropped if it no longer matches at merge time.

use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use super::enhancer::{EnrichmentPatch, ProfileEdits, SessionEnhancer};
use crate::error::{
    AuthError, EnhancementError, UpdateError, LOGIN_FAILED, NO_USER_FOUND, REGISTRATION_FAILED,
    UPDATE_FAILED,
};
use crate::gateway::RemoteGateway;
use crate::models::{
    supplied, Profile, ProfileUpdateForm, RegistrationForm, Session, TokenPair,
};
use crate::storage::SessionVault;

#[derive(Debug, Default)]
struct SessionState {
    session: Option<Session>,
    version: u64,
    generation: u64,
}

/// State shared between the store and background enrichment passes.
pub(crate) struct SessionCore {
    vault: SessionVault,
    state: RwLock<SessionState>,
    notifier: watch::Sender<Option<Session>>,
}

impl SessionCore {
    fn new(vault: SessionVault) -> Self {
        let (notifier, _) = watch::channel(None);
        Self {
            vault,
            state: RwLock::new(SessionState::default()),
            notifier,
        }
    }

    fn publish(&self, state: &mut SessionState, session: Option<Session>) {
        state.version += 1;
        state.session = session.clone();
        self.notifier.send_replace(session);
    }

    /// Merge an enrichment patch onto the session as it is now.
    ///
    /// Abandoned when the session is gone or belongs to a newer generation.
    pub(crate) async fn merge(
        &self,
        generation: u64,
        id: &str,
        patch: &EnrichmentPatch,
    ) -> Result<Session, EnhancementError> {
        let mut state = self.state.write().await;
        let Some(current) = state.session.clone() else {
            return Err(EnhancementError::SessionGone);
        };
        if state.generation != generation || current.profile.id != id {
            return Err(EnhancementError::SessionReplaced);
        }

        let mut merged = current;
        patch.apply(&mut merged.profile);
        self.vault.save(&merged)?;
        self.publish(&mut state, Some(merged.clone()));
        Ok(merged)
    }
}

pub struct SessionStore<G> {
    gateway: Arc<G>,
    core: Arc<SessionCore>,
    enhancer: SessionEnhancer<G>,
    tasks: TaskTracker,
}

impl<G: RemoteGateway> SessionStore<G> {
    pub fn new(gateway: Arc<G>, vault: SessionVault) -> Self {
        let core = Arc::new(SessionCore::new(vault));
        Self {
            enhancer: SessionEnhancer::new(gateway.clone(), core.clone()),
            gateway,
            core,
            tasks: TaskTracker::new(),
        }
    }

    /// Load the persisted session. Unreadable state counts as signed out.
    pub async fn restore(&self) -> Option<Session> {
        let restored = match self.core.vault.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session, starting signed out");
                None
            }
        };

        let mut state = self.core.state.write().await;
        self.gateway
            .install_credentials(restored.as_ref().map(|s| s.tokens.clone()));
        match &restored {
            Some(session) => info!(user_id = %session.profile.id, "Restored persisted session"),
            None => debug!("No persisted session"),
        }
        self.core.publish(&mut state, restored.clone());
        restored
    }

    /// Sign in and return the minimal profile. Enrichment continues in the
    /// background.
    pub async fn login(&self, email: &str, password: &str) -> Result<Profile, AuthError> {
        let tokens = self
            .gateway
            .authenticate(email, password)
            .await
            .map_err(|e| {
                debug!(error = %e, "Authentication rejected");
                AuthError::from_gateway(&e, LOGIN_FAILED)
            })?;

        self.gateway.install_credentials(Some(tokens.clone()));
        let profile = match self.gateway.get_profile().await {
            Ok(response) if response.is_success() => response.data,
            Ok(response) => {
                debug!(status = %response.status, "Profile lookup did not succeed");
                None
            }
            Err(e) => {
                self.reinstall_current_credentials();
                return Err(AuthError::from_gateway(&e, LOGIN_FAILED));
            }
        };

        let Some(session) = profile.and_then(|p| Session::new(p, tokens)) else {
            self.reinstall_current_credentials();
            return Err(AuthError::new(NO_USER_FOUND));
        };
        self.establish(session, LOGIN_FAILED).await
    }

    /// Create an account and sign in with the tokens it returns.
    pub async fn register(&self, form: &RegistrationForm) -> Result<Profile, AuthError> {
        let registration = self
            .gateway
            .register_user(form)
            .await
            .map_err(|e| AuthError::from_gateway(&e, REGISTRATION_FAILED))?;

        let Some(session) = Session::new(registration.user, registration.tokens) else {
            return Err(AuthError::new(REGISTRATION_FAILED));
        };
        self.gateway.install_credentials(Some(session.tokens.clone()));
        self.establish(session, REGISTRATION_FAILED).await
    }

    async fn establish(&self, session: Session, fallback: &str) -> Result<Profile, AuthError> {
        let profile = session.profile.clone();
        let generation = {
            let mut state = self.core.state.write().await;
            if let Err(e) = self.core.vault.save(&session) {
                error!(error = %e, "Failed to persist session");
                drop(state);
                self.reinstall_current_credentials();
                return Err(AuthError::new(fallback));
            }
            state.generation += 1;
            self.core.publish(&mut state, Some(session));
            state.generation
        };

        info!(user_id = %profile.id, slug = %profile.slug, "Session established");
        self.spawn_enhancement(profile.clone(), generation, None);
        Ok(profile)
    }

    /// Sign out. Local state is cleared even when the remote call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.gateway.logout_user().await {
            warn!(error = %e, "Remote logout failed, clearing local session anyway");
        }

        let mut state = self.core.state.write().await;
        if let Err(e) = self.core.vault.clear() {
            error!(error = %e, "Failed to clear persisted session");
        }
        state.generation += 1;
        self.core.publish(&mut state, None);
        self.gateway.install_credentials(None);
        info!("Session cleared");
    }

    /// Apply a profile edit.
    ///
    /// Text-only edits are merged and committed locally. Edits that carry
    /// images commit nothing here: the text edits ride along with an
    /// enrichment pass that also pulls the durable image URLs, so they land
    /// in a single commit or not at all.
    pub async fn update(&self, form: &ProfileUpdateForm) -> Result<UpdateOutcome, UpdateError> {
        let Some(before) = self.current() else {
            return Err(UpdateError::new(UPDATE_FAILED));
        };

        let response = self
            .gateway
            .update_creator(form)
            .await
            .map_err(|e| UpdateError::new(e.user_message(UPDATE_FAILED)))?;
        if !response.success {
            let message = supplied(&response.error).unwrap_or(UPDATE_FAILED);
            return Err(UpdateError::new(message));
        }

        let edits = ProfileEdits::from_form(form);
        let mut state = self.core.state.write().await;
        let Some(current) = state.session.clone() else {
            warn!("Session ended while profile update was in flight");
            return Err(UpdateError::new(UPDATE_FAILED));
        };
        if current.profile.id != before.profile.id {
            warn!("Session changed while profile update was in flight");
            return Err(UpdateError::new(UPDATE_FAILED));
        }

        if form.has_images() {
            let generation = state.generation;
            drop(state);
            info!(user_id = %current.profile.id, "Profile update deferred to enrichment");
            self.spawn_enhancement(current.profile, generation, Some(edits));
            return Ok(UpdateOutcome::Deferred);
        }

        let mut merged = current;
        edits.apply(&mut merged.profile);
        if let Err(e) = self.core.vault.save(&merged) {
            error!(error = %e, "Failed to persist updated profile");
            return Err(UpdateError::new(UPDATE_FAILED));
        }
        self.core.publish(&mut state, Some(merged.clone()));
        info!(user_id = %merged.profile.id, "Profile updated");
        Ok(UpdateOutcome::Committed(merged.profile))
    }

    fn spawn_enhancement(&self, base: Profile, generation: u64, edits: Option<ProfileEdits>) {
        let enhancer = self.enhancer.clone();
        self.tasks.spawn(async move { enhancer.run(base, generation, edits).await });
    }

    fn reinstall_current_credentials(&self) {
        self.gateway.install_credentials(self.current().map(|s| s.tokens));
    }

    /// Wait for every in-flight enrichment pass to finish.
    pub async fn settle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.core.notifier.subscribe()
    }

    pub fn current(&self) -> Option<Session> {
        self.core.notifier.borrow().clone()
    }

    pub fn current_tokens(&self) -> Option<TokenPair> {
        self.current().map(|s| s.tokens)
    }

    pub fn access_token(&self) -> Option<String> {
        self.current_tokens().map(|t| t.access_token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.core.notifier.borrow().is_some()
    }

    /// Number of committed changes so far.
    pub async fn version(&self) -> u64 {
        self.core.state.read().await.version
    }
}

/// Result of a successful [`SessionStore::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Merged and committed; the new profile.
    Committed(Profile),
    /// Accepted remotely; the session changes once enrichment commits.
    Deferred,
}

impl UpdateOutcome {
    pub fn committed(&self) -> Option<&Profile> {
        match self {
            Self::Committed(profile) => Some(profile),
            Self::Deferred => None,
        }
    }
}
