// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Best-effort session enrichment.
//!
//! Fetches the public creator page and the wallet summary concurrently,
//! reduces them to an [`EnrichmentPatch`] and merges it onto the session as
//! it exists at merge time. Failures are logged and otherwise ignored.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::store::SessionCore;
use crate::error::EnhancementError;
use crate::gateway::RemoteGateway;
use crate::models::{
    supplied, CreatorProfile, Profile, ProfileUpdateForm, Session, WalletSummary,
};

/// Text edits from a profile update form. Only supplied, non-blank values
/// are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEdits {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub category_slugs: Option<Vec<String>>,
}

impl ProfileEdits {
    pub fn from_form(form: &ProfileUpdateForm) -> Self {
        let keep = |value: &Option<String>| supplied(value).map(str::to_string);
        Self {
            first_name: keep(&form.first_name),
            last_name: keep(&form.last_name),
            bio: keep(&form.bio),
            phone_number: keep(&form.phone_number),
            email: keep(&form.email),
            category_slugs: form.category_slugs.clone().filter(|s| !s.is_empty()),
        }
    }

    /// Supplied values win; everything else keeps its current value.
    pub fn apply(&self, profile: &mut Profile) {
        let text = [
            (&mut profile.first_name, &self.first_name),
            (&mut profile.last_name, &self.last_name),
            (&mut profile.bio, &self.bio),
            (&mut profile.phone_number, &self.phone_number),
            (&mut profile.email, &self.email),
        ];
        for (target, value) in text {
            if let Some(value) = value {
                *target = Some(value.clone());
            }
        }
        if let Some(slugs) = &self.category_slugs {
            profile.category_slugs = slugs.clone();
        }
    }
}

/// Fields contributed by enrichment, plus any profile edits that were
/// waiting on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentPatch {
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
    pub has_earnings: bool,
    pub edits: Option<ProfileEdits>,
}

impl EnrichmentPatch {
    pub fn from_remote(creator: CreatorProfile, wallet: &WalletSummary) -> Self {
        Self {
            bio: creator.bio,
            profile_image: creator.profile_image,
            cover_image: creator.cover_image,
            has_earnings: wallet.has_earnings(),
            edits: None,
        }
    }

    pub fn with_edits(mut self, edits: Option<ProfileEdits>) -> Self {
        self.edits = edits;
        self
    }

    /// Pending edits first, then remote values. The remote bio always wins;
    /// empty remote image URLs keep the current ones.
    pub fn apply(&self, profile: &mut Profile) {
        if let Some(edits) = &self.edits {
            edits.apply(profile);
        }
        profile.bio = self.bio.clone();
        let images = [
            (&mut profile.profile_image, &self.profile_image),
            (&mut profile.cover_image, &self.cover_image),
        ];
        for (target, remote) in images {
            if let Some(value) = supplied(remote) {
                *target = Some(value.to_string());
            }
        }
        profile.has_earnings = self.has_earnings;
    }
}

pub struct SessionEnhancer<G> {
    gateway: Arc<G>,
    core: Arc<SessionCore>,
}

impl<G> Clone for SessionEnhancer<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            core: self.core.clone(),
        }
    }
}

impl<G: RemoteGateway> SessionEnhancer<G> {
    pub(crate) fn new(gateway: Arc<G>, core: Arc<SessionCore>) -> Self {
        Self { gateway, core }
    }

    /// Enrich the session started at `generation` for `base`, applying
    /// `edits` in the same commit.
    pub async fn enhance(
        &self,
        base: &Profile,
        generation: u64,
        edits: Option<ProfileEdits>,
    ) -> Result<Session, EnhancementError> {
        let (creator, wallet) = tokio::try_join!(
            self.gateway.get_creator_by_slug(&base.slug),
            self.gateway.get_wallet_data(1),
        )?;

        let patch = EnrichmentPatch::from_remote(creator, &wallet).with_edits(edits);
        self.core.merge(generation, &base.id, &patch).await
    }

    /// Run one pass, swallowing every failure.
    pub(crate) async fn run(self, base: Profile, generation: u64, edits: Option<ProfileEdits>) {
        match self.enhance(&base, generation, edits).await {
            Ok(session) => info!(
                user_id = %session.profile.id,
                has_earnings = session.profile.has_earnings,
                "Session enriched"
            ),
            Err(e @ (EnhancementError::SessionGone | EnhancementError::SessionReplaced)) => {
                debug!(user_id = %base.id, reason = %e, "Enrichment abandoned");
            }
            Err(e) => warn!(user_id = %base.id, error = %e, "Enrichment failed"),
        }
    }
}
