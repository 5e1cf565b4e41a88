// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session, profile and credential types.

use serde::{Deserialize, Serialize};

use super::lenient::string_or_number;

/// Access/refresh credential pair issued by the remote.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    #[serde(alias = "access_token", alias = "access")]
    pub access_token: String,
    #[serde(default, alias = "refresh_token", alias = "refresh")]
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Creator profile as held locally and persisted under the `user` key.
///
/// The minimal fields arrive with login/register. `bio`, the image URLs and
/// `has_earnings` are enrichment fields filled in by the session enhancer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, alias = "first_name", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, alias = "last_name", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, alias = "phone_number", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, alias = "profile_image", skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, alias = "cover_image", skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, alias = "category_slugs", skip_serializing_if = "Vec::is_empty")]
    pub category_slugs: Vec<String>,
    #[serde(default, alias = "has_earnings")]
    pub has_earnings: bool,
}

impl Profile {
    /// Minimal profile with only an identifier and handle.
    pub fn minimal(id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// The authenticated actor: profile plus credentials.
///
/// A `Session` value always has a non-empty identifier and access token;
/// the unauthenticated state is represented by its absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub profile: Profile,
    pub tokens: TokenPair,
}

impl Session {
    /// Build a session, rejecting an empty identifier or access token.
    pub fn new(profile: Profile, tokens: TokenPair) -> Option<Self> {
        if profile.is_valid() && !tokens.access_token.trim().is_empty() {
            Some(Self { profile, tokens })
        } else {
            None
        }
    }
}

/// Envelope returned by the profile endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: Option<Profile>,
}

impl ProfileResponse {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

/// Tokens and profile delivered together by the registration endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: Profile,
}

/// Public creator page attributes used for enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfile {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, alias = "profile_image")]
    pub profile_image: Option<String>,
    #[serde(default, alias = "cover_image")]
    pub cover_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_accepts_numeric_id_and_snake_case_keys() {
        let profile: Profile = serde_json::from_value(json!({
            "id": 1,
            "slug": "a",
            "first_name": "Ada",
            "categorySlugs": ["music"]
        }))
        .unwrap();
        assert_eq!(profile.id, "1");
        assert_eq!(profile.first_name.as_deref(), Some("Ada"));
        assert_eq!(profile.category_slugs, vec!["music".to_string()]);
        assert!(!profile.has_earnings);
    }

    #[test]
    fn session_requires_identifier_and_token() {
        let tokens = TokenPair::new("T1", "T2");
        assert!(Session::new(Profile::minimal("1", "a"), tokens.clone()).is_some());
        assert!(Session::new(Profile::minimal("", "a"), tokens).is_none());
        assert!(Session::new(Profile::minimal("1", "a"), TokenPair::new("", "T2")).is_none());
    }

    #[test]
    fn registration_reads_flattened_tokens() {
        let reg: Registration = serde_json::from_value(json!({
            "accessToken": "T1",
            "refreshToken": "T2",
            "user": { "id": "7", "slug": "new" }
        }))
        .unwrap();
        assert_eq!(reg.tokens, TokenPair::new("T1", "T2"));
        assert_eq!(reg.user.slug, "new");
    }

    #[test]
    fn token_debug_is_redacted() {
        let rendered = format!("{:?}", TokenPair::new("secret-a", "secret-r"));
        assert!(!rendered.contains("secret"));
    }
}
