// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and profile update forms.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sign-up form sent to the registration endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Binary image attachment of a profile update.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Profile edit form. Unset or blank text fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdateForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub category_slugs: Option<Vec<String>>,
    pub profile_image: Option<ImageUpload>,
    pub cover_image: Option<ImageUpload>,
}

impl ProfileUpdateForm {
    /// Whether the form carries any image attachment.
    pub fn has_images(&self) -> bool {
        self.profile_image.is_some() || self.cover_image.is_some()
    }

    /// Text fields as multipart `(name, value)` pairs, blank values skipped.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        let scalar = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("bio", &self.bio),
            ("phone_number", &self.phone_number),
            ("email", &self.email),
        ];
        for (name, value) in scalar {
            if let Some(value) = supplied(value) {
                fields.push((name, value.to_string()));
            }
        }
        if let Some(slugs) = self.category_slugs.as_ref().filter(|s| !s.is_empty()) {
            fields.push(("category_slugs", slugs.join(",")));
        }
        fields
    }
}

/// A form value counts as supplied only when it is non-blank.
pub(crate) fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Result of the creator update endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}
