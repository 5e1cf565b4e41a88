// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON/HTTP implementation of [`RemoteGateway`].

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::{GatewayResult, RemoteGateway};
use crate::config::ClientConfig;
use crate::error::GatewayError;
use crate::models::{
    CreatorProfile, ImageUpload, PayoutSchedule, ProfileResponse, ProfileUpdateForm,
    Registration, RegistrationForm, TokenPair, TransactionPage, UpdateResponse, WalletSummary,
};

const LOGIN_PATH: &str = "api/v1/auth/login/";
const PROFILE_PATH: &str = "api/v1/auth/profile/";
const REGISTER_PATH: &str = "api/v1/auth/register/";
const LOGOUT_PATH: &str = "api/v1/auth/logout/";
const CREATORS_PATH: &str = "api/v1/creators/";
const CREATOR_SELF_PATH: &str = "api/v1/creators/me/";
const WALLET_PATH: &str = "api/v1/wallets/me/";
const WALLET_TXNS_PATH: &str = "api/v1/wallets/transactions/";
const PAYOUTS_PATH: &str = "api/v1/payouts/next/";

const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Remote API client over reqwest.
#[derive(Debug)]
pub struct HttpGateway {
    base_url: Url,
    http: Client,
    credentials: RwLock<Option<TokenPair>>,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> GatewayResult<Self> {
        let base_url = Url::parse(&format!("{}/", config.api_base_url.trim_end_matches('/')))
            .map_err(|e| {
                GatewayError::Transport(format!("invalid base URL {}: {e}", config.api_base_url))
            })?;

        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            http,
            credentials: RwLock::new(None),
        })
    }

    fn url(&self, path: &str, page: Option<u32>) -> GatewayResult<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| GatewayError::Transport(format!("invalid path {path}: {e}")))?;
        if let Some(page) = page {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }
        Ok(url)
    }

    fn access_token(&self) -> Option<String> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.refresh_token.clone())
    }

    fn request(
        &self,
        method: Method,
        url: Url,
        authenticated: bool,
    ) -> GatewayResult<RequestBuilder> {
        let request_id = Uuid::new_v4().to_string();
        debug!(method = %method, url = %url, request_id = %request_id, "Remote request");

        let mut builder = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id);

        if authenticated {
            let token = self.access_token().ok_or(GatewayError::Unauthenticated)?;
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        unwrap: Unwrap,
    ) -> GatewayResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let value = read_success_body(response).await?;
        let value = match unwrap {
            Unwrap::Envelope => unwrap_envelope(value),
            Unwrap::None => value,
        };
        serde_json::from_value(value).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        page: Option<u32>,
        unwrap: Unwrap,
    ) -> GatewayResult<T> {
        let builder = self.request(Method::GET, self.url(path, page)?, true)?;
        self.send_json(builder, unwrap).await
    }
}

/// Whether a `{status, data}` envelope should be peeled off the payload.
#[derive(Debug, Clone, Copy)]
enum Unwrap {
    Envelope,
    None,
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    fn install_credentials(&self, tokens: Option<TokenPair>) {
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = tokens;
    }

    async fn authenticate(&self, email: &str, password: &str) -> GatewayResult<TokenPair> {
        let builder = self
            .request(Method::POST, self.url(LOGIN_PATH, None)?, false)?
            .json(&json!({ "email": email, "password": password }));
        self.send_json(builder, Unwrap::Envelope).await
    }

    async fn get_profile(&self) -> GatewayResult<ProfileResponse> {
        self.get(PROFILE_PATH, None, Unwrap::None).await
    }

    async fn register_user(&self, form: &RegistrationForm) -> GatewayResult<Registration> {
        let builder = self
            .request(Method::POST, self.url(REGISTER_PATH, None)?, false)?
            .json(form);
        self.send_json(builder, Unwrap::Envelope).await
    }

    async fn logout_user(&self) -> GatewayResult<()> {
        let refresh = self.refresh_token().unwrap_or_default();
        let builder = self
            .request(Method::POST, self.url(LOGOUT_PATH, None)?, true)?
            .json(&json!({ "refresh": refresh }));
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        read_success_body(response).await.map(|_| ())
    }

    async fn get_creator_by_slug(&self, slug: &str) -> GatewayResult<CreatorProfile> {
        let path = format!("{CREATORS_PATH}{slug}/");
        self.get(&path, None, Unwrap::Envelope).await
    }

    async fn get_wallet_data(&self, page: u32) -> GatewayResult<WalletSummary> {
        self.get(WALLET_PATH, Some(page), Unwrap::Envelope).await
    }

    async fn get_wallet_txn_data(&self, page: u32) -> GatewayResult<TransactionPage> {
        // `{data: [...], count}` is not an envelope: its `data` is an array
        self.get(WALLET_TXNS_PATH, Some(page), Unwrap::Envelope).await
    }

    async fn get_payouts_data(&self) -> GatewayResult<PayoutSchedule> {
        self.get(PAYOUTS_PATH, None, Unwrap::Envelope).await
    }

    async fn update_creator(&self, form: &ProfileUpdateForm) -> GatewayResult<UpdateResponse> {
        let mut body = multipart::Form::new();
        for (name, value) in form.text_fields() {
            body = body.text(name, value);
        }
        if let Some(image) = &form.profile_image {
            body = body.part("profile_image", image_part(image)?);
        }
        if let Some(image) = &form.cover_image {
            body = body.part("cover_image", image_part(image)?);
        }

        let builder = self
            .request(Method::PATCH, self.url(CREATOR_SELF_PATH, None)?, true)?
            .multipart(body);
        self.send_json(builder, Unwrap::None).await
    }
}

fn image_part(image: &ImageUpload) -> GatewayResult<multipart::Part> {
    multipart::Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)
        .map_err(|e| GatewayError::InvalidResponse(format!("invalid image content type: {e}")))
}

async fn read_success_body(response: Response) -> GatewayResult<Value> {
    let status = response.status();
    let url = response.url().path().to_string();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))?;

    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound(url));
    }

    if !status.is_success() {
        return Err(GatewayError::Rejected {
            status: status.as_u16(),
            message: extract_message(&body),
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body)
        .map_err(|e| GatewayError::InvalidResponse(format!("{url} invalid JSON: {e}")))
}

/// Pull a human-readable message out of an error body.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Peel a `{status|success, data: {...}}` envelope. Bare payloads and
/// envelopes whose `data` is not an object are returned unchanged.
fn unwrap_envelope(value: Value) -> Value {
    let is_envelope = value.get("data").is_some_and(Value::is_object)
        && (value.get("status").is_some() || value.get("success").is_some());
    if !is_envelope {
        return value;
    }
    match value {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}
