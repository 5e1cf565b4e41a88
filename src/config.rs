// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names and defaults for the client. Everything is
//! read once at startup, before the session is restored.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DASHBOARD_API_BASE_URL` | Base URL of the remote API | `http://localhost:8000` |
//! | `DASHBOARD_DATA_DIR` | Directory holding the session vault | `./.dashboard` |
//! | `DASHBOARD_PAGE_SIZE` | Server page size for total page derivation | `10` |
//! | `DASHBOARD_SUMMARY_ROWS` | Rows shown in the overview activity table | `5` |
//! | `DASHBOARD_HTTP_TIMEOUT_SECS` | HTTP client timeout | `15` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,reqwest=warn` |

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Environment variable name for the remote API base URL.
pub const API_BASE_URL_ENV: &str = "DASHBOARD_API_BASE_URL";

/// Environment variable name for the local data directory.
///
/// The session vault (`session.redb`) lives directly under it.
pub const DATA_DIR_ENV: &str = "DASHBOARD_DATA_DIR";

/// Environment variable name for the server page size.
pub const PAGE_SIZE_ENV: &str = "DASHBOARD_PAGE_SIZE";

/// Environment variable name for the number of overview activity rows.
pub const SUMMARY_ROWS_ENV: &str = "DASHBOARD_SUMMARY_ROWS";

/// Environment variable name for the HTTP timeout in seconds.
pub const HTTP_TIMEOUT_ENV: &str = "DASHBOARD_HTTP_TIMEOUT_SECS";

/// Environment variable name selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_DATA_DIR: &str = "./.dashboard";

/// Number of ledger entries the server returns per transaction page.
///
/// Total page count is always `ceil(count / DEFAULT_PAGE_SIZE)`, never
/// derived from the length of the page that was just fetched.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub const DEFAULT_SUMMARY_ROWS: usize = 5;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// File name of the session vault inside the data directory.
pub const VAULT_FILE_NAME: &str = "session.redb";

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub page_size: u32,
    pub summary_rows: usize,
    pub http_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            page_size: DEFAULT_PAGE_SIZE,
            summary_rows: DEFAULT_SUMMARY_ROWS,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Blank values count as unset. Numeric values that fail to parse, and a
    /// zero page size, fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_base_url = get(API_BASE_URL_ENV)
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let data_dir = get(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let page_size = parse_or_default(PAGE_SIZE_ENV, get(PAGE_SIZE_ENV), DEFAULT_PAGE_SIZE);
        let page_size = if page_size == 0 {
            warn!(var = PAGE_SIZE_ENV, "Page size must be positive, using default");
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };

        let summary_rows =
            parse_or_default(SUMMARY_ROWS_ENV, get(SUMMARY_ROWS_ENV), DEFAULT_SUMMARY_ROWS);

        let http_timeout = Duration::from_secs(parse_or_default(
            HTTP_TIMEOUT_ENV,
            get(HTTP_TIMEOUT_ENV),
            DEFAULT_HTTP_TIMEOUT.as_secs(),
        ));

        Self {
            api_base_url,
            data_dir,
            page_size,
            summary_rows,
            http_timeout,
        }
    }

    /// Path of the redb session vault.
    pub fn vault_path(&self) -> PathBuf {
        self.data_dir.join(VAULT_FILE_NAME)
    }
}

fn parse_or_default<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!(var = name, value = %value, "Invalid numeric setting, using default");
            default
        }),
        None => default,
    }
}
