// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Transport seam between the protocol layer and the HTTP stack
//!
//! Every server call goes through [`Downloader`]. One attempt is made per
//! call; retries are left to the caller.

pub mod http;

use async_trait::async_trait;
use bytes::Bytes;
use std::io::Read;
use thiserror::Error;

pub use http::{HttpDownloader, HttpDownloaderBuilder};

/// Byte stream carrying a cache payload, released when dropped
pub type CacheStream = Box<dyn Read + Send>;

/// Transport failures
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request to {url} failed with status code {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        match (err.status(), err.url()) {
            (Some(status), Some(url)) => TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            },
            _ => TransportError::Network(err.to_string()),
        }
    }
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidUrl(err.to_string())
    }
}

/// Status code and body of a response, whatever the status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, body: body.into() }
    }

    /// Whether the status code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Single-attempt HTTP access to the analysis server
///
/// Paths are relative to [`Downloader::base_url`], e.g. `api/server/version`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Server base URL, used in diagnostics
    fn base_url(&self) -> String;

    /// GET `path` and return the body; any non-2xx status is an error
    async fn download(&self, path: &str, allow_cache: bool) -> Result<String, TransportError>;

    /// GET `path`, mapping "404 Not Found" to `None`
    async fn try_download_if_exists(&self, path: &str, allow_cache: bool) -> Result<Option<String>, TransportError>;

    /// GET `path` as a byte stream, `None` when the server returned no payload
    async fn download_stream(&self, path: &str) -> Result<Option<CacheStream>, TransportError>;

    /// GET `path` and return the response whatever its status code
    async fn download_resource(&self, path: &str) -> Result<RawResponse, TransportError>;

    /// GET an absolute URL outside the server, optionally with a bearer token
    ///
    /// Server credentials are never sent along.
    async fn get_external(&self, url: &str, bearer_token: Option<String>) -> Result<RawResponse, TransportError>;
}
