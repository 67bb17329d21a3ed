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

//! `reqwest`-backed transport

use super::{CacheStream, Downloader, RawResponse, TransportError};
use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, Identity, RequestBuilder, Response, StatusCode};
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 100;

/// Credentials attached to server requests
#[derive(Debug, Clone)]
enum Credentials {
    None,
    Bearer(String),
    Basic { user_name: String, password: String },
}

/// Builder for [`HttpDownloader`]
#[derive(Debug, Clone)]
pub struct HttpDownloaderBuilder {
    base_url: String,
    user_name: Option<String>,
    password: Option<String>,
    client_cert_path: Option<PathBuf>,
    client_cert_password: Option<String>,
    timeout: Duration,
}

impl HttpDownloaderBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_name: None,
            password: None,
            client_cert_path: None,
            client_cert_password: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Authenticate with a token (no password) or with basic credentials
    pub fn with_authorization(mut self, user_name: Option<String>, password: Option<String>) -> Self {
        self.user_name = user_name;
        self.password = password;
        self
    }

    /// Present a PKCS#12 client certificate
    pub fn with_certificate(mut self, path: Option<PathBuf>, password: Option<String>) -> Self {
        self.client_cert_path = path;
        self.client_cert_password = password;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpDownloader, TransportError> {
        let base_url = base_url_with_trailing_slash(&self.base_url)?;

        let credentials = match (self.user_name.filter(|u| !u.is_empty()), self.password.filter(|p| !p.is_empty())) {
            (Some(user_name), Some(password)) => Credentials::Basic { user_name, password },
            (Some(token), None) => Credentials::Bearer(token),
            _ => Credentials::None,
        };

        let mut client = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("ScannerPreprocessor/", env!("CARGO_PKG_VERSION")));

        if let Some(path) = &self.client_cert_path {
            let der = std::fs::read(path)?;
            let identity = Identity::from_pkcs12_der(&der, self.client_cert_password.as_deref().unwrap_or_default())?;
            client = client.identity(identity);
        }

        Ok(HttpDownloader {
            client: client.build()?,
            base_url,
            credentials,
        })
    }
}

/// HTTP transport bound to one analysis server
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl HttpDownloader {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::None => request,
            Credentials::Bearer(token) => request.bearer_auth(token),
            Credentials::Basic { user_name, password } => request.basic_auth(user_name, Some(password)),
        }
    }

    async fn get(&self, path: &str, allow_cache: bool) -> Result<Response, TransportError> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        debug!("Downloading from {}...", url);

        let mut request = self.authorize(self.client.get(url));
        if !allow_cache {
            request = request.header(CACHE_CONTROL, "no-cache");
        }

        Ok(request.send().await?)
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    fn base_url(&self) -> String {
        self.base_url.to_string()
    }

    async fn download(&self, path: &str, allow_cache: bool) -> Result<String, TransportError> {
        let response = self.get(path, allow_cache).await?;
        let response = ensure_success(response)?;
        Ok(response.text().await?)
    }

    async fn try_download_if_exists(&self, path: &str, allow_cache: bool) -> Result<Option<String>, TransportError> {
        let response = self.get(path, allow_cache).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("{} was not found on the server", response.url());
            return Ok(None);
        }
        let response = ensure_success(response)?;
        Ok(Some(response.text().await?))
    }

    async fn download_stream(&self, path: &str) -> Result<Option<CacheStream>, TransportError> {
        let response = self.get(path, true).await?;
        if !response.status().is_success() {
            debug!("No payload at {}: status code {}", response.url(), response.status());
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        Ok(Some(Box::new(Cursor::new(bytes))))
    }

    async fn download_resource(&self, path: &str) -> Result<RawResponse, TransportError> {
        let response = self.get(path, true).await?;
        let status = response.status().as_u16();
        Ok(RawResponse::new(status, response.bytes().await?))
    }

    async fn get_external(&self, url: &str, bearer_token: Option<String>) -> Result<RawResponse, TransportError> {
        let url = Url::parse(url)?;
        let mut request = self.client.get(url);
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        Ok(RawResponse::new(status, response.bytes().await?))
    }
}

fn ensure_success(response: Response) -> Result<Response, TransportError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(TransportError::Status {
            url: response.url().to_string(),
            status: response.status().as_u16(),
        })
    }
}

/// Relative parts of the base URL (like `/sonar`) are only kept by
/// `Url::join` when they end with a slash.
fn base_url_with_trailing_slash(base_url: &str) -> Result<Url, TransportError> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
