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

//! Incremental PR analysis cache download

use super::{SonarServer, encode, strategy};
use crate::cache::{self, CacheEntry, CacheError};
use crate::transport::TransportError;
use scanner_common::{AnalysisSettings, properties};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

const ERROR_PREFIX: &str = "Incremental PR analysis: an error occurred while retrieving the cache entries! ";

const PREPARE_READ_PATH: &str = "v1/sensor_cache/prepare_read";

/// Everything needed to fetch the cache of one project branch
#[derive(Debug)]
struct CacheRequest {
    project_key: String,
    branch: String,
    cloud: Option<CloudCache>,
}

#[derive(Debug)]
struct CloudCache {
    token: String,
    base_url: String,
}

impl SonarServer {
    /// Download the analysis cache of the pull request base branch
    ///
    /// The cache is optional: when it is unavailable or cannot be read the
    /// result is empty and the reason is logged.
    pub async fn download_cache(&self, settings: &dyn AnalysisSettings) -> Vec<CacheEntry> {
        let Some(request) = self.cache_request(settings).await else {
            return Vec::new();
        };

        info!("Downloading cache. Project key: {}, branch: {}.", request.project_key, request.branch);
        let result = match &request.cloud {
            Some(cloud) => self.download_cloud_cache(&request, cloud).await,
            None => self.download_server_cache(&request).await,
        };

        result.unwrap_or_else(|e| {
            warn!("{}{}", ERROR_PREFIX, e);
            Vec::new()
        })
    }

    async fn cache_request(&self, settings: &dyn AnalysisSettings) -> Option<CacheRequest> {
        if !strategy::supports_incremental_cache(&self.kind, self.version) {
            info!(
                "Incremental PR analysis is available starting with SonarQube {}.{} or later.",
                strategy::INCREMENTAL_CACHE.major,
                strategy::INCREMENTAL_CACHE.minor
            );
            return None;
        }

        let Some(project_key) = settings.project_key() else {
            info!("Incremental PR analysis: ProjectKey parameter was not provided.");
            return None;
        };

        let Some(branch) = cache::resolve_base_branch(settings, self.environment.as_ref()) else {
            info!("Incremental PR analysis: Base branch parameter was not provided.");
            return None;
        };

        let cloud = if self.is_cloud() {
            let Some(token) = settings.first_setting(&[properties::TOKEN, properties::LOGIN]) else {
                info!("Incremental PR analysis: Token parameter was not provided.");
                return None;
            };
            let Some(base_url) = self.cache_base_url(project_key).await else {
                info!("Incremental PR analysis: CacheBaseUrl was not successfully retrieved.");
                return None;
            };
            Some(CloudCache {
                token: token.to_string(),
                base_url,
            })
        } else {
            None
        };

        Some(CacheRequest {
            project_key: project_key.to_string(),
            branch,
            cloud,
        })
    }

    /// `sonar.sensor.cache.baseUrl` as seen by the project, falling back to the server settings
    async fn cache_base_url(&self, project_key: &str) -> Option<String> {
        match self.download_properties(project_key, None).await {
            Ok(settings) => settings.get(properties::SENSOR_CACHE_BASE_URL).filter(|url| !url.trim().is_empty()).cloned(),
            Err(e) => {
                debug!("Unable to read the project settings: {}", e);
                None
            }
        }
    }

    async fn download_server_cache(&self, request: &CacheRequest) -> Result<Vec<CacheEntry>, CacheError> {
        let path = format!("api/analysis_cache/get?project={}&branch={}", encode(&request.project_key), encode(&request.branch));
        match self.downloader.download_stream(&path).await? {
            Some(stream) => cache::decode_entries(stream),
            None => Ok(Vec::new()),
        }
    }

    async fn download_cloud_cache(&self, request: &CacheRequest, cloud: &CloudCache) -> Result<Vec<CacheEntry>, CacheError> {
        let Some(ephemeral_url) = self.prepare_read(request, cloud).await? else {
            return Ok(Vec::new());
        };

        let response = self.downloader.get_external(&ephemeral_url, None).await?;
        if !response.is_success() {
            return Err(TransportError::Status {
                url: ephemeral_url,
                status: response.status,
            }
            .into());
        }
        if response.body.is_empty() {
            return Ok(Vec::new());
        }
        cache::decode_compressed(&response.body[..])
    }

    /// Ask the cache service where the cache can be downloaded from
    async fn prepare_read(&self, request: &CacheRequest, cloud: &CloudCache) -> Result<Option<String>, CacheError> {
        let organization = self.organization().unwrap_or_default();
        let url = prepare_read_url(&cloud.base_url, organization, &request.project_key, &request.branch)?;

        debug!("Incremental PR Analysis: Requesting 'prepare_read' from {}", url);
        let response = self.downloader.get_external(url.as_str(), Some(cloud.token.clone())).await?;
        if !response.is_success() {
            debug!("{}'prepare_read' did not respond successfully.", ERROR_PREFIX);
            return Ok(None);
        }

        let body = response.text();
        if body.trim().is_empty() {
            debug!("{}'prepare_read' response was empty.", ERROR_PREFIX);
            return Ok(None);
        }

        let envelope = PrepareReadResponse::parse(&body)?;
        match envelope.url {
            Some(url) if envelope.enabled => Ok(Some(url)),
            _ => {
                debug!("{}'prepare_read' response: {}", ERROR_PREFIX, envelope);
                Ok(None)
            }
        }
    }
}

/// Answer of the cache service to `prepare_read`
#[derive(Debug, Clone, PartialEq, Eq)]
struct PrepareReadResponse {
    enabled: bool,
    url: Option<String>,
}

impl PrepareReadResponse {
    /// `enabled` comes either as a boolean or as a string
    fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(body)?;
        let enabled = match value.get("enabled") {
            Some(Value::Bool(enabled)) => *enabled,
            Some(Value::String(enabled)) => enabled.trim().eq_ignore_ascii_case("true"),
            _ => false,
        };
        let url = value.get("url").and_then(Value::as_str).filter(|url| !url.trim().is_empty()).map(str::to_string);
        Ok(Self { enabled, url })
    }
}

impl std::fmt::Display for PrepareReadResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let enabled = if self.enabled { "True" } else { "False" };
        write!(f, "{{ Enabled = {}, Url = {} }}", enabled, self.url.as_deref().unwrap_or_default())
    }
}

/// `<base>/v1/sensor_cache/prepare_read?organization=..&project=..&branch=..`
///
/// The base keeps its path, minus empty segments, and always ends with `/`.
fn prepare_read_url(base_url: &str, organization: &str, project_key: &str, branch: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base_url.trim())?;
    let mut path: String = base.path().split('/').filter(|s| !s.is_empty()).map(|s| format!("/{s}")).collect();
    path.push('/');
    base.set_path(&path);

    let mut url = base.join(PREPARE_READ_PATH)?;
    url.query_pairs_mut()
        .append_pair("organization", organization)
        .append_pair("project", project_key)
        .append_pair("branch", branch);
    Ok(url)
}
