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

//! Server handle construction

use super::{SonarServer, product};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::transport::{Downloader, HttpDownloaderBuilder};
use scanner_common::ServerVersion;
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;

const VERSION_PATH: &str = "api/server/version";

/// Connect to the server described by `config` over HTTP
pub async fn create_server_from_config(config: &ServerConfig) -> ServerResult<SonarServer> {
    validate_host_url(&config.host_url)?;

    let downloader = HttpDownloaderBuilder::new(&config.host_url)
        .with_authorization(config.effective_user_name(), config.password.clone())
        .with_certificate(config.client_cert_path.clone(), config.client_cert_password.clone())
        .with_timeout(config.request_timeout())
        .build()
        .map_err(|e| fail(format!("Unable to create the HTTP client: {e}")))?;

    create_server(config, Arc::new(downloader)).await
}

/// Resolve the server kind and version behind `downloader`
///
/// Every failure is logged once as an error and no handle is returned.
pub async fn create_server(config: &ServerConfig, downloader: Arc<dyn Downloader>) -> ServerResult<SonarServer> {
    let host_url = validate_host_url(&config.host_url)?;
    let version = query_server_version(downloader.as_ref()).await?;

    let server = if product::is_sonar_cloud(&host_url, version) {
        match config.organization.as_deref().filter(|o| !o.trim().is_empty()) {
            Some(organization) => SonarServer::cloud(downloader, version, organization)?,
            None => return Err(fail("Organization parameter is required when connecting to SonarCloud.")),
        }
    } else {
        SonarServer::self_hosted(downloader, version, config.organization.clone())
    };

    server.warn_if_deprecated();
    Ok(server)
}

fn validate_host_url(host_url: &str) -> ServerResult<Url> {
    let url = Url::parse(host_url).map_err(|_| fail(format!("The server url should be a valid absolute URL: {host_url}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(fail(format!("The server url should start with http:// or https://: {host_url}"))),
    }
}

async fn query_server_version(downloader: &dyn Downloader) -> ServerResult<ServerVersion> {
    debug!("Fetching server version...");
    let version = match downloader.download(VERSION_PATH, true).await {
        Ok(contents) => parse_server_version(&contents),
        Err(e) => {
            debug!("Version query failed: {}", e);
            None
        }
    };
    version.ok_or_else(|| fail("An error occurred while querying the server version! Please check if the server is running and if the address is correct."))
}

/// Version reported by the server, ignoring any `-` qualifier
fn parse_server_version(contents: &str) -> Option<ServerVersion> {
    contents.split('-').next().and_then(|numeric| numeric.parse().ok())
}

fn fail(message: impl Into<String>) -> ServerError {
    let err = ServerError::configuration(message);
    error!("{}", err);
    err
}
