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

//! Integration tests for server handle construction

mod common;

use common::{LogCapture, TestDownloader};
use scanner_common::ServerVersion;
use scanner_preprocessor::{ServerConfig, ServerError, ServerKind, create_server, create_server_from_config};
use std::sync::Arc;
use tracing::Level;

fn config(host_url: &str, organization: Option<&str>) -> ServerConfig {
    ServerConfig {
        host_url: host_url.to_string(),
        organization: organization.map(str::to_string),
        ..Default::default()
    }
}

fn version_downloader(version: &str) -> Arc<TestDownloader> {
    Arc::new(TestDownloader::new().with_page("api/server/version", version))
}

#[tokio::test]
async fn test_self_hosted_server() {
    let (logs, _guard) = LogCapture::install();
    let downloader = version_downloader("9.9.0.65466");

    let server = create_server(&config("http://localhost:9000", None), downloader.clone()).await.unwrap();

    assert_eq!(server.kind(), &ServerKind::SelfHosted { organization: None });
    assert_eq!(server.version(), ServerVersion::new(9, 9, 0, 65466));
    assert_eq!(downloader.requests(), ["api/server/version"]);
    logs.assert_none(Level::WARN);
    logs.assert_none(Level::ERROR);
}

#[tokio::test]
async fn test_version_qualifier_is_ignored() {
    let server = create_server(&config("http://localhost:9000", None), version_downloader("10.3.0.82913-SNAPSHOT")).await.unwrap();

    assert_eq!(server.version(), ServerVersion::new(10, 3, 0, 82913));
}

#[tokio::test]
async fn test_deprecated_version() {
    let (logs, _guard) = LogCapture::install();

    create_server(&config("http://localhost:9000", None), version_downloader("7.9.0.5545")).await.unwrap();

    assert_eq!(logs.messages(Level::WARN).len(), 1);
}

#[tokio::test]
async fn test_supported_and_older_versions_do_not_warn() {
    for version in ["9.9", "8.9.10.61524", "7.8", "6.2"] {
        let (logs, _guard) = LogCapture::install();

        create_server(&config("http://localhost:9000", None), version_downloader(version)).await.unwrap();

        logs.assert_none(Level::WARN);
    }
}

#[tokio::test]
async fn test_cloud_server() {
    for host_url in ["https://sonarcloud.io", "https://sc-staging.sonarcloud.io/"] {
        let server = create_server(&config(host_url, Some("org42")), version_downloader("10.4.0.1")).await.unwrap();

        assert_eq!(server.kind(), &ServerKind::Cloud { organization: "org42".to_string() });
    }
}

#[tokio::test]
async fn test_cloud_detected_by_version() {
    let (logs, _guard) = LogCapture::install();

    let server = create_server(&config("https://sonar.example.com", Some("org42")), version_downloader("8.0.0.29455")).await.unwrap();

    assert!(server.is_cloud());
    logs.assert_none(Level::WARN);
}

#[tokio::test]
async fn test_cloud_without_organization() {
    let (logs, _guard) = LogCapture::install();

    let result = create_server(&config("https://sonarcloud.io", Some(" ")), version_downloader("10.4.0.1")).await;

    assert!(matches!(result, Err(ServerError::Configuration { .. })));
    assert_eq!(logs.messages(Level::ERROR).len(), 1);
}

#[tokio::test]
async fn test_invalid_host_url() {
    for host_url in ["", "not a url", "ftp://localhost:9000", "localhost:9000"] {
        let (logs, _guard) = LogCapture::install();
        let downloader = version_downloader("9.9");

        let result = create_server(&config(host_url, None), downloader.clone()).await;

        assert!(matches!(result, Err(ServerError::Configuration { .. })), "{host_url}");
        assert!(downloader.requests().is_empty());
        assert_eq!(logs.messages(Level::ERROR).len(), 1);
    }
}

#[tokio::test]
async fn test_version_query_failure() {
    let (logs, _guard) = LogCapture::install();
    let downloader = Arc::new(TestDownloader::new().with_failure("api/server/version"));

    let result = create_server(&config("http://localhost:9000", None), downloader).await;

    assert!(matches!(result, Err(ServerError::Configuration { .. })));
    logs.assert_single(
        Level::ERROR,
        "Configuration error: An error occurred while querying the server version! Please check if the server is running and if the address is correct.",
    );
}

#[tokio::test]
async fn test_unparsable_version() {
    let result = create_server(&config("http://localhost:9000", None), version_downloader("<html></html>")).await;

    assert!(matches!(result, Err(ServerError::Configuration { .. })));
}

#[tokio::test]
async fn test_from_config_rejects_invalid_url() {
    let result = create_server_from_config(&config("file:///tmp/server", None)).await;

    assert!(matches!(result, Err(ServerError::Configuration { .. })));
}
