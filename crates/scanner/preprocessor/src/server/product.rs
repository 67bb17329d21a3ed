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

//! Self-hosted vs. cloud classification

use scanner_common::ServerVersion;
use url::Url;

const CLOUD_HOST: &str = "sonarcloud.io";

/// The cloud service still answers `api/server/version` with 8.0.x
const CLOUD_REPORTED_VERSION: (u32, u32) = (8, 0);

/// Whether the server at `host_url` reporting `version` is SonarCloud
pub fn is_sonar_cloud(host_url: &Url, version: ServerVersion) -> bool {
    is_cloud_host(host_url) || (version.major, version.minor) == CLOUD_REPORTED_VERSION
}

fn is_cloud_host(host_url: &Url) -> bool {
    host_url
        .host_str()
        .map(|host| {
            let host = host.to_ascii_lowercase();
            host == CLOUD_HOST || host.ends_with(&format!(".{CLOUD_HOST}"))
        })
        .unwrap_or(false)
}
