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

//! Edition license check

use super::SonarServer;
use serde::Deserialize;
use tracing::{debug, error};

const LICENSE_PATH: &str = "api/editions/is_valid_license";

/// Marker in the 404 body of servers without the editions API
const UNKNOWN_URL: &str = "Unknown url";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LicenseResponse {
    #[serde(default)]
    is_valid_license: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorsResponse {
    #[serde(default)]
    errors: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    #[serde(default)]
    msg: String,
}

impl SonarServer {
    /// Whether the server edition allows running an analysis
    ///
    /// Never fails: every problem is logged as an error and reported as an
    /// invalid license.
    pub async fn is_server_license_valid(&self) -> bool {
        if self.is_cloud() {
            debug!("SonarCloud detected, skipping license check.");
            return true;
        }

        let response = match self.downloader.download_resource(LICENSE_PATH).await {
            Ok(response) => response,
            Err(e) => {
                error!("{} {}", self.invalid_license_message(), e);
                return false;
            }
        };

        match response.status {
            200 => match serde_json::from_slice::<LicenseResponse>(&response.body) {
                Ok(license) if license.is_valid_license => true,
                _ => self.invalid_license(),
            },
            401 => {
                error!("Unauthorized: Access is denied due to invalid credentials. Please check the authentication parameters.");
                false
            }
            // Community editions do not have the editions API at all
            404 if is_unknown_url(&response.body) => true,
            _ => self.invalid_license(),
        }
    }

    fn invalid_license(&self) -> bool {
        error!("{}", self.invalid_license_message());
        false
    }

    fn invalid_license_message(&self) -> String {
        format!("Your SonarQube instance seems to have an invalid license. Please check it. Server url: {}", self.downloader.base_url())
    }
}

fn is_unknown_url(body: &[u8]) -> bool {
    serde_json::from_slice::<ErrorsResponse>(body)
        .unwrap_or_default()
        .errors
        .iter()
        .any(|e| e.msg.contains(UNKNOWN_URL))
}
