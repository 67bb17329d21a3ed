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

//! Configuration for connecting to the analysis server

use scanner_common::{AnalysisSettings, properties};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Connection settings for the analysis server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the server, e.g. `https://sonarcloud.io`
    pub host_url: String,

    /// Organization key, mandatory on SonarCloud
    pub organization: Option<String>,

    /// Authentication token
    pub token: Option<String>,

    /// Login for basic authentication (or a token on older servers)
    pub user_name: Option<String>,

    pub password: Option<String>,

    /// PKCS#12 client certificate
    pub client_cert_path: Option<PathBuf>,

    pub client_cert_password: Option<String>,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host_url: "http://localhost:9000".to_string(),
            organization: None,
            token: None,
            user_name: None,
            password: None,
            client_cert_path: None,
            client_cert_password: None,
            request_timeout_secs: 100,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host_url: env::var("SONAR_HOST_URL").unwrap_or_else(|_| "http://localhost:9000".to_string()),

            organization: non_blank(env::var("SONAR_ORGANIZATION").ok()),

            token: non_blank(env::var("SONAR_TOKEN").ok()),

            user_name: non_blank(env::var("SONAR_LOGIN").ok()),

            password: non_blank(env::var("SONAR_PASSWORD").ok()),

            client_cert_path: non_blank(env::var("SONAR_CLIENT_CERT_PATH").ok()).map(PathBuf::from),

            client_cert_password: non_blank(env::var("SONAR_CLIENT_CERT_PASSWORD").ok()),

            request_timeout_secs: env::var("SONAR_REQUEST_TIMEOUT_SECS").map(|v| v.parse().unwrap_or(100)).unwrap_or(100),
        }
    }

    /// Read connection settings from the analysis settings
    ///
    /// Values missing from `settings` keep their defaults.
    pub fn from_settings(settings: &dyn AnalysisSettings) -> Self {
        let defaults = Self::default();
        Self {
            host_url: settings.setting(properties::HOST_URL).map(str::to_string).unwrap_or(defaults.host_url),
            organization: settings.organization().or_else(|| settings.setting(properties::ORGANIZATION)).map(str::to_string),
            token: settings.setting(properties::TOKEN).map(str::to_string),
            user_name: settings.setting(properties::LOGIN).map(str::to_string),
            password: settings.setting(properties::PASSWORD).map(str::to_string),
            client_cert_path: settings.setting(properties::CLIENT_CERT_PATH).map(PathBuf::from),
            client_cert_password: settings.setting(properties::CLIENT_CERT_PASSWORD).map(str::to_string),
            request_timeout_secs: defaults.request_timeout_secs,
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// User name sent to the server: the token wins over the login
    pub fn effective_user_name(&self) -> Option<String> {
        self.token.clone().or_else(|| self.user_name.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanner_common::ProcessedArgs;

    #[test]
    fn test_from_settings() {
        let args = ProcessedArgs::new("project")
            .with_organization("org42")
            .with_setting(properties::HOST_URL, "https://sonarcloud.io")
            .with_setting(properties::LOGIN, "admin")
            .with_setting(properties::PASSWORD, "secret");

        let config = ServerConfig::from_settings(&args);

        assert_eq!(config.host_url, "https://sonarcloud.io");
        assert_eq!(config.organization.as_deref(), Some("org42"));
        assert_eq!(config.effective_user_name().as_deref(), Some("admin"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout(), Duration::from_secs(100));
    }

    #[test]
    fn test_token_wins_over_login() {
        let args = ProcessedArgs::new("project").with_setting(properties::TOKEN, "squ_token").with_setting(properties::LOGIN, "admin");

        let config = ServerConfig::from_settings(&args);

        assert_eq!(config.host_url, "http://localhost:9000");
        assert_eq!(config.effective_user_name().as_deref(), Some("squ_token"));
    }
}
