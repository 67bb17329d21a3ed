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

//! Handle on a connected analysis server
//!
//! A [`SonarServer`] binds together the transport, the server kind and the
//! version reported by the server. It is created once per analysis run by
//! [`factory::create_server`] and every protocol operation is a method on it.

pub mod cache;
pub mod factory;
mod license;
pub mod product;
mod profiles;
mod rules;
mod settings;
pub mod strategy;

use crate::error::{ServerError, ServerResult};
use crate::transport::Downloader;
use indexmap::IndexMap;
use scanner_common::{Environment, ProcessEnvironment, ServerVersion};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

pub use factory::{create_server, create_server_from_config};
pub use profiles::QualityProfile;
pub use rules::Rule;

/// Analysis properties in the order the server returned them
pub type Properties = IndexMap<String, String>;

/// Deployment variant of the analysis server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerKind {
    /// SonarQube
    SelfHosted { organization: Option<String> },
    /// SonarCloud; every request is scoped to an organization
    Cloud { organization: String },
}

impl ServerKind {
    pub fn is_cloud(&self) -> bool {
        matches!(self, ServerKind::Cloud { .. })
    }

    pub fn organization(&self) -> Option<&str> {
        match self {
            ServerKind::SelfHosted { organization } => organization.as_deref(),
            ServerKind::Cloud { organization } => Some(organization.as_str()),
        }
    }
}

/// Immutable handle on one analysis server
#[derive(Clone)]
pub struct SonarServer {
    kind: ServerKind,
    version: ServerVersion,
    downloader: Arc<dyn Downloader>,
    environment: Arc<dyn Environment>,
}

impl SonarServer {
    /// Handle on a SonarQube server
    pub fn self_hosted(downloader: Arc<dyn Downloader>, version: ServerVersion, organization: Option<String>) -> Self {
        Self::new(
            ServerKind::SelfHosted {
                organization: organization.filter(|o| !o.trim().is_empty()),
            },
            version,
            downloader,
        )
    }

    /// Handle on SonarCloud, which requires an organization
    pub fn cloud(downloader: Arc<dyn Downloader>, version: ServerVersion, organization: impl Into<String>) -> ServerResult<Self> {
        let organization = organization.into();
        if organization.trim().is_empty() {
            return Err(ServerError::InvalidArgument { name: "organization" });
        }
        Ok(Self::new(ServerKind::Cloud { organization }, version, downloader))
    }

    fn new(kind: ServerKind, version: ServerVersion, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            kind,
            version,
            downloader,
            environment: Arc::new(ProcessEnvironment),
        }
    }

    /// Replace the environment CI variables are read from
    pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = environment;
        self
    }

    pub fn kind(&self) -> &ServerKind {
        &self.kind
    }

    pub fn version(&self) -> ServerVersion {
        self.version
    }

    pub fn organization(&self) -> Option<&str> {
        self.kind.organization()
    }

    pub fn is_cloud(&self) -> bool {
        self.kind.is_cloud()
    }

    /// Warn once when the server is old enough to lose support soon
    pub fn warn_if_deprecated(&self) {
        if strategy::is_deprecated(&self.kind, self.version) {
            warn!(
                "The version of SonarQube you are using is deprecated. Please upgrade to SonarQube {}.{} or later, older versions will not be supported by the next major release of the scanner.",
                strategy::MIN_SUPPORTED.major,
                strategy::MIN_SUPPORTED.minor
            );
        }
    }
}

impl fmt::Debug for SonarServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SonarServer")
            .field("kind", &self.kind)
            .field("version", &self.version)
            .field("base_url", &self.downloader.base_url())
            .finish()
    }
}

/// Component identifier for project-scoped requests, form-url-encoded
pub(crate) fn component_key(project_key: &str, branch: Option<&str>) -> String {
    let component = match branch.filter(|b| !b.trim().is_empty()) {
        Some(branch) => format!("{project_key}:{branch}"),
        None => project_key.to_string(),
    };
    encode(&component)
}

pub(crate) fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
