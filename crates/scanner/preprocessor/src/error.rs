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

//! Error handling for the server protocol layer

use crate::transport::TransportError;
use thiserror::Error;

/// Remediation text shown when a quality profile search is ambiguous
pub const UNSUPPORTED_SERVER_MESSAGE: &str = "It seems that you are using an old version of SonarQube which is not supported anymore. Please update to at least 6.7.";

/// Server protocol errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// The server cannot be reached or addressed with the given settings
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid argument: {name} must not be empty")]
    InvalidArgument { name: &'static str },

    /// A setting came back without `value`, `values` or `fieldValues`
    #[error("Invalid property: {key}")]
    InvalidProperty { key: String },

    /// The profile search did not yield a single profile for the language
    #[error("{}", UNSUPPORTED_SERVER_MESSAGE)]
    AmbiguousQualityProfile { language: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Serde JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ServerError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        ServerError::Configuration { message: message.into() }
    }
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;
