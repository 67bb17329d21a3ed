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

//! Analysis server protocol layer
//!
//! This crate talks to a SonarQube or SonarCloud server before an analysis:
//! it resolves the server kind and version, checks the license, downloads
//! properties, quality profiles and rules, and fetches the incremental pull
//! request analysis cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod server;
pub mod transport;

pub use cache::{CacheEntry, CacheError};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{Properties, QualityProfile, Rule, ServerKind, SonarServer, create_server, create_server_from_config};
pub use transport::{Downloader, HttpDownloader, RawResponse, TransportError};
