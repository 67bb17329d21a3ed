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

//! Incremental pull-request analysis cache
//!
//! The server keeps a snapshot of previous analysis results per project and
//! branch. It is delivered as a sequence of length-delimited protobuf records
//! (see [`codec`]); SonarCloud additionally gzips the payload.

pub mod branch;
pub mod codec;

use crate::transport::TransportError;
use thiserror::Error;

pub use branch::{CI_PROVIDERS, CiProvider, resolve_base_branch};
pub use codec::{decode_compressed, decode_entries, encode_compressed, encode_entries};

/// One cached analysis artifact
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CacheEntry {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into(), data: data.into() }
    }
}

/// Failures while retrieving the cache; always recoverable
#[derive(Error, Debug)]
pub enum CacheError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The payload stream could not be read or decompressed
    #[error("{0}")]
    Read(#[from] std::io::Error),

    /// A record in the payload is malformed
    #[error("Cache data is corrupt: {0}")]
    Corrupt(#[from] prost::DecodeError),

    #[error("Unreadable 'prepare_read' response: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("Invalid cache URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
