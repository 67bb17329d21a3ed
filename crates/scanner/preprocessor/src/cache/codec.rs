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

//! Length-delimited cache record codec
//!
//! Each record is a varint byte length followed by a protobuf-encoded
//! [`CacheEntry`]. Records are read until the input is exhausted.

use super::{CacheEntry, CacheError};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use prost::Message;
use std::io::{self, Read, Write};

/// Decode every record of an uncompressed payload, in stream order
pub fn decode_entries<R: Read>(mut reader: R) -> Result<Vec<CacheEntry>, CacheError> {
    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;

    let mut buf = payload.as_slice();
    let mut entries = Vec::new();
    while !buf.is_empty() {
        entries.push(CacheEntry::decode_length_delimited(&mut buf)?);
    }

    Ok(entries)
}

/// Decode a gzip-compressed payload
pub fn decode_compressed<R: Read>(reader: R) -> Result<Vec<CacheEntry>, CacheError> {
    decode_entries(GzDecoder::new(reader))
}

pub fn encode_entries(entries: &[CacheEntry]) -> Vec<u8> {
    entries.iter().flat_map(|entry| entry.encode_length_delimited_to_vec()).collect()
}

pub fn encode_compressed(entries: &[CacheEntry]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&encode_entries(entries))?;
    encoder.finish()
}
