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

//! Analysis server version numbers

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Four-part server version (`major.minor.patch.build`)
///
/// Components missing from the textual form are zero, so `"9.9"` and
/// `"9.9.0.0"` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: u32,
}

impl ServerVersion {
    /// Create a new server version
    pub const fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self { major, minor, patch, build }
    }

    /// Create a `major.minor` version
    pub const fn release(major: u32, minor: u32) -> Self {
        Self::new(major, minor, 0, 0)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.patch, self.build)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),
    #[error("Invalid number in version: {0}")]
    InvalidNumber(String),
}

impl FromStr for ServerVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('.').collect();

        if !(2..=4).contains(&parts.len()) {
            return Err(VersionParseError::InvalidFormat(s.to_string()));
        }

        let mut numbers = [0u32; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse::<u32>().map_err(|_| VersionParseError::InvalidNumber(part.to_string()))?;
        }

        Ok(ServerVersion::new(numbers[0], numbers[1], numbers[2], numbers[3]))
    }
}
