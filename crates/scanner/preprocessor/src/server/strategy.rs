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

//! Version-gated endpoint selection
//!
//! Servers of different ages expose the same logical operation through
//! different endpoints and response shapes. Every such decision is a pure
//! function of the server kind and version.

use super::ServerKind;
use scanner_common::ServerVersion;

/// First version with `api/settings/values`
pub const SETTINGS_API: ServerVersion = ServerVersion::release(6, 3);

/// First version accepting `organization` on profile searches
pub const ORGANIZATION_PROFILES: ServerVersion = ServerVersion::release(6, 3);

/// First version reporting rule paging in a nested `paging` object
pub const NESTED_RULE_PAGING: ServerVersion = ServerVersion::release(9, 8);

/// First version serving the incremental PR analysis cache
pub const INCREMENTAL_CACHE: ServerVersion = ServerVersion::release(9, 9);

/// Versions from here up to [`MIN_SUPPORTED`] still work but are deprecated
pub const DEPRECATION_FLOOR: ServerVersion = ServerVersion::release(7, 9);

pub const MIN_SUPPORTED: ServerVersion = ServerVersion::release(8, 9);

/// Where analysis properties are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEndpoint {
    /// `api/settings/values`, with a fallback to the global settings
    Values,
    /// `api/properties`, returning a flat array
    LegacyProperties,
}

/// Shape of the paging information in a rule search response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePaging {
    /// `{"paging": {"total", "pageIndex", "pageSize"}}`
    Nested,
    /// `{"total", "p", "ps"}`
    Flat,
}

impl RulePaging {
    pub fn other(self) -> Self {
        match self {
            RulePaging::Nested => RulePaging::Flat,
            RulePaging::Flat => RulePaging::Nested,
        }
    }
}

pub fn settings_endpoint(kind: &ServerKind, version: ServerVersion) -> SettingsEndpoint {
    match kind {
        ServerKind::Cloud { .. } => SettingsEndpoint::Values,
        ServerKind::SelfHosted { .. } if version >= SETTINGS_API => SettingsEndpoint::Values,
        ServerKind::SelfHosted { .. } => SettingsEndpoint::LegacyProperties,
    }
}

/// Organization to scope quality profile searches with, if any
pub fn profile_organization(kind: &ServerKind, version: ServerVersion) -> Option<&str> {
    match kind {
        ServerKind::Cloud { organization } => Some(organization.as_str()),
        ServerKind::SelfHosted { organization } if version >= ORGANIZATION_PROFILES => organization.as_deref(),
        ServerKind::SelfHosted { .. } => None,
    }
}

pub fn rule_paging(kind: &ServerKind, version: ServerVersion) -> RulePaging {
    match kind {
        ServerKind::SelfHosted { .. } if version >= NESTED_RULE_PAGING => RulePaging::Nested,
        _ => RulePaging::Flat,
    }
}

pub fn supports_incremental_cache(kind: &ServerKind, version: ServerVersion) -> bool {
    match kind {
        ServerKind::Cloud { .. } => true,
        ServerKind::SelfHosted { .. } => version >= INCREMENTAL_CACHE,
    }
}

pub fn is_deprecated(kind: &ServerKind, version: ServerVersion) -> bool {
    match kind {
        ServerKind::Cloud { .. } => false,
        ServerKind::SelfHosted { .. } => DEPRECATION_FLOOR <= version && version < MIN_SUPPORTED,
    }
}
