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

//! Local analysis settings consumed by the server protocol layer

use std::collections::HashMap;

/// Read-only view over the settings of the analysis being prepared
///
/// Blank values are reported as absent.
pub trait AnalysisSettings: Send + Sync {
    /// Key of the analyzed project
    fn project_key(&self) -> Option<&str>;

    /// Organization the project belongs to
    fn organization(&self) -> Option<&str>;

    /// Look up a named setting
    fn setting(&self, key: &str) -> Option<&str>;

    /// Look up the first of several alternative settings that has a value
    fn first_setting(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.setting(key))
    }
}

/// In-memory analysis settings
#[derive(Debug, Clone, Default)]
pub struct ProcessedArgs {
    project_key: Option<String>,
    organization: Option<String>,
    settings: HashMap<String, String>,
}

impl ProcessedArgs {
    /// Create settings for the given project
    pub fn new(project_key: impl Into<String>) -> Self {
        Self {
            project_key: Some(project_key.into()),
            ..Default::default()
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }
}

impl AnalysisSettings for ProcessedArgs {
    fn project_key(&self) -> Option<&str> {
        non_blank(self.project_key.as_deref())
    }

    fn organization(&self) -> Option<&str> {
        non_blank(self.organization.as_deref())
    }

    fn setting(&self, key: &str) -> Option<&str> {
        non_blank(self.settings.get(key).map(String::as_str))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
