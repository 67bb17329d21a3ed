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

//! Analysis properties retrieval

use super::strategy::{self, SettingsEndpoint};
use super::{Properties, SonarServer, component_key};
use crate::error::{ServerError, ServerResult};
use indexmap::IndexMap;
use scanner_common::properties::{DEFAULT_TEST_PROJECT_PATTERN, LEGACY_TEST_PROJECT_PATTERN, TEST_PROJECT_PATTERN};
use serde::Deserialize;
use tracing::warn;

const SETTINGS_PATH: &str = "api/settings/values";

/// Body of `api/settings/values`
#[derive(Debug, Deserialize)]
struct SettingsResponse {
    #[serde(default)]
    settings: Vec<Setting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Setting {
    key: String,
    value: Option<String>,
    values: Option<Vec<String>>,
    field_values: Option<Vec<IndexMap<String, String>>>,
}

/// Element of the `api/properties` array
#[derive(Debug, Deserialize)]
struct LegacyProperty {
    key: String,
    value: String,
}

impl SonarServer {
    /// Download the analysis properties of a project
    ///
    /// Multi-valued settings are joined with `,` and field sets are
    /// flattened to `<key>.<index>.<field>`.
    pub async fn download_properties(&self, project_key: &str, branch: Option<&str>) -> ServerResult<Properties> {
        if project_key.trim().is_empty() {
            return Err(ServerError::InvalidArgument { name: "project_key" });
        }

        let component = component_key(project_key, branch);
        match strategy::settings_endpoint(&self.kind, self.version) {
            SettingsEndpoint::Values => self.download_setting_values(&component).await,
            SettingsEndpoint::LegacyProperties => self.download_legacy_properties(&component).await,
        }
    }

    /// Server-wide settings, not scoped to any project
    async fn download_global_settings(&self) -> ServerResult<Properties> {
        let contents = self.downloader.download(SETTINGS_PATH, true).await?;
        parse_settings(&contents)
    }

    async fn download_setting_values(&self, component: &str) -> ServerResult<Properties> {
        let path = format!("{SETTINGS_PATH}?component={component}");
        match self.downloader.try_download_if_exists(&path, true).await? {
            Some(contents) => parse_settings(&contents),
            None => self.download_global_settings().await,
        }
    }

    async fn download_legacy_properties(&self, component: &str) -> ServerResult<Properties> {
        let path = format!("api/properties?resource={component}");
        let contents = self.downloader.download(&path, true).await?;
        let mut properties = Properties::new();
        for property in serde_json::from_str::<Vec<LegacyProperty>>(&contents)? {
            properties.entry(property.key).or_insert(property.value);
        }
        rename_legacy_test_pattern(&mut properties);
        Ok(properties)
    }
}

fn parse_settings(contents: &str) -> ServerResult<Properties> {
    let response: SettingsResponse = serde_json::from_str(contents)?;
    let mut properties = Properties::new();
    for setting in response.settings {
        for (key, value) in flatten(setting)? {
            properties.entry(key).or_insert(value);
        }
    }
    Ok(properties)
}

fn flatten(setting: Setting) -> ServerResult<Vec<(String, String)>> {
    if let Some(value) = setting.value {
        return Ok(vec![(setting.key, value)]);
    }
    if let Some(values) = setting.values {
        return Ok(vec![(setting.key, values.join(","))]);
    }
    match setting.field_values {
        Some(field_values) => Ok(field_values
            .into_iter()
            .enumerate()
            .flat_map(|(i, fields)| {
                let key = &setting.key;
                fields.into_iter().map(move |(field, value)| (format!("{key}.{}.{field}", i + 1), value))
            })
            .collect()),
        None => Err(ServerError::InvalidProperty { key: setting.key }),
    }
}

/// Old servers still publish the test project pattern under its C#-only key
fn rename_legacy_test_pattern(properties: &mut Properties) {
    let Some(pattern) = properties.shift_remove(LEGACY_TEST_PROJECT_PATTERN) else {
        return;
    };
    if pattern != DEFAULT_TEST_PROJECT_PATTERN {
        warn!(
            "The property '{}' is deprecated. Please use '{}' instead.",
            LEGACY_TEST_PROJECT_PATTERN, TEST_PROJECT_PATTERN
        );
    }
    properties.entry(TEST_PROJECT_PATTERN.to_string()).or_insert(pattern);
}
