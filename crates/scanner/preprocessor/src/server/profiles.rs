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

//! Quality profiles and languages

use super::{SonarServer, component_key, encode, strategy};
use crate::error::{ServerError, ServerResult};
use serde::Deserialize;
use tracing::debug;

/// A named, language-scoped set of active rules
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityProfile {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub language: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Deserialize)]
struct ProfilesResponse {
    profiles: Option<Vec<QualityProfile>>,
}

#[derive(Debug, Deserialize)]
struct LanguagesResponse {
    #[serde(default)]
    languages: Vec<Language>,
}

#[derive(Debug, Deserialize)]
struct Language {
    key: String,
}

impl SonarServer {
    /// Key of the quality profile used for `language` by the project
    ///
    /// Falls back to the default profiles when the project is unknown to the
    /// server. Returns `None` when no profile covers the language.
    pub async fn download_quality_profile(&self, project_key: &str, branch: Option<&str>, language: &str) -> ServerResult<Option<String>> {
        let organization = strategy::profile_organization(&self.kind, self.version)
            .map(|org| format!("&organization={}", encode(org)))
            .unwrap_or_default();

        let path = format!("api/qualityprofiles/search?project={}{organization}", component_key(project_key, branch));
        let contents = match self.downloader.try_download_if_exists(&path, true).await? {
            Some(contents) => contents,
            None => {
                debug!("No quality profiles for project {}. Using the default profiles.", project_key);
                self.downloader.download(&format!("api/qualityprofiles/search?defaults=true{organization}"), true).await?
            }
        };

        select_profile(&contents, language)
    }

    /// Keys of every language known to the server
    pub async fn download_all_languages(&self) -> ServerResult<Vec<String>> {
        let contents = self.downloader.download("api/languages/list", true).await?;
        let response: LanguagesResponse = serde_json::from_str(&contents)?;
        Ok(response.languages.into_iter().map(|l| l.key).collect())
    }
}

fn select_profile(contents: &str, language: &str) -> ServerResult<Option<String>> {
    let ambiguous = || ServerError::AmbiguousQualityProfile { language: language.to_string() };

    let response: ProfilesResponse = serde_json::from_str(contents)?;
    let mut candidates = response.profiles.ok_or_else(ambiguous)?.into_iter().filter(|p| p.language == language);

    match (candidates.next(), candidates.next()) {
        (None, _) => Ok(None),
        (Some(profile), None) => Ok(Some(profile.key)),
        (Some(_), Some(_)) => Err(ambiguous()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_single_profile() {
        let contents = r#"{ "profiles": [
            { "key": "profile1k", "name": "profile1", "language": "cs" },
            { "key": "profile2k", "name": "profile2", "language": "vbnet" }
        ] }"#;

        assert_eq!(select_profile(contents, "cs").unwrap().as_deref(), Some("profile1k"));
        assert_eq!(select_profile(contents, "java").unwrap(), None);
    }

    #[test]
    fn test_several_profiles_for_one_language() {
        let contents = r#"{ "profiles": [
            { "key": "profile1k", "name": "profile1", "language": "cs", "isDefault": false },
            { "key": "profile4k", "name": "profile4", "language": "cs", "isDefault": true }
        ] }"#;

        let err = select_profile(contents, "cs").unwrap_err();
        assert_eq!(
            err.to_string(),
            "It seems that you are using an old version of SonarQube which is not supported anymore. Please update to at least 6.7."
        );
    }

    #[test]
    fn test_missing_profiles_list() {
        assert!(matches!(select_profile("{}", "cs"), Err(ServerError::AmbiguousQualityProfile { .. })));
    }
}
