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

//! Base branch detection for pull request analysis

use scanner_common::{AnalysisSettings, Environment, properties};
use tracing::info;

/// A CI system and the variable it uses to expose the pull request target branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CiProvider {
    pub variable: &'static str,
    pub provider: &'static str,
}

/// Checked in order; the first non-empty variable wins
pub const CI_PROVIDERS: &[CiProvider] = &[
    CiProvider { variable: "ghprbTargetBranch", provider: "Jenkins" },
    CiProvider { variable: "gitlabTargetBranch", provider: "Jenkins" },
    CiProvider { variable: "BITBUCKET_TARGET_BRANCH", provider: "Jenkins" },
    CiProvider { variable: "GITHUB_BASE_REF", provider: "GitHub Actions" },
    CiProvider { variable: "CI_MERGE_REQUEST_TARGET_BRANCH_NAME", provider: "GitLab" },
    CiProvider { variable: "BITBUCKET_PR_DESTINATION_BRANCH", provider: "BitBucket Pipelines" },
];

/// Resolve the pull request base branch
///
/// An explicit `sonar.pullrequest.base` setting always wins over CI variables.
pub fn resolve_base_branch(settings: &dyn AnalysisSettings, environment: &dyn Environment) -> Option<String> {
    if let Some(branch) = settings.setting(properties::PULL_REQUEST_BASE) {
        return Some(branch.to_string());
    }

    CI_PROVIDERS.iter().find_map(|ci| {
        environment.var(ci.variable).map(|name| {
            info!("Incremental PR analysis: Automatically detected base branch '{}' from CI Provider '{}'.", name, ci.provider);
            name
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanner_common::ProcessedArgs;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_each_provider_is_detected() {
        let settings = ProcessedArgs::new("project");
        for ci in CI_PROVIDERS {
            let env = environment(&[(ci.variable, "branch-42")]);

            assert_eq!(resolve_base_branch(&settings, &env).as_deref(), Some("branch-42"));
        }
    }

    #[test]
    fn test_setting_supersedes_environment() {
        let settings = ProcessedArgs::new("project").with_setting(properties::PULL_REQUEST_BASE, "main");
        let env = environment(&[("GITHUB_BASE_REF", "wrong-branch")]);

        assert_eq!(resolve_base_branch(&settings, &env).as_deref(), Some("main"));
    }

    #[test]
    fn test_table_order_decides_between_providers() {
        let settings = ProcessedArgs::new("project");
        let env = environment(&[("BITBUCKET_PR_DESTINATION_BRANCH", "bitbucket"), ("GITHUB_BASE_REF", "github"), ("ghprbTargetBranch", "")]);

        assert_eq!(resolve_base_branch(&settings, &env).as_deref(), Some("github"));
    }

    #[test]
    fn test_no_branch() {
        assert_eq!(resolve_base_branch(&ProcessedArgs::new("project"), &HashMap::<String, String>::new()), None);
    }
}
