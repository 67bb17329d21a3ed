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

//! Rule catalog download

use super::strategy::{self, RulePaging};
use super::{SonarServer, encode};
use crate::error::ServerResult;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const PAGE_SIZE: u64 = 500;

const RULE_FIELDS: &str = "repo,name,severity,lang,internalKey,templateKey,params,actives";

/// Parameter of an active rule that replaces the rule key
const CHECK_ID: &str = "CheckId";

/// A rule of the catalog, as activated in one quality profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub repo_key: String,
    /// Rule key without the repository prefix
    pub rule_key: String,
    pub internal_key_or_key: String,
    pub template_key: Option<String>,
    /// Parameters of the active rule, `None` when the rule is inactive
    pub parameters: Option<BTreeMap<String, String>>,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
struct RulesPage {
    #[serde(default)]
    rules: Vec<RuleDto>,
    #[serde(default)]
    actives: HashMap<String, Vec<ActiveRule>>,
    total: Option<u64>,
    ps: Option<u64>,
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paging {
    total: Option<u64>,
    page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleDto {
    key: String,
    repo: String,
    internal_key: Option<String>,
    template_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActiveRule {
    q_profile: String,
    #[serde(default)]
    params: Vec<RuleParam>,
}

#[derive(Debug, Deserialize)]
struct RuleParam {
    key: String,
    value: String,
}

impl SonarServer {
    /// Download every rule of the catalog, flagging those active in `quality_profile`
    pub async fn download_rules(&self, quality_profile: &str) -> ServerResult<Vec<Rule>> {
        let paging = strategy::rule_paging(&self.kind, self.version);
        let mut rules = Vec::new();
        let mut fetched = 0;
        let mut page = 1;

        loop {
            let path = format!("api/rules/search?f={RULE_FIELDS}&ps={PAGE_SIZE}&qprofile={}&p={page}", encode(quality_profile));
            let contents = self.downloader.download(&path, true).await?;
            let response: RulesPage = serde_json::from_str(&contents)?;

            if response.rules.is_empty() {
                break;
            }

            let (total, page_size) = response.paging(paging);
            fetched += page_size;
            rules.extend(response.into_rules(quality_profile));

            if fetched >= total {
                break;
            }
            page += 1;
        }

        debug!("Downloaded {} rules for quality profile {}", rules.len(), quality_profile);
        Ok(rules)
    }
}

impl RulesPage {
    /// Total number of rules and size of this page
    ///
    /// Without any paging information the page is taken to be the last one.
    fn paging(&self, expected: RulePaging) -> (u64, u64) {
        self.read_paging(expected).or_else(|| self.read_paging(expected.other())).unwrap_or((0, PAGE_SIZE))
    }

    fn read_paging(&self, shape: RulePaging) -> Option<(u64, u64)> {
        let (total, page_size) = match shape {
            RulePaging::Nested => {
                let paging = self.paging.as_ref()?;
                (paging.total?, paging.page_size)
            }
            RulePaging::Flat => (self.total?, self.ps),
        };
        Some((total, page_size.filter(|&size| size > 0).unwrap_or(PAGE_SIZE)))
    }

    fn into_rules(self, quality_profile: &str) -> impl Iterator<Item = Rule> + '_ {
        let actives = self.actives;
        self.rules.into_iter().map(move |dto| {
            let active = actives.get(&dto.key).and_then(|entries| entries.iter().find(|a| a.q_profile == quality_profile));
            to_rule(dto, active)
        })
    }
}

fn to_rule(dto: RuleDto, active: Option<&ActiveRule>) -> Rule {
    let parameters: Option<BTreeMap<String, String>> = active.map(|a| a.params.iter().map(|p| (p.key.clone(), p.value.clone())).collect());

    let rule_key = match parameters.as_ref().and_then(|p| p.get(CHECK_ID)) {
        Some(check_id) => check_id.clone(),
        None => dto.key.split_once(':').map_or(dto.key.as_str(), |(_, key)| key).to_string(),
    };

    Rule {
        repo_key: dto.repo,
        internal_key_or_key: dto.internal_key.unwrap_or_else(|| rule_key.clone()),
        rule_key,
        template_key: dto.template_key,
        is_active: active.is_some(),
        parameters,
    }
}
