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

//! Well-known analysis property keys

/// Server URL
pub const HOST_URL: &str = "sonar.host.url";

/// Organization the project belongs to (mandatory on SonarCloud)
pub const ORGANIZATION: &str = "sonar.organization";

/// Authentication token
pub const TOKEN: &str = "sonar.token";

/// Legacy login, also accepted as a token when no password is given
pub const LOGIN: &str = "sonar.login";

pub const PASSWORD: &str = "sonar.password";

pub const CLIENT_CERT_PATH: &str = "sonar.clientcert.path";

pub const CLIENT_CERT_PASSWORD: &str = "sonar.clientcert.password";

/// Base branch of the pull request being analyzed
pub const PULL_REQUEST_BASE: &str = "sonar.pullrequest.base";

/// Root URL of the SonarCloud sensor cache service, published as a server setting
pub const SENSOR_CACHE_BASE_URL: &str = "sonar.sensor.cache.baseUrl";

/// Server-side test project pattern understood by old servers
pub const LEGACY_TEST_PROJECT_PATTERN: &str = "sonar.cs.msbuild.testProjectPattern";

pub const TEST_PROJECT_PATTERN: &str = "sonar.msbuild.testProjectPattern";

pub const DEFAULT_TEST_PROJECT_PATTERN: &str = r"[^\\]*test[^\\]*$";
