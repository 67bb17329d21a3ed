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

//! Shared fixtures: an in-memory downloader and a log recorder

#![allow(dead_code)]

use async_trait::async_trait;
use scanner_common::ServerVersion;
use scanner_preprocessor::transport::CacheStream;
use scanner_preprocessor::{Downloader, RawResponse, SonarServer, TransportError};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{self, Cursor, Read};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

pub const BASE_URL: &str = "http://localhost:9000/";

/// Downloader serving canned responses and recording every request
#[derive(Default)]
pub struct TestDownloader {
    pages: HashMap<String, String>,
    resources: HashMap<String, RawResponse>,
    streams: HashMap<String, Vec<u8>>,
    broken_streams: HashSet<String>,
    external: HashMap<String, RawResponse>,
    failures: HashSet<String>,
    requests: Mutex<Vec<String>>,
    external_requests: Mutex<Vec<(String, Option<String>)>>,
}

impl TestDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body for `download` and `try_download_if_exists`
    pub fn with_page(mut self, path: &str, body: &str) -> Self {
        self.pages.insert(path.to_string(), body.to_string());
        self
    }

    pub fn with_resource(mut self, path: &str, status: u16, body: &str) -> Self {
        self.resources.insert(path.to_string(), RawResponse::new(status, body.to_string()));
        self
    }

    pub fn with_stream(mut self, path: &str, payload: Vec<u8>) -> Self {
        self.streams.insert(path.to_string(), payload);
        self
    }

    /// A stream whose reads fail
    pub fn with_broken_stream(mut self, path: &str) -> Self {
        self.broken_streams.insert(path.to_string());
        self
    }

    pub fn with_external(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        let body: Vec<u8> = body.into();
        self.external.insert(url.to_string(), RawResponse::new(status, body));
        self
    }

    /// Every request to `path` fails with a network error
    pub fn with_failure(mut self, path: &str) -> Self {
        self.failures.insert(path.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn external_requests(&self) -> Vec<(String, Option<String>)> {
        self.external_requests.lock().unwrap().clone()
    }

    fn record(&self, path: &str) -> Result<(), TransportError> {
        self.requests.lock().unwrap().push(path.to_string());
        if self.failures.contains(path) {
            return Err(TransportError::Network(format!("connection reset while requesting {path}")));
        }
        Ok(())
    }

    fn not_found(path: &str) -> TransportError {
        TransportError::Status {
            url: format!("{BASE_URL}{path}"),
            status: 404,
        }
    }
}

#[async_trait]
impl Downloader for TestDownloader {
    fn base_url(&self) -> String {
        BASE_URL.to_string()
    }

    async fn download(&self, path: &str, _allow_cache: bool) -> Result<String, TransportError> {
        self.record(path)?;
        self.pages.get(path).cloned().ok_or_else(|| Self::not_found(path))
    }

    async fn try_download_if_exists(&self, path: &str, _allow_cache: bool) -> Result<Option<String>, TransportError> {
        self.record(path)?;
        Ok(self.pages.get(path).cloned())
    }

    async fn download_stream(&self, path: &str) -> Result<Option<CacheStream>, TransportError> {
        self.record(path)?;
        if self.broken_streams.contains(path) {
            return Ok(Some(Box::new(BrokenReader)));
        }
        Ok(self.streams.get(path).map(|payload| Box::new(Cursor::new(payload.clone())) as CacheStream))
    }

    async fn download_resource(&self, path: &str) -> Result<RawResponse, TransportError> {
        self.record(path)?;
        Ok(self.resources.get(path).cloned().unwrap_or_else(|| RawResponse::new(404, "")))
    }

    async fn get_external(&self, url: &str, bearer_token: Option<String>) -> Result<RawResponse, TransportError> {
        self.external_requests.lock().unwrap().push((url.to_string(), bearer_token));
        self.external.get(url).cloned().ok_or_else(|| TransportError::Network(format!("unexpected request to {url}")))
    }
}

struct BrokenReader;

impl Read for BrokenReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "stream reset by peer"))
    }
}

pub fn self_hosted(downloader: &Arc<TestDownloader>, version: &str, organization: Option<&str>) -> SonarServer {
    SonarServer::self_hosted(downloader.clone(), parse_version(version), organization.map(str::to_string)).with_environment(Arc::new(HashMap::<String, String>::new()))
}

pub fn cloud(downloader: &Arc<TestDownloader>, organization: &str) -> SonarServer {
    cloud_with_environment(downloader, organization, HashMap::new())
}

pub fn cloud_with_environment(downloader: &Arc<TestDownloader>, organization: &str, environment: HashMap<String, String>) -> SonarServer {
    SonarServer::cloud(downloader.clone(), parse_version("8.0.0.29455"), organization)
        .unwrap()
        .with_environment(Arc::new(environment))
}

fn parse_version(version: &str) -> ServerVersion {
    version.parse().unwrap()
}

/// Records the events emitted while it is installed
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl LogCapture {
    /// Record the events of the current thread until the guard is dropped
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));
        (capture, guard)
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.events.lock().unwrap().iter().filter(|(l, _)| *l == level).map(|(_, m)| m.clone()).collect()
    }

    pub fn assert_single(&self, level: Level, message: &str) {
        assert_eq!(self.messages(level), [message], "expected a single {level} message");
    }

    pub fn assert_logged(&self, level: Level, message: &str) {
        let messages = self.messages(level);
        assert!(messages.iter().any(|m| m == message), "{message:?} not found in {level} messages {messages:?}");
    }

    pub fn assert_none(&self, level: Level) {
        let messages = self.messages(level);
        assert!(messages.is_empty(), "unexpected {level} messages: {messages:?}");
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push((*event.metadata().level(), visitor.0));
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}
