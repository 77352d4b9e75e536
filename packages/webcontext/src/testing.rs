//! Testing utilities: scripted fetcher and degraded-store fakes.
//!
//! These let applications (and this crate's own tests) exercise the
//! pipeline without network or store access.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::RwLock;
use std::time::Duration;

use crate::error::{FetchError, FetchResult, StoreError, StoreResult};
use crate::traits::{
    fetcher::{FetchedBody, Fetcher},
    kv::KvStore,
};

/// A fetcher with scripted responses and call tracking.
///
/// URLs without a scripted response fail with HTTP 404, which is the
/// shape extractors see for a dead link.
#[derive(Default)]
pub struct MockFetcher {
    responses: RwLock<HashMap<String, ScriptedResponse>>,
    calls: RwLock<Vec<String>>,
}

enum ScriptedResponse {
    Body {
        content_type: String,
        bytes: Vec<u8>,
    },
    ConnectionFailure,
}

impl MockFetcher {
    /// Create a mock fetcher with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script an HTML page for a URL.
    pub fn add_page(&self, url: impl Into<String>, html: impl Into<String>) {
        self.add_body(url, "text/html; charset=utf-8", html.into().into_bytes());
    }

    /// Script an arbitrary body for a URL.
    pub fn add_body(
        &self,
        url: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) {
        self.responses.write().unwrap().insert(
            url.into(),
            ScriptedResponse::Body {
                content_type: content_type.into(),
                bytes,
            },
        );
    }

    /// Script a connection failure for a URL.
    pub fn add_failure(&self, url: impl Into<String>) {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), ScriptedResponse::ConnectionFailure);
    }

    /// URLs fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of times a URL was fetched.
    pub fn call_count(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedBody> {
        self.calls.write().unwrap().push(url.to_string());

        match self.responses.read().unwrap().get(url) {
            Some(ScriptedResponse::Body {
                content_type,
                bytes,
            }) => Ok(FetchedBody {
                final_url: url.to_string(),
                status: 200,
                content_type: Some(content_type.clone()),
                bytes: bytes.clone(),
            }),
            Some(ScriptedResponse::ConnectionFailure) => Err(FetchError::Transport {
                url: url.to_string(),
                source: Box::new(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// A store whose every operation fails, for fail-open tests.
pub struct UnavailableStore;

#[async_trait]
impl KvStore for UnavailableStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(unavailable())
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> StoreResult<()> {
        Err(unavailable())
    }

    async fn incr(&self, _key: &str) -> StoreResult<i64> {
        Err(unavailable())
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> StoreResult<()> {
        Err(unavailable())
    }
}

fn unavailable() -> StoreError {
    StoreError::Backend(Box::new(io::Error::new(
        io::ErrorKind::ConnectionRefused,
        "store unavailable",
    )))
}
