//! [`RunSource`] over the catalog's REST API.
//!
//! Requests go through one blocking `ureq` agent with connect and read
//! timeouts. Files can be routed through a same-origin proxy that takes the
//! target as its `url` query parameter. Bodies are read up to a configured
//! size limit.

use std::io::Read;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::cache::EntityKind;
use super::run::{RunDescription, RunEnvelope};
use super::source::RunSource;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// [`RunSource`] backed by the catalog's REST API.
#[derive(Debug)]
pub struct HttpRunSource {
    agent: ureq::Agent,
    config: ApiConfig,
}

impl HttpRunSource {
    /// Create a source with timeouts taken from the configuration.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(config.connect_timeout_ms))
            .timeout_read(Duration::from_millis(config.read_timeout_ms))
            .build();
        Self { agent, config }
    }

    /// URL of a REST resource below the API base.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// URL actually requested for a file, routed through the proxy if one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy URL is malformed.
    pub fn file_url(&self, url: &str) -> Result<String> {
        match self.config.proxy_url.as_deref() {
            None => Ok(url.to_string()),
            Some(proxy) => url::Url::parse_with_params(proxy, &[("url", url)])
                .map(String::from)
                .map_err(|err| Error::fetch(proxy, err)),
        }
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "GET");
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => {
                return Err(Error::fetch(url, format!("HTTP {code}")));
            }
            Err(ureq::Error::Transport(err)) => return Err(Error::fetch(url, err)),
        };
        read_limited(response, url, self.config.max_response_bytes)
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        Ok(serde_json::from_slice(&self.get_bytes(url)?)?)
    }
}

impl RunSource for HttpRunSource {
    fn run(&self, run_id: u64) -> Result<RunDescription> {
        let url = self.api_url(&format!("run/{run_id}"));
        let envelope: RunEnvelope = serde_json::from_slice(&self.get_bytes(&url)?)?;
        Ok(envelope.run)
    }

    fn text(&self, url: &str) -> Result<String> {
        let url = self.file_url(url)?;
        let bytes = self.get_bytes(&url)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn entity_name(&self, kind: EntityKind, id: u64) -> Result<Option<String>> {
        let url = self.api_url(&format!("{}/{id}", kind.path()));
        let body = self.get_json(&url)?;
        let pointer = match kind {
            EntityKind::Flow => "/flow/name",
            EntityKind::Dataset => "/data_set_description/name",
        };
        Ok(body.pointer(pointer).and_then(Value::as_str).map(str::to_string))
    }
}

/// Read a response body, refusing anything larger than `max_bytes`.
fn read_limited(response: ureq::Response, url: &str, max_bytes: usize) -> Result<Vec<u8>> {
    let declared = response.header("Content-Length").and_then(|len| len.parse::<u64>().ok());
    if declared.is_some_and(|len| len > max_bytes as u64) {
        return Err(Error::ResponseTooLarge { url: url.to_string(), limit: max_bytes });
    }

    let mut bytes = Vec::new();
    response.into_reader().take((max_bytes as u64).saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(Error::ResponseTooLarge { url: url.to_string(), limit: max_bytes });
    }
    Ok(bytes)
}
