use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use crate::IndexError;

/// Per-request deadline of index writes.
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// The search engine operations the indexer needs.
pub trait SearchBackend {
    /// Drop `index` if it exists and create it with `body` (settings + mappings).
    fn recreate_index(&mut self, index: &str, body: &Value) -> Result<(), IndexError>;
    fn index_doc(&mut self, index: &str, id: &str, doc: &Value) -> Result<(), IndexError>;
    fn count(&mut self, index: &str) -> Result<usize, IndexError>;
}

/// Elasticsearch over its REST API.
pub struct ElasticBackend {
    base: String,
    client: reqwest::blocking::Client,
}

impl ElasticBackend {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, IndexError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn check(index: &str, resp: reqwest::blocking::Response) -> Result<Value, IndexError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json()?);
        }
        Err(IndexError::Status {
            index: index.to_string(),
            status: status.as_u16(),
            body: resp.text().unwrap_or_default(),
        })
    }
}

impl SearchBackend for ElasticBackend {
    fn recreate_index(&mut self, index: &str, body: &Value) -> Result<(), IndexError> {
        let url = format!("{}/{index}", self.base);
        let resp = self.client.delete(&url).send()?;
        if resp.status() != StatusCode::NOT_FOUND {
            Self::check(index, resp)?;
        }
        let resp = self.client.put(&url).json(body).send()?;
        let ack = Self::check(index, resp)?;
        tracing::debug!(event = "index_created", index, acknowledged = %ack["acknowledged"]);
        Ok(())
    }

    fn index_doc(&mut self, index: &str, id: &str, doc: &Value) -> Result<(), IndexError> {
        let url = format!("{}/{index}/_doc/{id}", self.base);
        let resp = self.client.put(url).json(doc).send()?;
        Self::check(index, resp).map(|_| ())
    }

    fn count(&mut self, index: &str) -> Result<usize, IndexError> {
        let url = format!("{}/{index}/_count", self.base);
        let resp = self.client.get(url).send()?;
        let body = Self::check(index, resp)?;
        Ok(body["count"].as_u64().unwrap_or(0) as usize)
    }
}

/// Offline backend that keeps everything in memory. Identifiers listed in
/// `reject` fail, as a mapping conflict would.
#[derive(Debug, Default)]
pub struct DryRunBackend {
    pub indices: BTreeMap<String, Value>,
    pub documents: BTreeMap<String, Vec<(String, Value)>>,
    pub reject: HashSet<String>,
}

impl DryRunBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchBackend for DryRunBackend {
    fn recreate_index(&mut self, index: &str, body: &Value) -> Result<(), IndexError> {
        self.indices.insert(index.to_string(), body.clone());
        self.documents.insert(index.to_string(), Vec::new());
        Ok(())
    }

    fn index_doc(&mut self, index: &str, id: &str, doc: &Value) -> Result<(), IndexError> {
        if self.reject.contains(id) {
            return Err(IndexError::Rejected {
                index: index.to_string(),
                id: id.to_string(),
            });
        }
        let docs = self.documents.entry(index.to_string()).or_default();
        docs.retain(|(existing, _)| existing != id);
        docs.push((id.to_string(), doc.clone()));
        Ok(())
    }

    fn count(&mut self, index: &str) -> Result<usize, IndexError> {
        Ok(self.documents.get(index).map_or(0, Vec::len))
    }
}
