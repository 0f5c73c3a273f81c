//! Blocking HTTP client for `projectcalico.org/v3` GlobalNetworkSets.
//!
//! ```text
//! GET  {api}/apis/projectcalico.org/v3/globalnetworksets/{name}   404 -> None
//! POST {api}/apis/projectcalico.org/v3/globalnetworksets          create
//! PUT  {api}/apis/projectcalico.org/v3/globalnetworksets/{name}   update
//! ```
//!
//! The set name is percent-encoded as a single path segment, so `#`, `?`,
//! `/` and spaces stay part of the name.
//!
//! A client is meant to live for one pass; build a new one with
//! [`CalicoRepository::connect`] each time so token rotation is picked up.
//! No request deadline is applied.

use std::path::Path;

use url::Url;

use gnsupd_core::config::StoreConfig;
use gnsupd_core::types::{RemoteSet, SetName};

use crate::error::StoreError;
use crate::repository::SetRepository;

const COLLECTION_PATH: &str = "/apis/projectcalico.org/v3/globalnetworksets";

pub struct CalicoRepository {
    agent: ureq::Agent,
    collection: Url,
    token: Option<String>,
}

impl CalicoRepository {
    /// Build a client for `config`, reading the bearer token if one is set.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let token = match &config.token_file {
            Some(path) => Some(read_token(path)?),
            None => None,
        };
        let raw = format!("{}{COLLECTION_PATH}", config.api_url.trim_end_matches('/'));
        let collection = Url::parse(&raw).map_err(|source| StoreError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        Ok(Self {
            agent: ureq::AgentBuilder::new().build(),
            collection,
            token,
        })
    }

    fn item_url(&self, name: &SetName) -> Result<Url, StoreError> {
        let mut item = self.collection.clone();
        item.path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl {
                url: self.collection.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .push(name.as_str());
        Ok(item)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let request = self
            .agent
            .request(method, url)
            .set("Accept", "application/json");
        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn send(&self, method: &str, url: &str, body: &RemoteSet) -> Result<RemoteSet, StoreError> {
        let response = self
            .request(method, url)
            .send_json(body)
            .map_err(|err| map_ureq_error(url, err))?;
        decode(url, response)
    }
}

impl SetRepository for CalicoRepository {
    fn get(&self, name: &SetName) -> Result<Option<RemoteSet>, StoreError> {
        let url = self.item_url(name)?;
        let url = url.as_str();
        match self.request("GET", url).call() {
            Ok(response) => decode(url, response).map(Some),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(err) => Err(map_ureq_error(url, err)),
        }
    }

    fn create(&self, set: &RemoteSet) -> Result<RemoteSet, StoreError> {
        self.send("POST", self.collection.as_str(), set)
    }

    fn update(&self, set: &RemoteSet) -> Result<RemoteSet, StoreError> {
        self.send("PUT", self.item_url(set.name())?.as_str(), set)
    }
}

fn read_token(path: &Path) -> Result<String, StoreError> {
    std::fs::read_to_string(path)
        .map(|token| token.trim().to_string())
        .map_err(|source| StoreError::Token {
            path: path.to_path_buf(),
            source,
        })
}

fn decode(url: &str, response: ureq::Response) -> Result<RemoteSet, StoreError> {
    response
        .into_json::<RemoteSet>()
        .map_err(|source| StoreError::Decode {
            url: url.to_string(),
            source,
        })
}

fn map_ureq_error(url: &str, err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(code, response) => StoreError::Status {
            code,
            url: url.to_string(),
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => StoreError::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}
