//! Domain types for network sets.
//!
//! A [`SetDefinition`] is the local, transient view of one set read from disk.
//! A [`RemoteSet`] is the object owned by the policy store; its metadata may
//! carry server-assigned fields that this crate never interprets but must
//! hand back unchanged on update.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// API group/version of the remote resource.
pub const API_VERSION: &str = "projectcalico.org/v3";
/// Kind of the remote resource.
pub const KIND: &str = "GlobalNetworkSet";
/// Value used for every label this daemon sets.
pub const LABEL_VALUE: &str = "true";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of a network set; equal to the local identifier and the remote
/// resource name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetName(pub String);

impl SetName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SetName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SetName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Local definition
// ---------------------------------------------------------------------------

/// Parsed local definition for one set. Built fresh on every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDefinition {
    pub name: SetName,
    /// Address ranges, passed through unvalidated and in file order.
    pub networks: Vec<String>,
    /// Extra label key added next to the self-referential one.
    pub extra_label: Option<String>,
}

impl SetDefinition {
    /// Labels the remote object must carry: `{name: "true"}` plus
    /// `{extra_label: "true"}` when configured.
    pub fn labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(self.name.0.clone(), LABEL_VALUE.to_string());
        if let Some(extra) = self.extra_label.as_deref().filter(|l| !l.is_empty()) {
            labels.insert(extra.to_string(), LABEL_VALUE.to_string());
        }
        labels
    }

    /// Build the object to create when the set does not exist remotely.
    pub fn to_remote(&self) -> RemoteSet {
        RemoteSet {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ObjectMeta {
                name: self.name.clone(),
                labels: self.labels(),
                extra: Map::new(),
            },
            spec: SetSpec {
                nets: self.networks.clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Remote object
// ---------------------------------------------------------------------------

/// Object metadata. Anything besides `name` and `labels` (resourceVersion,
/// uid, creationTimestamp, ...) lands in `extra` and is written back as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: SetName,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ObjectMeta {
    pub fn resource_version(&self) -> Option<&str> {
        self.extra.get("resourceVersion").and_then(Value::as_str)
    }
}

/// Payload of a network set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetSpec {
    #[serde(default)]
    pub nets: Vec<String>,
}

/// A network set as stored in the policy store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSet {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: SetSpec,
}

impl RemoteSet {
    pub fn name(&self) -> &SetName {
        &self.metadata.name
    }

    /// Replace only the payload, keeping every metadata field as fetched.
    pub fn with_payload(mut self, definition: &SetDefinition) -> Self {
        self.spec.nets = definition.networks.clone();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(extra: Option<&str>) -> SetDefinition {
        SetDefinition {
            name: SetName::from("office"),
            networks: vec!["10.0.0.0/24".into(), "192.168.7.0/24".into()],
            extra_label: extra.map(str::to_string),
        }
    }

    #[test]
    fn labels_always_include_self_reference() {
        let labels = definition(None).labels();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("office").map(String::as_str), Some("true"));
    }

    #[test]
    fn labels_include_extra_label_when_configured() {
        let labels = definition(Some("managed")).labels();
        assert_eq!(labels.get("office").map(String::as_str), Some("true"));
        assert_eq!(labels.get("managed").map(String::as_str), Some("true"));
    }

    #[test]
    fn empty_extra_label_is_omitted() {
        assert_eq!(definition(Some("")).labels().len(), 1);
    }

    #[test]
    fn remote_set_serializes_as_calico_object() {
        let value = serde_json::to_value(definition(None).to_remote()).expect("serialize");
        assert_eq!(
            value,
            json!({
                "apiVersion": "projectcalico.org/v3",
                "kind": "GlobalNetworkSet",
                "metadata": { "name": "office", "labels": { "office": "true" } },
                "spec": { "nets": ["10.0.0.0/24", "192.168.7.0/24"] }
            })
        );
    }

    #[test]
    fn with_payload_keeps_server_metadata() {
        let fetched: RemoteSet = serde_json::from_value(json!({
            "apiVersion": "projectcalico.org/v3",
            "kind": "GlobalNetworkSet",
            "metadata": {
                "name": "office",
                "labels": { "office": "true", "team": "net" },
                "resourceVersion": "4711",
                "uid": "8d3c",
                "creationTimestamp": "2024-01-01T00:00:00Z"
            },
            "spec": { "nets": ["172.16.0.0/12"] }
        }))
        .expect("decode");

        let merged = fetched.clone().with_payload(&definition(None));

        assert_eq!(merged.metadata, fetched.metadata);
        assert_eq!(merged.metadata.resource_version(), Some("4711"));
        assert_eq!(merged.spec.nets, vec!["10.0.0.0/24", "192.168.7.0/24"]);
    }
}
