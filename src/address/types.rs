//! # Address Types

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix of the tag key that scopes a resource to a cluster.
pub const CLUSTER_TAG_PREFIX: &str = "kubernetes.io/cluster/";

/// Tag key marking membership in `cluster`.
pub fn cluster_tag_key(cluster: &str) -> String {
    format!("{}{}", CLUSTER_TAG_PREFIX, cluster)
}

/// Whether the cluster owns a resource or merely references it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceLifecycle {
    /// Created by and deleted with the cluster
    Owned,
    /// Shared with other clusters or created out-of-band
    Shared,
}

impl ResourceLifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceLifecycle::Owned => "owned",
            ResourceLifecycle::Shared => "shared",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "owned" => Some(ResourceLifecycle::Owned),
            "shared" => Some(ResourceLifecycle::Shared),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Address scope requested at allocation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressDomain {
    Vpc,
    Standard,
}

impl AddressDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressDomain::Vpc => "vpc",
            AddressDomain::Standard => "standard",
        }
    }
}

/// Result of a successful allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub allocation_id: String,
    pub public_ip: String,
}

/// An allocated address as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedAddress {
    /// Provider-assigned, immutable
    pub allocation_id: String,

    pub public_ip: String,

    /// Set while the address is bound to a consumer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association_id: Option<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ManagedAddress {
    pub fn new(allocation_id: impl Into<String>, public_ip: impl Into<String>) -> Self {
        Self {
            allocation_id: allocation_id.into(),
            public_ip: public_ip.into(),
            association_id: None,
            tags: BTreeMap::new(),
        }
    }

    /// Apply the ownership tag for `cluster`.
    pub fn with_owner(mut self, cluster: &str, lifecycle: ResourceLifecycle) -> Self {
        self.tags
            .insert(cluster_tag_key(cluster), lifecycle.as_str().to_string());
        self
    }

    pub fn with_association(mut self, association_id: impl Into<String>) -> Self {
        self.association_id = Some(association_id.into());
        self
    }

    /// The association id, treating an empty one as absent.
    pub fn active_association(&self) -> Option<&str> {
        self.association_id
            .as_deref()
            .filter(|association| !association.is_empty())
    }

    pub fn is_associated(&self) -> bool {
        self.active_association().is_some()
    }

    /// How `cluster` relates to this address, if it is tagged for it at all.
    pub fn lifecycle_for(&self, cluster: &str) -> Option<ResourceLifecycle> {
        self.tags
            .get(&cluster_tag_key(cluster))
            .and_then(|value| ResourceLifecycle::parse(value))
    }

    pub fn belongs_to(&self, cluster: &str) -> bool {
        self.tags.contains_key(&cluster_tag_key(cluster))
    }
}
