//! # Identity Mapping Types
//!
//! Desired mappings (role or user) as supplied by callers, and the record
//! shape kept by the mapping store.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace every created record lands in
pub const SYSTEM_NAMESPACE: &str = "kube-system";

/// Prefix the store extends into a unique record name
pub const GENERATE_NAME_PREFIX: &str = "iamauth-";

const MAX_USERNAME_LEN: usize = 253;

/// Which kind of principal a mapping grants access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Role,
    User,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::Role => "role",
            PrincipalKind::User => "user",
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One problem with a desired mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("{0} ARN is required")]
    PrincipalRequired(PrincipalKind),

    #[error("{0} ARN must not contain whitespace")]
    PrincipalMalformed(PrincipalKind),

    #[error("username is required")]
    UsernameRequired,

    #[error("username {0:?} is not a valid cluster username")]
    UsernameMalformed(String),

    #[error("group {index} is not a valid group name: {name:?}")]
    GroupMalformed { index: usize, name: String },
}

/// A mapping the caller wants to exist.
pub trait DesiredMapping {
    const KIND: PrincipalKind;

    fn principal_arn(&self) -> &str;

    fn username(&self) -> &str;

    fn groups(&self) -> &[String];

    /// Every problem found, or `Ok` if the mapping may be sent to the store.
    fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        let arn = self.principal_arn();
        if arn.trim().is_empty() {
            issues.push(ValidationIssue::PrincipalRequired(Self::KIND));
        } else if arn.chars().any(char::is_whitespace) {
            issues.push(ValidationIssue::PrincipalMalformed(Self::KIND));
        }

        let username = self.username();
        if username.trim().is_empty() {
            issues.push(ValidationIssue::UsernameRequired);
        } else if !is_valid_username(username) {
            issues.push(ValidationIssue::UsernameMalformed(username.to_string()));
        }

        for (index, group) in self.groups().iter().enumerate() {
            if group.trim().is_empty() || group.chars().any(char::is_whitespace) {
                issues.push(ValidationIssue::GroupMalformed {
                    index,
                    name: group.clone(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// The store record that would satisfy this mapping.
    fn to_spec(&self) -> MappingSpec {
        MappingSpec {
            arn: self.principal_arn().to_string(),
            username: self.username().to_string(),
            groups: self.groups().to_vec(),
        }
    }
}

/// Usernames may embed `{{SessionName}}`-style placeholders.
fn is_valid_username(username: &str) -> bool {
    static USERNAME: OnceLock<Regex> = OnceLock::new();
    let re = USERNAME.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._@:+=,/{}\-]+$").expect("username pattern is valid")
    });
    username.len() <= MAX_USERNAME_LEN && re.is_match(username)
}

/// Grant an IAM role a cluster username and groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMapping {
    pub role_arn: String,
    pub username: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl RoleMapping {
    pub fn new<I, G>(role_arn: impl Into<String>, username: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<String>,
    {
        Self {
            role_arn: role_arn.into(),
            username: username.into(),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }
}

impl DesiredMapping for RoleMapping {
    const KIND: PrincipalKind = PrincipalKind::Role;

    fn principal_arn(&self) -> &str {
        &self.role_arn
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn groups(&self) -> &[String] {
        &self.groups
    }
}

/// Grant an IAM user a cluster username and groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMapping {
    pub user_arn: String,
    pub username: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl UserMapping {
    pub fn new<I, G>(user_arn: impl Into<String>, username: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<String>,
    {
        Self {
            user_arn: user_arn.into(),
            username: username.into(),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }
}

impl DesiredMapping for UserMapping {
    const KIND: PrincipalKind = PrincipalKind::User;

    fn principal_arn(&self) -> &str {
        &self.user_arn
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn groups(&self) -> &[String] {
        &self.groups
    }
}

/// Record identity, assigned partly by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Empty until the store assigns one
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,

    pub namespace: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// What the record grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSpec {
    pub arn: String,
    pub username: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// A mapping record as kept by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMappingRecord {
    pub metadata: RecordMeta,
    pub spec: MappingSpec,
}

impl IdentityMappingRecord {
    /// A new record in the system namespace whose name the store generates.
    pub fn generated(spec: MappingSpec) -> Self {
        Self {
            metadata: RecordMeta {
                name: String::new(),
                generate_name: Some(GENERATE_NAME_PREFIX.to_string()),
                namespace: SYSTEM_NAMESPACE.to_string(),
                created_at: None,
            },
            spec,
        }
    }

    /// A record with a fixed name, as found in an existing store.
    pub fn named(name: impl Into<String>, spec: MappingSpec) -> Self {
        Self {
            metadata: RecordMeta {
                name: name.into(),
                generate_name: None,
                namespace: SYSTEM_NAMESPACE.to_string(),
                created_at: None,
            },
            spec,
        }
    }
}
