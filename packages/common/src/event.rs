use serde::{Deserialize, Deserializer, Serialize};

/// Prefix of fully-qualified branch refs.
const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// The subset of a GitHub `push` delivery the forge acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    /// Fully-qualified ref that was pushed, e.g. `refs/heads/main`.
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub repository: Repository,
    pub pusher: PusherIdentity,
}

/// Repository metadata carried by a push delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    pub html_url: String,
    pub default_branch: String,
    /// Timestamps are mirrored verbatim. GitHub sends some as epoch seconds
    /// and some as ISO-8601 strings, so both are kept as text.
    #[serde(default, deserialize_with = "opaque_timestamp")]
    pub pushed_at: Option<String>,
    #[serde(default, deserialize_with = "opaque_timestamp")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "opaque_timestamp")]
    pub created_at: Option<String>,
}

/// Identity of whoever pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PusherIdentity {
    pub name: String,
    pub email: String,
}

/// Outcome of checking a push against its repository's default branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushTarget {
    DefaultBranch,
    OtherRef,
}

impl PushEvent {
    /// The branch name the push targets, or `None` when the ref is not a
    /// branch (tags, notes, ...).
    pub fn branch(&self) -> Option<&str> {
        branch_name(&self.git_ref)
    }

    /// Classify this push. Only pushes to the default branch build artifacts.
    pub fn target(&self) -> PushTarget {
        match self.branch() {
            Some(branch) if branch == self.repository.default_branch => PushTarget::DefaultBranch,
            _ => PushTarget::OtherRef,
        }
    }

    pub fn targets_default_branch(&self) -> bool {
        self.target() == PushTarget::DefaultBranch
    }
}

/// Extract the branch name from a fully-qualified ref.
pub fn branch_name(git_ref: &str) -> Option<&str> {
    git_ref
        .strip_prefix(BRANCH_REF_PREFIX)
        .filter(|name| !name.is_empty())
}

fn opaque_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
