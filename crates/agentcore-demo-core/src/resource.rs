//! Handles to vendor-managed resources.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a handle points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Memory,
    Runtime,
    CodeSandbox,
    BrowserSandbox,
}

/// Vendor-reported status.
///
/// Always advisory: a status is replaced by a fresh vendor response, never
/// advanced locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceStatus {
    Creating,
    Active,
    CreateFailed,
    Updating,
    UpdateFailed,
    Deleting,
    Failed,
    Unknown(String),
}

impl ResourceStatus {
    /// Parse a vendor status string. `READY` and `ACTIVE` are the same state.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "CREATING" => Self::Creating,
            "ACTIVE" | "READY" => Self::Active,
            "CREATE_FAILED" => Self::CreateFailed,
            "UPDATING" => Self::Updating,
            "UPDATE_FAILED" => Self::UpdateFailed,
            "DELETING" => Self::Deleting,
            "FAILED" => Self::Failed,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// Wire form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "CREATING",
            Self::Active => "ACTIVE",
            Self::CreateFailed => "CREATE_FAILED",
            Self::Updating => "UPDATING",
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::Deleting => "DELETING",
            Self::Failed => "FAILED",
            Self::Unknown(raw) => raw,
        }
    }

    /// Ready for use.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Terminal failure; polling further will not help.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::CreateFailed | Self::UpdateFailed | Self::Failed)
    }

    /// Label in the lifecycle shown by the UI.
    ///
    /// `None` means no handle is bound: `UNCREATED`.
    #[must_use]
    pub fn lifecycle_label(status: Option<&Self>) -> &str {
        status.map_or("UNCREATED", Self::as_str)
    }
}

impl From<String> for ResourceStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ResourceStatus> for String {
    fn from(status: ResourceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local reference to an object that only exists vendor-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    pub status: ResourceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ResourceHandle {
    /// Replace the status with a freshly observed one.
    #[must_use]
    pub fn observed(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(ResourceStatus::parse("READY"), ResourceStatus::Active);
        assert_eq!(ResourceStatus::parse("active"), ResourceStatus::Active);
        assert_eq!(ResourceStatus::parse("CREATE_FAILED"), ResourceStatus::CreateFailed);
        assert_eq!(
            ResourceStatus::parse("HIBERNATING"),
            ResourceStatus::Unknown("HIBERNATING".into())
        );
        assert!(ResourceStatus::parse("UPDATE_FAILED").is_failed());
    }

    #[test]
    fn test_lifecycle_label() {
        assert_eq!(ResourceStatus::lifecycle_label(None), "UNCREATED");
        assert_eq!(
            ResourceStatus::lifecycle_label(Some(&ResourceStatus::Deleting)),
            "DELETING"
        );
    }

    #[test]
    fn test_handle_serde() {
        let handle = ResourceHandle {
            kind: ResourceKind::Runtime,
            id: "rt-1".into(),
            arn: Some("arn:aws:bedrock-agentcore:us-west-2:1:runtime/rt-1".into()),
            status: ResourceStatus::Creating,
            created_at: None,
        };
        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!(json["status"], "CREATING");
        assert_eq!(json["kind"], "runtime");

        let back: ResourceHandle = serde_json::from_value(json).unwrap();
        assert_eq!(back.observed(ResourceStatus::Active).status, ResourceStatus::Active);
    }
}
