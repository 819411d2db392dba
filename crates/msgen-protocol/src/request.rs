//! Requests accepted by the generation service.

use serde::{Deserialize, Serialize};

/// Body of the job creation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    /// Free-text description of the installation work.
    pub query: String,

    /// Project details attached to the request.
    #[serde(default)]
    pub project_details: ProjectDetails,

    /// Optional caller context passed through to the generation pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl CreateJobRequest {
    /// Create a request with the given work description and no extras.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            project_details: ProjectDetails::default(),
            context: None,
        }
    }
}

/// Project details attached to a generation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Kind of installation (domestic, commercial, industrial).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
}
