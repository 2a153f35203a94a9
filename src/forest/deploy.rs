use super::WorkflowTreeNode;
use serde::{Deserialize, Serialize};

/// Descriptive fields sent alongside a forest. All optional; the backend fills in the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    /// Tab path the forest was compiled from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// One entry of the batch posted to the execution backend on deploy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub forest: Vec<WorkflowTreeNode>,
    #[serde(default)]
    pub metadata: DeploymentMetadata,
}

impl DeploymentRequest {
    pub fn new(forest: Vec<WorkflowTreeNode>, metadata: DeploymentMetadata) -> Self {
        Self { forest, metadata }
    }

    /// The request body: the backend accepts a batch, so a single request is wrapped in an array.
    pub fn to_batch_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(std::slice::from_ref(self))
    }
}
