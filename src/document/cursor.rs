use serde::{Deserialize, Serialize};

/// Pointer position of another user editing the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCursor {
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub color: String,
}
