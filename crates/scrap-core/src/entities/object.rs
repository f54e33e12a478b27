use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An element placed in a project's scene.
///
/// `asset_id` is `None` for elements without a backing image (text, shapes) and
/// is cleared when the referenced asset is deleted. `position` and
/// `properties` are opaque to the store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SceneObject {
    pub id: i64,
    pub project_id: i64,
    pub asset_id: Option<i64>,
    pub position: serde_json::Value,
    /// Layer index, always >= 1.
    pub layers: i64,
    pub properties: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
