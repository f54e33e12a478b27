//! Scene object update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ObjectUpdate {
    /// `Some(None)` detaches the object from its asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Option<serde_json::Value>>,
}

impl ObjectUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.asset_id.is_none()
            && self.position.is_none()
            && self.layers.is_none()
            && self.properties.is_none()
    }
}

#[derive(Debug, Default)]
pub struct ObjectUpdateBuilder(ObjectUpdate);

impl ObjectUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ObjectUpdate::default())
    }

    #[must_use]
    pub fn asset_id(mut self, asset_id: Option<i64>) -> Self {
        self.0.asset_id = Some(asset_id);
        self
    }

    #[must_use]
    pub fn position(mut self, position: serde_json::Value) -> Self {
        self.0.position = Some(position);
        self
    }

    #[must_use]
    pub fn layers(mut self, layers: i64) -> Self {
        self.0.layers = Some(layers);
        self
    }

    #[must_use]
    pub fn properties(mut self, properties: Option<serde_json::Value>) -> Self {
        self.0.properties = Some(properties);
        self
    }

    #[must_use]
    pub fn build(self) -> ObjectUpdate {
        self.0
    }
}
