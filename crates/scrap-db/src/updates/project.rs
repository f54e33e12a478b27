//! Project update builder.

use scrap_core::entities::SceneData;
use scrap_core::enums::FrameSize;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_size: Option<FrameSize>,
    /// `Some(None)` clears the scene data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_data: Option<Option<SceneData>>,
}

impl ProjectUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.frame_size.is_none() && self.project_data.is_none()
    }
}

#[derive(Debug, Default)]
pub struct ProjectUpdateBuilder(ProjectUpdate);

impl ProjectUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ProjectUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn frame_size(mut self, frame_size: FrameSize) -> Self {
        self.0.frame_size = Some(frame_size);
        self
    }

    #[must_use]
    pub fn project_data(mut self, data: Option<SceneData>) -> Self {
        self.0.project_data = Some(data);
        self
    }

    #[must_use]
    pub fn build(self) -> ProjectUpdate {
        self.0
    }
}
