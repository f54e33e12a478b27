use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::entities::{Asset, SceneObject};
use crate::enums::{FrameSize, ProjectState};

/// Opaque scene-graph payload, stored byte-for-byte.
///
/// The store never inspects these bytes. When they hold JSON (the normal case)
/// they serialize as the embedded JSON text, unchanged; anything else
/// serializes as a lossy UTF-8 string. Deserializing from JSON keeps the
/// incoming text exactly, including key order and number spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneData(Vec<u8>);

impl SceneData {
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Check that `raw` is a JSON document and keep its text as given.
    ///
    /// # Errors
    ///
    /// Returns the parse error when `raw` is not valid JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<&RawValue>(raw)?;
        Ok(Self(raw.as_bytes().to_vec()))
    }
}

impl From<Vec<u8>> for SceneData {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Canonical compact encoding of `value`. Use [`SceneData::from_json_str`] to
/// keep caller-supplied text as written.
impl From<&serde_json::Value> for SceneData {
    fn from(value: &serde_json::Value) -> Self {
        Self(value.to_string().into_bytes())
    }
}

impl Serialize for SceneData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match serde_json::from_slice::<&RawValue>(&self.0) {
            Ok(raw) => raw.serialize(serializer),
            Err(_) => serializer.serialize_str(&String::from_utf8_lossy(&self.0)),
        }
    }
}

impl<'de> Deserialize<'de> for SceneData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(Self(raw.get().as_bytes().to_vec()))
    }
}

/// A scrapbook project: the root of the ownership aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub frame_size: FrameSize,
    #[schemars(with = "Option<serde_json::Value>")]
    pub project_data: Option<SceneData>,
    pub state: ProjectState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A project with its assets and scene objects eagerly loaded.
///
/// Serializes with the project's fields inlined. Deserialization goes through
/// [`ProjectDetailFields`] because flattened fields cannot carry raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(from = "ProjectDetailFields")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub assets: Vec<Asset>,
    pub objects: Vec<SceneObject>,
}

#[derive(Deserialize, JsonSchema)]
struct ProjectDetailFields {
    id: i64,
    title: String,
    frame_size: FrameSize,
    #[schemars(with = "Option<serde_json::Value>")]
    project_data: Option<SceneData>,
    state: ProjectState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    deleted_at: Option<DateTime<Utc>>,
    assets: Vec<Asset>,
    objects: Vec<SceneObject>,
}

impl From<ProjectDetailFields> for ProjectDetail {
    fn from(fields: ProjectDetailFields) -> Self {
        Self {
            project: Project {
                id: fields.id,
                title: fields.title,
                frame_size: fields.frame_size,
                project_data: fields.project_data,
                state: fields.state,
                created_at: fields.created_at,
                updated_at: fields.updated_at,
                deleted_at: fields.deleted_at,
            },
            assets: fields.assets,
            objects: fields.objects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_data_serializes_embedded_json() {
        let data = SceneData::new(br#"{"version":"1.0","objects":[]}"#.to_vec());
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["version"], "1.0");
        assert!(value["objects"].as_array().unwrap().is_empty());
    }

    #[test]
    fn scene_data_keeps_non_json_bytes() {
        let data = SceneData::new(b"not json".to_vec());
        assert_eq!(serde_json::to_value(&data).unwrap(), "not json");
        assert_eq!(data.as_bytes(), b"not json");
    }

    #[test]
    fn scene_data_roundtrips_through_json() {
        let original = serde_json::json!({"settings": {"backgroundColor": "#ffffff"}});
        let data = SceneData::from(&original);
        let json = serde_json::to_string(&data).unwrap();
        let back: SceneData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    const HAND_WRITTEN: &str = r##"{"zIndex": 2, "background": "#fff", "aLayer": [1.10, 2]}"##;

    #[test]
    fn scene_data_keeps_caller_text_exactly() {
        let data = SceneData::from_json_str(HAND_WRITTEN).unwrap();
        assert_eq!(data.as_bytes(), HAND_WRITTEN.as_bytes());
        assert!(SceneData::from_json_str("{zIndex: 2}").is_err());
    }

    #[test]
    fn scene_data_passes_through_serde_unchanged() {
        let wrapped = format!(r#"{{"data":{HAND_WRITTEN}}}"#);
        let parsed: std::collections::HashMap<String, SceneData> =
            serde_json::from_str(&wrapped).unwrap();
        assert_eq!(parsed["data"].as_bytes(), HAND_WRITTEN.as_bytes());
        assert_eq!(serde_json::to_string(&parsed["data"]).unwrap(), HAND_WRITTEN);
    }

    #[test]
    fn project_detail_deserializes_scene_data_verbatim() {
        let json = format!(
            r#"{{"id":1,"title":"t","frame_size":"20x20","project_data":{HAND_WRITTEN},
                "state":"active","created_at":"2026-01-01T00:00:00Z",
                "updated_at":"2026-01-01T00:00:00Z","assets":[],"objects":[]}}"#
        );
        let detail: ProjectDetail = serde_json::from_str(&json).unwrap();
        let data = detail.project.project_data.unwrap();
        assert_eq!(data.as_bytes(), HAND_WRITTEN.as_bytes());
    }
}
