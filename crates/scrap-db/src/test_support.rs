//! Shared test utilities for scrap-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use scrap_core::entities::Project;
    use scrap_core::enums::FrameSize;

    use crate::repos::asset::NewAsset;
    use crate::repos::object::NewObject;
    use crate::store::MetadataStore;

    /// Create an in-memory store with the schema applied.
    pub async fn test_store() -> MetadataStore {
        MetadataStore::open_local(":memory:").await.unwrap()
    }

    /// Create an active 20x20 project.
    pub async fn seed_project(store: &MetadataStore, title: &str) -> Project {
        store
            .create_project(title, FrameSize::Size20x20, None)
            .await
            .unwrap()
    }

    pub fn new_asset(project_id: i64, storage_key: &str) -> NewAsset<'_> {
        NewAsset {
            project_id,
            filename: "photo.png",
            storage_key,
            content_type: "image/png",
            size_bytes: 1024,
        }
    }

    pub fn new_object(project_id: i64, asset_id: Option<i64>) -> NewObject {
        NewObject {
            project_id,
            asset_id,
            position: serde_json::json!({"x": 0, "y": 0, "z": 0}),
            layers: 1,
            properties: None,
        }
    }
}
