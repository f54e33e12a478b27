//! Serde roundtrip and JsonSchema validation tests for entity and envelope types.

use chrono::{Duration, Utc};
use schemars::schema_for;
use scrap_core::entities::*;
use scrap_core::enums::*;
use scrap_core::responses::*;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn sample_project() -> Project {
    let now = Utc::now();
    Project {
        id: 1,
        title: "Sample Scrapbook 20x20".into(),
        frame_size: FrameSize::Size20x20,
        project_data: Some(SceneData::from(&serde_json::json!({
            "version": "1.0",
            "settings": {"backgroundColor": "#ffffff", "lighting": {"enabled": true}},
            "objects": []
        }))),
        state: ProjectState::Active,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

fn sample_asset() -> Asset {
    Asset {
        id: 3,
        project_id: 1,
        filename: "photo.png".into(),
        storage_key: "projects/1/assets/0123456789abcdef0123456789abcdef.png".into(),
        url: "/api/assets/projects/1/assets/0123456789abcdef0123456789abcdef.png".into(),
        content_type: "image/png".into(),
        size_bytes: 5 * 1024 * 1024,
        uploaded_at: Utc::now(),
    }
}

fn sample_object() -> SceneObject {
    SceneObject {
        id: 7,
        project_id: 1,
        asset_id: Some(3),
        position: serde_json::json!({"x": 1.5, "y": 0.0, "z": -2.0}),
        layers: 2,
        properties: Some(serde_json::json!({"rotation": 90})),
        created_at: Utc::now(),
    }
}

fn sample_link() -> SharedLink {
    SharedLink {
        id: 5,
        project_id: 1,
        token: "fedcba9876543210fedcba9876543210".into(),
        expires_at: Some(Utc::now() + Duration::hours(1)),
        created_at: Utc::now(),
    }
}

roundtrip_and_validate!(project_roundtrip, Project, sample_project());

roundtrip_and_validate!(
    deleted_project_roundtrip,
    Project,
    Project {
        project_data: None,
        state: ProjectState::Deleted,
        deleted_at: Some(Utc::now()),
        ..sample_project()
    }
);

roundtrip_and_validate!(asset_roundtrip, Asset, sample_asset());

roundtrip_and_validate!(object_roundtrip, SceneObject, sample_object());

roundtrip_and_validate!(
    textless_object_roundtrip,
    SceneObject,
    SceneObject {
        asset_id: None,
        properties: None,
        layers: 1,
        ..sample_object()
    }
);

roundtrip_and_validate!(shared_link_roundtrip, SharedLink, sample_link());

roundtrip_and_validate!(
    project_detail_roundtrip,
    ProjectDetail,
    ProjectDetail {
        project: sample_project(),
        assets: vec![sample_asset()],
        objects: vec![sample_object()],
    }
);

roundtrip_and_validate!(
    shared_project_roundtrip,
    SharedProject,
    SharedProject {
        project: ProjectDetail {
            project: sample_project(),
            assets: vec![sample_asset()],
            objects: vec![],
        },
        shared_link: SharedLink {
            expires_at: None,
            ..sample_link()
        },
        is_shared: true,
    }
);

roundtrip_and_validate!(
    health_report_roundtrip,
    HealthReport,
    HealthReport {
        status: OverallStatus::Degraded,
        database: ComponentStatus::Ok,
        database_error: None,
        storage: ComponentStatus::Unavailable,
        storage_error: Some("object storage is not configured".into()),
    }
);

roundtrip_and_validate!(
    asset_envelope_roundtrip,
    ApiResponse<Asset>,
    ApiResponse::ok("Asset uploaded successfully", sample_asset())
);

roundtrip_and_validate!(
    failure_envelope_roundtrip,
    ApiResponse<Asset>,
    ApiResponse::failure(
        ErrorKind::ValidationError,
        "Invalid file type",
        "Only PNG files are allowed"
    )
);

#[test]
fn project_detail_flattens_project_fields() {
    let detail = ProjectDetail {
        project: sample_project(),
        assets: vec![],
        objects: vec![],
    };
    let json = serde_json::to_value(&detail).unwrap();
    assert_eq!(json["title"], "Sample Scrapbook 20x20");
    assert_eq!(json["frame_size"], "20x20");
    assert_eq!(json["project_data"]["version"], "1.0");
    assert!(json["assets"].as_array().unwrap().is_empty());
}
