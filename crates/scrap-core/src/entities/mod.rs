//! Entity structs for all scrapbook domain objects.
//!
//! Each entity maps to a table in the libSQL metadata store. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and schema
//! validation of response envelopes.

mod asset;
mod object;
mod project;
mod shared_link;

pub use asset::Asset;
pub use object::SceneObject;
pub use project::{Project, ProjectDetail, SceneData};
pub use shared_link::SharedLink;
