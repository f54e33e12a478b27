mod asset;
mod link;
mod object;
mod project;

pub use asset::AssetCommands;
pub use link::LinkCommands;
pub use object::ObjectCommands;
pub use project::ProjectCommands;
