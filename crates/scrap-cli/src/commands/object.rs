use scrap_db::updates::object::ObjectUpdateBuilder;
use scrap_lifecycle::ObjectDraft;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ObjectCommands;
use crate::commands::parse_json_arg;
use crate::context::AppContext;
use crate::output::{output, success};

/// Handle `scrap object`.
pub async fn handle(
    action: &ObjectCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let projects = ctx.scrapbook.projects();
    match action {
        ObjectCommands::Add {
            project_id,
            position,
            asset,
            layers,
            properties,
        } => {
            let draft = ObjectDraft {
                asset_id: *asset,
                layers: *layers,
                properties: properties
                    .as_deref()
                    .map(|raw| parse_json_arg("properties", raw))
                    .transpose()?,
                ..ObjectDraft::at(parse_json_arg("position", position)?)
            };
            let object = projects.add_object(*project_id, draft).await?;
            success("Object added successfully", object, flags.format)
        }
        ObjectCommands::Update {
            id,
            position,
            asset,
            clear_asset,
            layers,
            properties,
            clear_properties,
        } => {
            let mut update = ObjectUpdateBuilder::new();
            if let Some(raw) = position {
                update = update.position(parse_json_arg("position", raw)?);
            }
            if *clear_asset {
                update = update.asset_id(None);
            } else if let Some(asset) = asset {
                update = update.asset_id(Some(*asset));
            }
            if let Some(layers) = layers {
                update = update.layers(*layers);
            }
            if *clear_properties {
                update = update.properties(None);
            } else if let Some(raw) = properties {
                update = update.properties(Some(parse_json_arg("properties", raw)?));
            }
            let object = projects.update_object(*id, update.build()).await?;
            success("Object updated successfully", object, flags.format)
        }
        ObjectCommands::Remove { id } => {
            let object = projects.remove_object(*id).await?;
            success("Object removed successfully", object, flags.format)
        }
        ObjectCommands::List { project_id } => {
            let objects = projects.list_objects(*project_id).await?;
            output(
                &scrap_core::responses::ApiResponse::ok("Objects fetched successfully", objects),
                flags.format,
            )
        }
    }
}
