use lerni_core::enums::Relationship;
use lerni_core::responses::LinkResponse;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ConceptCommands;
use crate::context::AppContext;
use crate::output::output;
use crate::ui;

#[derive(Debug, Serialize)]
struct UnlinkResponse<'a> {
    removed: bool,
    from: &'a str,
    to: &'a str,
    relationship: Relationship,
}

#[derive(Debug, Serialize)]
struct DeleteResponse<'a> {
    deleted: bool,
    id: &'a str,
}

/// Handle `study concept`.
pub async fn handle(
    action: &ConceptCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ConceptCommands::New {
            name,
            description,
            aliases,
            parent,
        } => {
            let parent = match parent.as_deref() {
                Some(reference) => Some(ctx.service.find_concept(reference).await?),
                None => None,
            };
            let concept = ctx
                .write(|| {
                    ctx.service
                        .create_concept(name, description.as_deref(), aliases)
                })
                .await?;
            if let Some(parent) = parent {
                ctx.write(|| {
                    ctx.service
                        .add_edge(&concept.id, &parent.id, Relationship::Parent)
                })
                .await?;
                ui::note(&format!("{} placed under {}.", concept.name, parent.name));
            }
            output(&concept, flags.format)
        }
        ConceptCommands::List { roots, search } => {
            let concepts = match search.as_deref() {
                Some(query) => ctx.service.search_concepts(query).await?,
                None if *roots => ctx.service.list_root_concepts().await?,
                None => ctx.service.list_concepts().await?,
            };
            output(&concepts, flags.format)
        }
        ConceptCommands::Show { concept } => {
            let concept = ctx.service.find_concept(concept).await?;
            let detail = ctx.service.concept_detail(&concept.id).await?;
            output(&detail, flags.format)
        }
        ConceptCommands::Link { from, to, kind } => {
            let from = ctx.service.find_concept(from).await?;
            let to = ctx.service.find_concept(to).await?;
            let relationship = Relationship::from(*kind);
            let edge = ctx
                .write(|| ctx.service.add_edge(&from.id, &to.id, relationship))
                .await?;
            output(&LinkResponse { edge, from, to }, flags.format)
        }
        ConceptCommands::Unlink { from, to, kind } => {
            let from = ctx.service.find_concept(from).await?;
            let to = ctx.service.find_concept(to).await?;
            let relationship = Relationship::from(*kind);
            let removed = ctx
                .write(|| ctx.service.remove_edge(&from.id, &to.id, relationship))
                .await?;
            if !removed {
                ui::note(&format!(
                    "No {relationship} edge from {} to {}.",
                    from.name, to.name
                ));
            }
            output(
                &UnlinkResponse {
                    removed,
                    from: &from.id,
                    to: &to.id,
                    relationship,
                },
                flags.format,
            )
        }
        ConceptCommands::Delete { concept } => {
            let concept = ctx.service.find_concept(concept).await?;
            ctx.write(|| ctx.service.delete_concept(&concept.id)).await?;
            output(
                &DeleteResponse {
                    deleted: true,
                    id: &concept.id,
                },
                flags.format,
            )
        }
        ConceptCommands::Ancestors {
            concept,
            kind,
            descendants,
        } => {
            let concept = ctx.service.find_concept(concept).await?;
            let relationship = Relationship::from(*kind);
            let walked = if *descendants {
                ctx.service.descendants(&concept.id, relationship).await?
            } else {
                ctx.service.ancestors(&concept.id, relationship).await?
            };
            output(&walked, flags.format)
        }
    }
}
