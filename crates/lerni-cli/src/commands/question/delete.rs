use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;
use crate::ui;

#[derive(Debug, Serialize)]
struct DeleteResponse<'a> {
    deleted: bool,
    id: &'a str,
}

/// Handle `study delete`. Asks first unless `--yes` is given.
pub async fn run(id: &str, yes: bool, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let question = ctx.service.get_question(id).await?;
    if !yes && !ui::confirm(&format!("Delete '{}' with all answers and reviews?", question.prompt))? {
        ui::note("Cancelled.");
        return output(&DeleteResponse { deleted: false, id }, flags.format);
    }

    ctx.write(|| ctx.service.delete_question(id)).await?;
    output(&DeleteResponse { deleted: true, id }, flags.format)
}
