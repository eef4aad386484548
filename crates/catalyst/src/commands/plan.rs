use super::Steps;
use crate::desired;
use crate::engine;
use crate::session::Session;
use catalyst_provider::Context;
use colored::Colorize;

/// Refresh in memory and print what `apply` would do. State is not written.
pub async fn handle(session: &Session, ctx: &Context) -> anyhow::Result<()> {
    session.print_header();
    let provider = session.provider()?;

    let mut state = session.store.load().await?;
    println!("{}", "Refreshing state...".blue());
    super::refresh_all(&provider, ctx, &mut state).await?;

    let steps = Steps {
        regions: engine::plan(
            &provider.regions(),
            &state,
            &desired::regions(&session.manifest),
        )?,
        projects: engine::plan(
            &provider.projects(),
            &state,
            &desired::projects(&session.manifest),
        )?,
    };

    println!();
    super::print_plan(&steps.to_plan());
    Ok(())
}
