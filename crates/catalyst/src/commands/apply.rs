use super::Steps;
use crate::desired;
use crate::engine;
use crate::session::Session;
use catalyst_provider::Context;
use colored::Colorize;

pub async fn handle(session: &Session, ctx: &Context, yes: bool) -> anyhow::Result<()> {
    session.print_header();
    let provider = session.provider()?;

    let lock = session.store.acquire_lock().await?;
    let mut state = session.store.load().await?;

    println!("{}", "Refreshing state...".blue());
    super::refresh_all(&provider, ctx, &mut state).await?;
    session.store.save(&state).await?;

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
    let plan = steps.to_plan();

    println!();
    super::print_plan(&plan);

    if plan.has_changes && !yes {
        println!();
        println!("Run again with {} to apply these changes", "--yes".cyan());
        lock.release().await?;
        return Ok(());
    }

    let result = super::execute_all(&provider, ctx, steps, &mut state, &session.store).await?;
    lock.release().await?;

    if plan.has_changes {
        super::print_result(&result);
    }
    if !result.is_success() {
        anyhow::bail!("apply failed");
    }

    super::read_data_sources(&provider, ctx, &session.manifest.data).await
}
