use super::{Projects, Regions, Steps};
use crate::engine;
use crate::session::Session;
use catalyst_provider::Context;
use colored::Colorize;

/// Delete every instance recorded in state.
pub async fn handle(session: &Session, ctx: &Context, yes: bool) -> anyhow::Result<()> {
    session.print_header();
    let provider = session.provider()?;

    let lock = session.store.acquire_lock().await?;
    let mut state = session.store.load().await?;
    super::refresh_all(&provider, ctx, &mut state).await?;
    session.store.save(&state).await?;

    let steps = Steps {
        regions: engine::plan_destroy::<Regions>(&state)?,
        projects: engine::plan_destroy::<Projects>(&state)?,
    };
    let plan = steps.to_plan();

    if !plan.has_changes {
        println!("{}", "Nothing to destroy.".green());
        lock.release().await?;
        return Ok(());
    }

    super::print_plan(&plan);
    if !yes {
        println!();
        println!(
            "{}",
            "Warning: these resources will be deleted permanently.".yellow()
        );
        println!("Run again with {} to destroy them", "--yes".cyan());
        lock.release().await?;
        return Ok(());
    }

    let result = super::execute_all(&provider, ctx, steps, &mut state, &session.store).await?;
    lock.release().await?;

    super::print_result(&result);
    if !result.is_success() {
        anyhow::bail!("destroy failed");
    }
    Ok(())
}
