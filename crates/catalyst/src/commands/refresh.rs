use crate::session::Session;
use catalyst_provider::Context;
use colored::Colorize;

/// Re-read every managed instance and write the result to state.
pub async fn handle(session: &Session, ctx: &Context) -> anyhow::Result<()> {
    session.print_header();
    let provider = session.provider()?;

    let lock = session.store.acquire_lock().await?;
    let mut state = session.store.load().await?;
    let before = state.resources.len();

    super::refresh_all(&provider, ctx, &mut state).await?;
    session.store.save(&state).await?;
    lock.release().await?;

    println!(
        "{} Refreshed {} resource(s), {} removed",
        "✓".green(),
        state.resources.len(),
        before - state.resources.len()
    );
    Ok(())
}
