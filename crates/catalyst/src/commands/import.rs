use crate::session::Session;
use catalyst_provider::{Context, ReadOutcome, Resource};
use clap::ValueEnum;
use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportKind {
    Region,
    /// `<name>` or `<organization_id>/<name>`
    Project,
}

/// Adopt an existing remote object into state.
pub async fn handle(
    session: &Session,
    ctx: &Context,
    kind: ImportKind,
    id: &str,
) -> anyhow::Result<()> {
    session.print_header();
    let provider = session.provider()?;

    let lock = session.store.acquire_lock().await?;
    let mut state = session.store.load().await?;

    let key = match kind {
        ImportKind::Region => import_into(&provider.regions(), ctx, id, &mut state).await?,
        ImportKind::Project => import_into(&provider.projects(), ctx, id, &mut state).await?,
    };

    session.store.save(&state).await?;
    lock.release().await?;

    println!("{} Imported {}", "✓".green(), key.cyan());
    Ok(())
}

async fn import_into<R: Resource>(
    resource: &R,
    ctx: &Context,
    id: &str,
    state: &mut catalyst_provider::GlobalState,
) -> anyhow::Result<String> {
    let model = match resource.import(ctx, id).await? {
        ReadOutcome::Present(model) => model,
        ReadOutcome::Absent => {
            anyhow::bail!("cannot import {} {:?}: it does not exist", R::TYPE_NAME, id)
        }
    };

    let name = R::instance_name(&model);
    let key = format!("{}.{}", R::TYPE_NAME, name);
    if state.get::<R>(name)?.is_some() {
        anyhow::bail!("{} is already managed", key);
    }
    state.put::<R>(&model)?;
    Ok(key)
}
