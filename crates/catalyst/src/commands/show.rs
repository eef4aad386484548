use crate::session::Session;
use colored::Colorize;

/// Print recorded state without contacting the API.
pub async fn handle(session: &Session) -> anyhow::Result<()> {
    let state = session.store.load().await?;
    if state.is_empty() {
        println!("{}", "No resources in state.".yellow());
        return Ok(());
    }

    println!(
        "{} (updated {})",
        session.store.path().display().to_string().cyan(),
        state.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    for (key, entry) in &state.resources {
        println!("  {}", key.bold());
        super::print_attributes(&entry.attributes);
    }
    Ok(())
}
