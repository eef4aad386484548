use crate::desired;
use crate::session::Session;
use catalyst_provider::{validate_project, validate_region};
use colored::Colorize;

/// Parse and check the manifest locally; no remote calls.
pub fn handle(session: &Session) -> anyhow::Result<()> {
    println!("{}", "Validating manifest...".blue());
    println!(
        "Manifest: {}",
        session.manifest_path.display().to_string().cyan()
    );

    let manifest = &session.manifest;
    let mut errors = Vec::new();

    for model in desired::regions(manifest) {
        if let Err(e) = validate_region(&model) {
            errors.push(format!("region {:?}: {}", model.name, e));
        }
    }
    for model in desired::projects(manifest) {
        if let Err(e) = validate_project(&model) {
            errors.push(format!("project {:?}: {}", model.name, e));
        }
        if let Some(region) = model.region.known()
            && manifest.region(region).is_none()
        {
            println!(
                "{} project {:?} uses region {:?}, which this manifest does not declare",
                "!".yellow(),
                model.name,
                region
            );
        }
    }

    if !errors.is_empty() {
        eprintln!();
        eprintln!("{}", "✗ Manifest is invalid".red().bold());
        for error in &errors {
            eprintln!("  {}", error);
        }
        anyhow::bail!("{} validation error(s)", errors.len());
    }

    println!("{}", "✓ Manifest is valid".green().bold());
    println!();
    println!("Summary:");
    println!("  Regions: {}", manifest.regions.len());
    for region in &manifest.regions {
        println!("    - {} ({})", region.name.cyan(), region.ingress);
    }
    println!("  Projects: {}", manifest.projects.len());
    for project in &manifest.projects {
        let region = project.region.as_deref().unwrap_or("(unset)");
        println!("    - {} (region: {})", project.name.cyan(), region);
    }
    if !manifest.data.is_empty() {
        println!("  Data sources: {}", manifest.data.len());
        for entry in &manifest.data {
            println!("    - {} {}", entry.kind(), entry.label().cyan());
        }
    }
    Ok(())
}
