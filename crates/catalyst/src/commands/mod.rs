pub mod apply;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod refresh;
pub mod show;
pub mod validate;

use crate::desired;
use crate::engine::{self, Step};
use catalyst_client::CatalystClient;
use catalyst_core::DataConfig;
use catalyst_provider::{
    ActionType, ApplyResult, CatalystProvider, Context, DataSource, GlobalState, Plan,
    ProjectModel, ProjectQuery, ProjectResource, RegionModel, RegionQuery, RegionResource,
    StateManager,
};
use colored::Colorize;
use serde_json::Value;
use std::time::Instant;

pub type Regions = RegionResource<dyn CatalystClient>;
pub type Projects = ProjectResource<dyn CatalystClient>;

/// Planned steps for both resource kinds
pub struct Steps {
    pub regions: Vec<Step<RegionModel>>,
    pub projects: Vec<Step<ProjectModel>>,
}

impl Steps {
    pub fn to_plan(&self) -> Plan {
        let actions = self
            .regions
            .iter()
            .map(engine::describe::<Regions>)
            .chain(self.projects.iter().map(engine::describe::<Projects>))
            .collect();
        Plan::new(actions)
    }
}

/// Refresh state from the API, reporting instances that disappeared.
pub async fn refresh_all(
    provider: &CatalystProvider,
    ctx: &Context,
    state: &mut GlobalState,
) -> anyhow::Result<()> {
    let gone_projects = engine::refresh(&provider.projects(), ctx, state).await?;
    let gone_regions = engine::refresh(&provider.regions(), ctx, state).await?;

    for (kind, name) in gone_projects
        .iter()
        .map(|n| ("catalyst_project", n))
        .chain(gone_regions.iter().map(|n| ("catalyst_region", n)))
    {
        println!(
            "{} {}.{} no longer exists; removed from state",
            "!".yellow(),
            kind,
            name
        );
    }
    Ok(())
}

/// Execute steps: creates and updates for regions then projects, deletes
/// for projects then regions. Stops at the first failure.
pub async fn execute_all(
    provider: &CatalystProvider,
    ctx: &Context,
    steps: Steps,
    state: &mut GlobalState,
    store: &StateManager,
) -> anyhow::Result<ApplyResult> {
    let start = Instant::now();
    let regions = provider.regions();
    let projects = provider.projects();

    let (region_deletes, region_changes): (Vec<_>, Vec<_>) =
        steps.regions.into_iter().partition(Step::is_delete);
    let (project_deletes, project_changes): (Vec<_>, Vec<_>) =
        steps.projects.into_iter().partition(Step::is_delete);

    let mut result = ApplyResult::new();
    'run: {
        for step in region_changes {
            if !engine::execute(&regions, ctx, step, state, store, &mut result).await? {
                break 'run;
            }
        }
        for step in project_changes {
            if !engine::execute(&projects, ctx, step, state, store, &mut result).await? {
                break 'run;
            }
        }
        for step in project_deletes {
            if !engine::execute(&projects, ctx, step, state, store, &mut result).await? {
                break 'run;
            }
        }
        for step in region_deletes {
            if !engine::execute(&regions, ctx, step, state, store, &mut result).await? {
                break 'run;
            }
        }
    }
    store.save(state).await?;

    result.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(result)
}

pub fn print_plan(plan: &Plan) {
    if !plan.has_changes {
        println!(
            "{}",
            "No changes. Remote state matches the manifest.".green()
        );
        return;
    }

    println!("{}", "Planned actions:".bold());
    for action in plan.changes() {
        let symbol = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::Update => "~".yellow(),
            ActionType::Replace => "-/+".magenta(),
            ActionType::Delete => "-".red(),
            ActionType::NoOp => " ".normal(),
        };
        println!("  {} {}", symbol, action.description.bold());
        if !action.changed.is_empty() {
            println!("      changed: {}", action.changed.join(", ").yellow());
        }
        for (key, value) in &action.details {
            println!("      {} = {}", key, display_value(value));
        }
    }
    println!();
    println!("Plan: {}", plan.summary());
}

pub fn print_result(result: &ApplyResult) {
    println!();
    if result.is_success() {
        println!(
            "{} {} action(s) completed in {:.1}s",
            "✓".green(),
            result.succeeded.len(),
            result.duration_ms as f64 / 1000.0
        );
    } else {
        println!(
            "{} {} succeeded, {} failed",
            "✗".red(),
            result.succeeded.len(),
            result.failed.len()
        );
        for failure in &result.failed {
            println!(
                "  {}: {}",
                failure.action_id.red(),
                failure.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

/// Read and print every declared data source.
pub async fn read_data_sources(
    provider: &CatalystProvider,
    ctx: &Context,
    data: &[DataConfig],
) -> anyhow::Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    println!();
    println!("{}", "Data sources:".bold());
    for entry in data {
        let value = match entry {
            DataConfig::Organization { .. } => provider
                .organization_data()
                .read(ctx, &())
                .await?
                .map(serde_json::to_value)
                .transpose()?,
            DataConfig::Region { name, lookup } => provider
                .region_data(desired::lookup(*lookup))
                .read(ctx, &RegionQuery { name: name.clone() })
                .await?
                .map(serde_json::to_value)
                .transpose()?,
            DataConfig::Project {
                name,
                organization_id,
            } => provider
                .project_data()
                .read(
                    ctx,
                    &ProjectQuery {
                        name: name.clone(),
                        organization_id: organization_id.clone(),
                    },
                )
                .await?
                .map(serde_json::to_value)
                .transpose()?,
        };

        let address = format!("data.catalyst_{}.{}", entry.kind(), entry.label());
        match value {
            Some(value) => {
                println!("  {}", address.cyan());
                print_attributes(&value);
            }
            None => println!("  {} {}", address.cyan(), "(not found)".yellow()),
        }
    }
    Ok(())
}

/// Print known attributes of a serialized model, masking secrets.
pub fn print_attributes(value: &Value) {
    let Some(map) = value.as_object() else {
        return;
    };
    for (key, value) in map.iter().filter(|(_, v)| !v.is_null()) {
        if key == "join_token" {
            println!("      {} = {}", key, "(sensitive)".dimmed());
        } else {
            println!("      {} = {}", key, display_value(value));
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{:?}", s),
        other => other.to_string(),
    }
}
