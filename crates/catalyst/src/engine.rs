//! Plan and apply driver over any [`Resource`]

use crate::progress::Spinner;
use catalyst_provider::{
    Action, ActionType, ApplyResult, Context, GlobalState, ReadOutcome, Resource, StateManager,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// One planned change to one instance
pub enum Step<M> {
    Create { planned: M },
    Update { planned: M, prior: M, changed: Vec<&'static str> },
    Replace { planned: M, prior: M, changed: Vec<&'static str> },
    Delete { prior: M },
    NoOp { planned: M },
}

impl<M> Step<M> {
    pub fn action(&self) -> ActionType {
        match self {
            Step::Create { .. } => ActionType::Create,
            Step::Update { .. } => ActionType::Update,
            Step::Replace { .. } => ActionType::Replace,
            Step::Delete { .. } => ActionType::Delete,
            Step::NoOp { .. } => ActionType::NoOp,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Step::Delete { .. })
    }

    fn model(&self) -> &M {
        match self {
            Step::Create { planned }
            | Step::Update { planned, .. }
            | Step::Replace { planned, .. }
            | Step::NoOp { planned } => planned,
            Step::Delete { prior } => prior,
        }
    }

    fn changed(&self) -> &[&'static str] {
        match self {
            Step::Update { changed, .. } | Step::Replace { changed, .. } => changed,
            _ => &[],
        }
    }
}

/// Displayable action for `step`.
///
/// Details carry the known planned values; secrets are masked.
pub fn describe<R: Resource>(step: &Step<R::Model>) -> Action {
    let model = step.model();
    let details = match serde_json::to_value(model) {
        Ok(Value::Object(map)) if !step.is_delete() => map
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                if k == "join_token" {
                    (k, Value::String("(sensitive)".to_string()))
                } else {
                    (k, v)
                }
            })
            .collect(),
        _ => BTreeMap::new(),
    };

    Action::new(step.action(), R::TYPE_NAME, R::instance_name(model))
        .with_changed(step.changed().iter().copied())
        .with_details(details)
}

/// Re-read every stored instance of `R`, dropping the ones that are gone.
///
/// Returns the names that drifted away.
pub async fn refresh<R: Resource>(
    resource: &R,
    ctx: &Context,
    state: &mut GlobalState,
) -> catalyst_provider::Result<Vec<String>> {
    let mut gone = Vec::new();
    for prior in state.all::<R>()? {
        let name = R::instance_name(&prior).to_string();
        match resource.read(ctx, prior).await? {
            ReadOutcome::Present(model) => state.put::<R>(&model)?,
            ReadOutcome::Absent => {
                state.remove::<R>(&name);
                gone.push(name);
            }
        }
    }
    Ok(gone)
}

/// Validate and plan `desired` against state; stored instances not declared
/// any more are deleted.
pub fn plan<R: Resource>(
    resource: &R,
    state: &GlobalState,
    desired: &[R::Model],
) -> catalyst_provider::Result<Vec<Step<R::Model>>> {
    let mut steps = Vec::new();
    for model in desired {
        resource.validate(model)?;
        let prior = state.get::<R>(R::instance_name(model))?;
        let change = resource.plan(model, prior.as_ref());
        let step = match (change.action, prior) {
            (ActionType::Update, Some(prior)) => Step::Update {
                planned: change.planned,
                prior,
                changed: change.changed,
            },
            (ActionType::Replace, Some(prior)) => Step::Replace {
                planned: change.planned,
                prior,
                changed: change.changed,
            },
            (ActionType::NoOp, _) => Step::NoOp {
                planned: change.planned,
            },
            _ => Step::Create {
                planned: change.planned,
            },
        };
        steps.push(step);
    }

    for prior in state.all::<R>()? {
        let name = R::instance_name(&prior);
        if !desired.iter().any(|d| R::instance_name(d) == name) {
            steps.push(Step::Delete { prior });
        }
    }
    Ok(steps)
}

/// Delete every stored instance of `R`.
pub fn plan_destroy<R: Resource>(
    state: &GlobalState,
) -> catalyst_provider::Result<Vec<Step<R::Model>>> {
    Ok(state
        .all::<R>()?
        .into_iter()
        .map(|prior| Step::Delete { prior })
        .collect())
}

/// Execute one step and persist state right after it.
///
/// Failures are recorded in `result`; the return value says whether to go on.
pub async fn execute<R: Resource>(
    resource: &R,
    ctx: &Context,
    step: Step<R::Model>,
    state: &mut GlobalState,
    store: &StateManager,
    result: &mut ApplyResult,
) -> anyhow::Result<bool> {
    let action = describe::<R>(&step);
    if step.action() == ActionType::NoOp {
        if let Step::NoOp { planned } = step {
            state.put::<R>(&planned)?;
        }
        return Ok(true);
    }

    let spinner = Spinner::new(&action.description);
    let outcome = apply_step(resource, ctx, step, state).await;
    store.save(state).await?;

    match outcome {
        Ok(()) => {
            spinner.finish_success(&action.description);
            result.add_success(action.id, action.description);
            Ok(true)
        }
        Err(e) => {
            spinner.finish_error(&action.description, &e.to_string());
            tracing::debug!("{} failed: {:?}", action.id, e);
            result.add_failure(action.id, e.to_string());
            Ok(false)
        }
    }
}

async fn apply_step<R: Resource>(
    resource: &R,
    ctx: &Context,
    step: Step<R::Model>,
    state: &mut GlobalState,
) -> catalyst_provider::Result<()> {
    match step {
        Step::Create { planned } => create::<R>(resource, ctx, planned, state).await?,
        Step::Update { planned, prior, .. } => {
            match resource.update(ctx, planned, &prior).await {
                Ok(model) => state.put::<R>(&model)?,
                Err(e) if e.is_gone() => {
                    state.remove::<R>(R::instance_name(&prior));
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
        Step::Replace { planned, prior, .. } => {
            resource.delete(ctx, &prior).await?;
            state.remove::<R>(R::instance_name(&prior));
            create::<R>(resource, ctx, planned, state).await?;
        }
        Step::Delete { prior } => {
            resource.delete(ctx, &prior).await?;
            state.remove::<R>(R::instance_name(&prior));
        }
        Step::NoOp { planned } => state.put::<R>(&planned)?,
    }
    Ok(())
}

/// Create and record the instance; an interrupted create still records
/// whatever the resource handed back.
async fn create<R: Resource>(
    resource: &R,
    ctx: &Context,
    planned: R::Model,
    state: &mut GlobalState,
) -> catalyst_provider::Result<()> {
    match resource.create(ctx, planned).await {
        Ok(model) => state.put::<R>(&model),
        Err(e) => {
            if let Some(partial) = e.partial_state::<R::Model>() {
                tracing::warn!(
                    "{} {} was created but did not settle; recording partial state",
                    R::TYPE_NAME,
                    R::instance_name(&partial)
                );
                state.put::<R>(&partial)?;
            }
            Err(e)
        }
    }
}
