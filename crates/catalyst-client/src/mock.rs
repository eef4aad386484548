//! In-memory Catalyst API double
//!
//! Behaves like a small Catalyst server: objects move through a scripted
//! status progression one step per read, deletions take a configurable number
//! of reads to complete, and server-managed region fields are re-assigned on
//! every write. Every call is recorded for assertions.
//!
//! ```ignore
//! let api = MockCatalyst::builder()
//!     .organization("org-1", "acme", Some("cra:standard"))
//!     .region_progression(["creating", "ready"])
//!     .build();
//! ```

use crate::api::{OrganizationApi, ProjectApi, RegionApi};
use crate::error::{ClientError, Result};
use crate::types::{
    EndpointDetails, Organization, OrganizationAttributes, OrganizationData, OrganizationRef,
    ProductAttributes, Products, Project, ProjectEndpoints, ProjectStatus, Region, RegionStatus,
    SubResourceStatus, User, UserAttributes, UserData,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// Operations that can be observed or made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CreateRegion,
    GetRegion,
    ListRegions,
    UpdateRegion,
    DeleteRegion,
    CreateProject,
    GetProject,
    UpdateProject,
    DeleteProject,
    GetCurrentUser,
    GetOrganization,
}

/// A recorded API call with the object that was sent
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateRegion(Region),
    GetRegion(String),
    ListRegions,
    UpdateRegion(Region),
    DeleteRegion(String),
    CreateProject(Project),
    GetProject(String),
    UpdateProject(Project),
    DeleteProject(String),
    GetCurrentUser,
    GetOrganization(String),
}

impl Call {
    pub fn op(&self) -> Op {
        match self {
            Call::CreateRegion(_) => Op::CreateRegion,
            Call::GetRegion(_) => Op::GetRegion,
            Call::ListRegions => Op::ListRegions,
            Call::UpdateRegion(_) => Op::UpdateRegion,
            Call::DeleteRegion(_) => Op::DeleteRegion,
            Call::CreateProject(_) => Op::CreateProject,
            Call::GetProject(_) => Op::GetProject,
            Call::UpdateProject(_) => Op::UpdateProject,
            Call::DeleteProject(_) => Op::DeleteProject,
            Call::GetCurrentUser => Op::GetCurrentUser,
            Call::GetOrganization(_) => Op::GetOrganization,
        }
    }
}

/// An injected failure
#[derive(Debug, Clone)]
pub enum Fault {
    NotFound,
    Api { status: u16, message: String },
}

impl Fault {
    pub fn server_error() -> Self {
        Fault::Api {
            status: 500,
            message: "internal server error".to_string(),
        }
    }

    fn into_error(self, kind: &'static str, name: &str) -> ClientError {
        match self {
            Fault::NotFound => ClientError::NotFound {
                kind,
                name: name.to_string(),
            },
            Fault::Api { status, message } => ClientError::Api { status, message },
        }
    }
}

struct Tracked<T> {
    object: T,
    step: usize,
    deleting: Option<u32>,
}

struct MockState {
    regions: BTreeMap<String, Tracked<Region>>,
    projects: BTreeMap<String, Tracked<Project>>,
    organization: Option<Organization>,
    region_progression: Vec<String>,
    project_progression: Vec<String>,
    delete_after: u32,
    region_type: String,
    clusters: Vec<String>,
    endpoint_domain: String,
    faults: HashMap<Op, Vec<Fault>>,
    calls: Vec<Call>,
    tokens_issued: u32,
}

/// In-memory Catalyst API
pub struct MockCatalyst {
    state: Mutex<MockState>,
}

/// Builder for [`MockCatalyst`]
pub struct MockCatalystBuilder {
    state: MockState,
}

impl MockCatalyst {
    pub fn builder() -> MockCatalystBuilder {
        MockCatalystBuilder {
            state: MockState {
                regions: BTreeMap::new(),
                projects: BTreeMap::new(),
                organization: None,
                region_progression: vec!["ready".to_string()],
                project_progression: vec!["ready".to_string()],
                delete_after: 0,
                region_type: "private".to_string(),
                clusters: vec!["cluster-0".to_string()],
                endpoint_domain: "catalyst.example.com".to_string(),
                faults: HashMap::new(),
                calls: Vec::new(),
                tokens_issued: 0,
            },
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make the next call of `op` fail with `fault`.
    pub fn fail_next(&self, op: Op, fault: Fault) {
        self.state().faults.entry(op).or_default().push(fault);
    }

    /// All calls so far
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Number of calls of the given operation
    pub fn count(&self, op: Op) -> usize {
        self.state().calls.iter().filter(|c| c.op() == op).count()
    }

    /// Server-side view of a region, without advancing its status
    pub fn region(&self, name: &str) -> Option<Region> {
        self.state().regions.get(name).map(|t| t.object.clone())
    }

    /// Server-side view of a project, without advancing its status
    pub fn project(&self, name: &str) -> Option<Project> {
        self.state().projects.get(name).map(|t| t.object.clone())
    }

    /// Remove a region behind the provider's back.
    pub fn drop_region(&self, name: &str) {
        self.state().regions.remove(name);
    }

    /// Remove a project behind the provider's back.
    pub fn drop_project(&self, name: &str) {
        self.state().projects.remove(name);
    }
}

impl MockCatalystBuilder {
    /// Organization of the authenticated principal
    pub fn organization(mut self, id: &str, name: &str, plan: Option<&str>) -> Self {
        self.state.organization = Some(Organization {
            data: OrganizationData {
                id: Some(id.to_string()),
                attributes: Some(OrganizationAttributes {
                    name: Some(name.to_string()),
                    products: plan.map(|p| Products {
                        cra: Some(ProductAttributes {
                            plan: Some(p.to_string()),
                        }),
                        mcp: None,
                    }),
                }),
            },
        });
        self
    }

    /// Statuses a region reports after each write, one step per read.
    pub fn region_progression<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.region_progression = statuses.into_iter().map(Into::into).collect();
        self
    }

    /// Statuses a project reports after each write, one step per read.
    pub fn project_progression<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.project_progression = statuses.into_iter().map(Into::into).collect();
        self
    }

    /// Reads needed before a deleted object disappears
    pub fn delete_after(mut self, reads: u32) -> Self {
        self.state.delete_after = reads;
        self
    }

    /// Pre-existing region, stored as given
    pub fn with_region(mut self, region: Region) -> Self {
        let name = region.name().unwrap_or_default().to_string();
        self.state.regions.insert(
            name,
            Tracked {
                object: region,
                step: usize::MAX,
                deleting: None,
            },
        );
        self
    }

    /// Pre-existing project, stored as given
    pub fn with_project(mut self, project: Project) -> Self {
        let name = project.name().unwrap_or_default().to_string();
        self.state.projects.insert(
            name,
            Tracked {
                object: project,
                step: usize::MAX,
                deleting: None,
            },
        );
        self
    }

    pub fn build(self) -> MockCatalyst {
        MockCatalyst {
            state: Mutex::new(self.state),
        }
    }
}

impl MockState {
    fn record(&mut self, call: Call) -> Option<Fault> {
        let op = call.op();
        self.calls.push(call);
        let queue = self.faults.get_mut(&op)?;
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }

    fn region_status(&self, step: usize) -> Option<String> {
        let last = self.region_progression.len().checked_sub(1)?;
        self.region_progression.get(step.min(last)).cloned()
    }

    fn project_status(&self, step: usize) -> Option<String> {
        let last = self.project_progression.len().checked_sub(1)?;
        self.project_progression.get(step.min(last)).cloned()
    }

    fn apply_region_status(&self, tracked: &mut Tracked<Region>) {
        let Some(status) = self.region_status(tracked.step) else {
            return;
        };
        let connected = tracked
            .object
            .status
            .as_ref()
            .and_then(|s| s.connected);
        tracked.object.status = Some(RegionStatus {
            status: Some(SubResourceStatus {
                status: Some(status),
                message: None,
            }),
            connected,
        });
    }

    fn apply_project_status(&self, tracked: &mut Tracked<Project>) {
        let Some(status) = self.project_status(tracked.step) else {
            return;
        };
        let name = tracked.object.name().unwrap_or_default().to_string();
        let endpoints = if status == "processing" || status == "ready" {
            Some(ProjectEndpoints {
                grpc: Some(EndpointDetails {
                    url: Some(format!("grpc-{}.{}:443", name, self.endpoint_domain)),
                }),
                http: Some(EndpointDetails {
                    url: Some(format!("https://http-{}.{}", name, self.endpoint_domain)),
                }),
            })
        } else {
            None
        };
        tracked.object.status = Some(ProjectStatus {
            status: Some(status),
            endpoints,
        });
    }

    /// Server-managed region fields are never taken from the request.
    fn assign_region_fields(&self, region: &mut Region) {
        let spec = region.spec.get_or_insert_with(Default::default);
        spec.region_type = Some(self.region_type.clone());
        spec.clusters = Some(self.clusters.clone());
    }
}

/// Advance a tracked object by one read; returns false once it is gone.
fn advance<T>(tracked: &mut Tracked<T>) -> bool {
    if let Some(remaining) = tracked.deleting {
        if remaining == 0 {
            return false;
        }
        tracked.deleting = Some(remaining - 1);
        return remaining > 1;
    }
    tracked.step = tracked.step.saturating_add(1);
    true
}

#[async_trait]
impl RegionApi for MockCatalyst {
    async fn create_region(&self, region: &Region) -> Result<String> {
        let mut state = self.state();
        let name = region.name().unwrap_or_default().to_string();
        if let Some(fault) = state.record(Call::CreateRegion(region.clone())) {
            return Err(fault.into_error("region", &name));
        }
        if state.regions.contains_key(&name) {
            return Err(ClientError::Api {
                status: 409,
                message: format!("region {} already exists", name),
            });
        }

        let mut object = region.clone();
        state.assign_region_fields(&mut object);
        let mut tracked = Tracked {
            object,
            step: 0,
            deleting: None,
        };
        state.apply_region_status(&mut tracked);
        state.regions.insert(name.clone(), tracked);

        state.tokens_issued += 1;
        Ok(format!("jt-{}-{}", name, state.tokens_issued))
    }

    async fn get_region(&self, name: &str) -> Result<Region> {
        let mut state = self.state();
        if let Some(fault) = state.record(Call::GetRegion(name.to_string())) {
            return Err(fault.into_error("region", name));
        }
        let not_found = || ClientError::NotFound {
            kind: "region",
            name: name.to_string(),
        };

        let mut tracked = state.regions.remove(name).ok_or_else(not_found)?;
        if !advance(&mut tracked) {
            return Err(not_found());
        }
        if tracked.deleting.is_none() && tracked.step != usize::MAX {
            state.apply_region_status(&mut tracked);
        }
        let region = tracked.object.clone();
        state.regions.insert(name.to_string(), tracked);
        Ok(region)
    }

    async fn list_regions(&self) -> Result<Vec<Region>> {
        let mut state = self.state();
        if let Some(fault) = state.record(Call::ListRegions) {
            return Err(fault.into_error("region", ""));
        }
        Ok(state.regions.values().map(|t| t.object.clone()).collect())
    }

    async fn update_region(&self, region: &Region) -> Result<()> {
        let mut state = self.state();
        let name = region.name().unwrap_or_default().to_string();
        if let Some(fault) = state.record(Call::UpdateRegion(region.clone())) {
            return Err(fault.into_error("region", &name));
        }
        let connected = match state.regions.get(&name) {
            Some(existing) => existing.object.status.as_ref().and_then(|s| s.connected),
            None => {
                return Err(ClientError::NotFound {
                    kind: "region",
                    name,
                });
            }
        };

        let mut object = region.clone();
        state.assign_region_fields(&mut object);
        object.status = Some(RegionStatus {
            status: None,
            connected,
        });
        let mut tracked = Tracked {
            object,
            step: 0,
            deleting: None,
        };
        state.apply_region_status(&mut tracked);
        state.regions.insert(name, tracked);
        Ok(())
    }

    async fn delete_region(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        if let Some(fault) = state.record(Call::DeleteRegion(name.to_string())) {
            return Err(fault.into_error("region", name));
        }
        if !state.regions.contains_key(name) {
            return Err(ClientError::NotFound {
                kind: "region",
                name: name.to_string(),
            });
        }

        let delete_after = state.delete_after;
        if delete_after == 0 {
            state.regions.remove(name);
        } else if let Some(tracked) = state.regions.get_mut(name) {
            tracked.deleting = Some(delete_after);
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectApi for MockCatalyst {
    async fn create_project(&self, project: &Project) -> Result<()> {
        let mut state = self.state();
        let name = project.name().unwrap_or_default().to_string();
        if let Some(fault) = state.record(Call::CreateProject(project.clone())) {
            return Err(fault.into_error("project", &name));
        }
        if state.projects.contains_key(&name) {
            return Err(ClientError::Api {
                status: 409,
                message: format!("project {} already exists", name),
            });
        }

        let mut tracked = Tracked {
            object: project.clone(),
            step: 0,
            deleting: None,
        };
        state.apply_project_status(&mut tracked);
        state.projects.insert(name, tracked);
        Ok(())
    }

    async fn get_project(&self, name: &str) -> Result<Project> {
        let mut state = self.state();
        if let Some(fault) = state.record(Call::GetProject(name.to_string())) {
            return Err(fault.into_error("project", name));
        }
        let not_found = || ClientError::NotFound {
            kind: "project",
            name: name.to_string(),
        };

        let mut tracked = state.projects.remove(name).ok_or_else(not_found)?;
        if !advance(&mut tracked) {
            return Err(not_found());
        }
        if tracked.deleting.is_none() && tracked.step != usize::MAX {
            state.apply_project_status(&mut tracked);
        }
        let project = tracked.object.clone();
        state.projects.insert(name.to_string(), tracked);
        Ok(project)
    }

    async fn update_project(&self, project: &Project) -> Result<()> {
        let mut state = self.state();
        let name = project.name().unwrap_or_default().to_string();
        if let Some(fault) = state.record(Call::UpdateProject(project.clone())) {
            return Err(fault.into_error("project", &name));
        }
        if !state.projects.contains_key(&name) {
            return Err(ClientError::NotFound {
                kind: "project",
                name,
            });
        }

        let mut tracked = Tracked {
            object: project.clone(),
            step: 0,
            deleting: None,
        };
        state.apply_project_status(&mut tracked);
        state.projects.insert(name, tracked);
        Ok(())
    }

    async fn delete_project(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        if let Some(fault) = state.record(Call::DeleteProject(name.to_string())) {
            return Err(fault.into_error("project", name));
        }
        if !state.projects.contains_key(name) {
            return Err(ClientError::NotFound {
                kind: "project",
                name: name.to_string(),
            });
        }

        let delete_after = state.delete_after;
        if delete_after == 0 {
            state.projects.remove(name);
        } else if let Some(tracked) = state.projects.get_mut(name) {
            tracked.deleting = Some(delete_after);
        }
        Ok(())
    }
}

#[async_trait]
impl OrganizationApi for MockCatalyst {
    async fn get_current_user(&self) -> Result<User> {
        let mut state = self.state();
        if let Some(fault) = state.record(Call::GetCurrentUser) {
            return Err(fault.into_error("user", "me"));
        }
        let org_id = state
            .organization
            .as_ref()
            .and_then(|o| o.id())
            .map(str::to_string);

        Ok(User {
            data: Some(UserData {
                id: Some("user-1".to_string()),
                attributes: Some(UserAttributes {
                    organization: org_id.map(|id| OrganizationRef { id: Some(id) }),
                }),
            }),
        })
    }

    async fn get_organization(&self, id: &str) -> Result<Organization> {
        let mut state = self.state();
        if let Some(fault) = state.record(Call::GetOrganization(id.to_string())) {
            return Err(fault.into_error("organization", id));
        }
        state
            .organization
            .clone()
            .filter(|o| o.id() == Some(id))
            .ok_or_else(|| ClientError::NotFound {
                kind: "organization",
                name: id.to_string(),
            })
    }
}
