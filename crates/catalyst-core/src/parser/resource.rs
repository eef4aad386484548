//! region and project nodes

use super::{bool_value, node_name, string_value};
use crate::error::{ManifestError, Result};
use crate::model::{ProjectConfig, RegionConfig};
use kdl::KdlNode;

fn unknown(kind: &'static str, name: &str, attribute: &str) -> ManifestError {
    ManifestError::UnknownAttribute {
        kind,
        name: name.to_string(),
        attribute: attribute.to_string(),
    }
}

/// Parse a region node
pub fn parse_region(node: &KdlNode) -> Result<RegionConfig> {
    const KIND: &str = "region";
    let name = node_name(node, KIND)?;

    let mut ingress = None;
    let mut region = RegionConfig {
        name: name.clone(),
        ..Default::default()
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "ingress" => ingress = Some(string_value(child, KIND, &name)?),
                "host" => region.host = Some(string_value(child, KIND, &name)?),
                "location" => region.location = Some(string_value(child, KIND, &name)?),
                other => return Err(unknown(KIND, &name, other)),
            }
        }
    }

    region.ingress = ingress.ok_or(ManifestError::MissingAttribute {
        kind: KIND,
        name,
        attribute: "ingress",
    })?;
    Ok(region)
}

/// Parse a project node
pub fn parse_project(node: &KdlNode) -> Result<ProjectConfig> {
    const KIND: &str = "project";
    let name = node_name(node, KIND)?;

    let mut project = ProjectConfig {
        name: name.clone(),
        ..Default::default()
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "region" => project.region = Some(string_value(child, KIND, &name)?),
                "organization_id" | "organization-id" => {
                    project.organization_id = Some(string_value(child, KIND, &name)?);
                }
                "managed_pubsub" | "managed-pubsub" => {
                    project.managed_pubsub = Some(bool_value(child, KIND, &name)?);
                }
                "managed_kvstore" | "managed-kvstore" => {
                    project.managed_kvstore = Some(bool_value(child, KIND, &name)?);
                }
                "managed_workflow" | "managed-workflow" => {
                    project.managed_workflow = Some(bool_value(child, KIND, &name)?);
                }
                "wait_for_ready" | "wait-for-ready" => {
                    project.wait_for_ready = Some(bool_value(child, KIND, &name)?);
                }
                other => return Err(unknown(KIND, &name, other)),
            }
        }
    }

    Ok(project)
}
