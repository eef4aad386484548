//! KDL manifest parser
//!
//! Each top-level node kind has its own module.

mod data;
mod provider;
mod resource;


use data::parse_data;
use provider::parse_provider;
use resource::{parse_project, parse_region};

use crate::error::{ManifestError, Result};
use crate::model::Manifest;
use kdl::{KdlDocument, KdlEntry, KdlNode};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Parse a manifest file
pub fn parse_manifest_file<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let content = fs::read_to_string(path.as_ref())?;
    tracing::debug!("Parsing manifest: {}", path.as_ref().display());
    parse_manifest(&content)
}

/// Parse manifest text
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    let doc: KdlDocument = content.parse()?;
    let mut manifest = Manifest::default();
    let mut seen_provider = false;
    let mut regions = HashSet::new();
    let mut projects = HashSet::new();
    let mut data = HashSet::new();

    for node in doc.nodes() {
        match node.name().value() {
            "provider" => {
                if seen_provider {
                    return Err(ManifestError::Duplicate {
                        kind: "provider",
                        name: "catalyst".to_string(),
                    });
                }
                manifest.provider = parse_provider(node)?;
                seen_provider = true;
            }
            "region" => {
                let region = parse_region(node)?;
                if !regions.insert(region.name.clone()) {
                    return Err(ManifestError::Duplicate {
                        kind: "region",
                        name: region.name,
                    });
                }
                manifest.regions.push(region);
            }
            "project" => {
                let project = parse_project(node)?;
                if !projects.insert(project.name.clone()) {
                    return Err(ManifestError::Duplicate {
                        kind: "project",
                        name: project.name,
                    });
                }
                manifest.projects.push(project);
            }
            "data" => {
                let source = parse_data(node)?;
                if !data.insert((source.kind(), source.label().to_string())) {
                    return Err(ManifestError::Duplicate {
                        kind: "data source",
                        name: format!("{}.{}", source.kind(), source.label()),
                    });
                }
                manifest.data.push(source);
            }
            other => return Err(ManifestError::UnknownNode(other.to_string())),
        }
    }

    tracing::debug!(
        "Parsed manifest: {} regions, {} projects, {} data sources",
        manifest.regions.len(),
        manifest.projects.len(),
        manifest.data.len()
    );
    Ok(manifest)
}

/// Positional (unnamed) arguments of a node
fn arguments(node: &KdlNode) -> impl Iterator<Item = &KdlEntry> {
    node.entries().iter().filter(|e| e.name().is_none())
}

/// First positional argument as a string, required
fn node_name(node: &KdlNode, kind: &'static str) -> Result<String> {
    arguments(node)
        .next()
        .and_then(|e| e.value().as_string())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ManifestError::MissingName(kind))
}

fn string_value(child: &KdlNode, kind: &'static str, name: &str) -> Result<String> {
    arguments(child)
        .next()
        .and_then(|e| e.value().as_string())
        .map(str::to_string)
        .ok_or_else(|| ManifestError::InvalidValue {
            kind,
            name: name.to_string(),
            attribute: child.name().value().to_string(),
            expected: "a string",
        })
}

/// Boolean attribute; quoted `"true"`/`"false"` is accepted with a warning.
fn bool_value(child: &KdlNode, kind: &'static str, name: &str) -> Result<bool> {
    let attribute = child.name().value();
    let value = arguments(child).next().map(|e| e.value());

    if let Some(b) = value.and_then(|v| v.as_bool()) {
        return Ok(b);
    }

    match value.and_then(|v| v.as_string()) {
        Some(s @ ("true" | "false")) => {
            tracing::warn!(
                "{} \"{}\": `{} \"{}\"` is a string, not a boolean; use #{} instead",
                kind,
                name,
                attribute,
                s,
                s
            );
            Ok(s == "true")
        }
        _ => Err(ManifestError::InvalidValue {
            kind,
            name: name.to_string(),
            attribute: attribute.to_string(),
            expected: "a boolean (#true or #false)",
        }),
    }
}
