//! data node

use super::{arguments, string_value};
use crate::error::{ManifestError, Result};
use crate::model::{DataConfig, LookupStrategy};
use kdl::KdlNode;

/// Parse `data "<type>" "<name>" { ... }`
pub fn parse_data(node: &KdlNode) -> Result<DataConfig> {
    let mut args = arguments(node).filter_map(|e| e.value().as_string());
    let kind = args.next().ok_or(ManifestError::MissingName("data"))?;
    let label = args
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(ManifestError::MissingName("data source"))?
        .to_string();

    let children = node.children().map(|c| c.nodes()).unwrap_or_default();

    match kind {
        "organization" => {
            if let Some(child) = children.first() {
                return Err(ManifestError::UnknownAttribute {
                    kind: "data.organization",
                    name: label,
                    attribute: child.name().value().to_string(),
                });
            }
            Ok(DataConfig::Organization { label })
        }
        "region" => {
            let mut lookup = LookupStrategy::default();
            for child in children {
                match child.name().value() {
                    "lookup" => {
                        lookup = match string_value(child, "data.region", &label)?.as_str() {
                            "key" | "name" => LookupStrategy::Key,
                            "scan" | "list" => LookupStrategy::Scan,
                            _ => {
                                return Err(ManifestError::InvalidValue {
                                    kind: "data.region",
                                    name: label,
                                    attribute: "lookup".to_string(),
                                    expected: "\"key\" or \"scan\"",
                                });
                            }
                        };
                    }
                    other => {
                        return Err(ManifestError::UnknownAttribute {
                            kind: "data.region",
                            name: label,
                            attribute: other.to_string(),
                        });
                    }
                }
            }
            Ok(DataConfig::Region {
                name: label,
                lookup,
            })
        }
        "project" => {
            let mut organization_id = None;
            for child in children {
                match child.name().value() {
                    "organization_id" | "organization-id" => {
                        organization_id = Some(string_value(child, "data.project", &label)?);
                    }
                    other => {
                        return Err(ManifestError::UnknownAttribute {
                            kind: "data.project",
                            name: label,
                            attribute: other.to_string(),
                        });
                    }
                }
            }
            Ok(DataConfig::Project {
                name: label,
                organization_id,
            })
        }
        other => Err(ManifestError::UnknownDataSource(other.to_string())),
    }
}
