//! provider node

use super::{arguments, string_value};
use crate::error::{ManifestError, Result};
use catalyst_config::ProviderBlock;
use kdl::KdlNode;

const KIND: &str = "provider";

/// Parse `provider "catalyst" { api_key "..." endpoint "..." }`
pub fn parse_provider(node: &KdlNode) -> Result<ProviderBlock> {
    let name = arguments(node)
        .next()
        .and_then(|e| e.value().as_string())
        .unwrap_or("catalyst");
    if name != "catalyst" {
        return Err(ManifestError::UnsupportedProvider(name.to_string()));
    }

    let mut block = ProviderBlock::default();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "api_key" | "api-key" => {
                    block.api_key = Some(string_value(child, KIND, name)?);
                }
                "endpoint" => {
                    block.endpoint = Some(string_value(child, KIND, name)?);
                }
                other => {
                    return Err(ManifestError::UnknownAttribute {
                        kind: KIND,
                        name: name.to_string(),
                        attribute: other.to_string(),
                    });
                }
            }
        }
    }

    Ok(block)
}
