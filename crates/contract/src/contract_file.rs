//! Pact v2 contract file output.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{ContractError, Interaction};

/// Pact specification version written into `metadata`.
pub const PACT_SPECIFICATION_VERSION: &str = "2.0.0";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContractFile<'a> {
    consumer: Party<'a>,
    provider: Party<'a>,
    interactions: &'a [Interaction],
    metadata: Metadata,
}

#[derive(Serialize)]
struct Party<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    pact_specification: SpecVersion,
}

#[derive(Serialize)]
struct SpecVersion {
    version: &'static str,
}

/// File name for a consumer/provider pair, e.g. `xo-sdk-xenorchestra.json`.
pub fn file_name(consumer: &str, provider: &str) -> String {
    let normalise = |name: &str| name.trim().to_lowercase().replace(char::is_whitespace, "_");
    format!("{}-{}.json", normalise(consumer), normalise(provider))
}

/// Renders the contract document.
pub fn render(
    consumer: &str,
    provider: &str,
    interactions: &[Interaction],
) -> Result<Vec<u8>, ContractError> {
    let file = ContractFile {
        consumer: Party { name: consumer },
        provider: Party { name: provider },
        interactions,
        metadata: Metadata {
            pact_specification: SpecVersion {
                version: PACT_SPECIFICATION_VERSION,
            },
        },
    };
    serde_json::to_vec_pretty(&file).map_err(ContractError::Serialise)
}

/// Writes the contract into `dir`, creating it if needed, and returns the path.
pub fn write(
    dir: &Path,
    consumer: &str,
    provider: &str,
    interactions: &[Interaction],
) -> Result<PathBuf, ContractError> {
    let path = dir.join(file_name(consumer, provider));
    let io_err = |source| ContractError::ContractFile {
        path: path.clone(),
        source,
    };

    let contents = render(consumer, provider, interactions)?;
    fs::create_dir_all(dir).map_err(io_err)?;
    fs::write(&path, contents).map_err(io_err)?;
    Ok(path)
}
