//! Compiled contract artifacts produced by Hardhat or Foundry.

use std::path::{Path, PathBuf};

use alloy_core::{json_abi::JsonAbi, primitives::Bytes};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::DeployError;

/// The deployable form of a contract: creation bytecode plus its ABI.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    /// Contract name, used in status messages.
    pub name: String,
    /// Creation bytecode.
    pub bytecode: Bytes,
    pub abi: JsonAbi,
    /// Solidity version that produced the bytecode, when the build info is available.
    pub compiler_version: Option<String>,
    /// File the artifact was loaded from.
    pub path: PathBuf,
}

/// On-disk artifact layout shared by Hardhat and Foundry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    #[serde(default)]
    contract_name: Option<String>,
    abi: JsonAbi,
    bytecode: BytecodeField,
    #[serde(default)]
    link_references: Option<Value>,
}

/// Hardhat stores the bytecode as a hex string, Foundry wraps it in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Hex(String),
    #[serde(rename_all = "camelCase")]
    Object {
        object: String,
        #[serde(default)]
        link_references: Option<Value>,
    },
}

/// Hardhat's `<Name>.dbg.json`, pointing at the build info.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    build_info: PathBuf,
}

/// The part of Hardhat's build info carrying the compiler version.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildInfo {
    solc_version: String,
}

impl ContractArtifact {
    /// Find and load the artifact of `name` under `artifacts_dir`.
    pub fn load(artifacts_dir: &Path, name: &str) -> Result<Self, DeployError> {
        let load = || -> Result<Self> {
            let path = find_artifact(artifacts_dir, name)?;
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let mut artifact = Self::from_json(name, &content)
                .with_context(|| format!("Invalid artifact {}", path.display()))?;
            artifact.compiler_version = read_compiler_version(&path);
            artifact.path = path;
            Ok(artifact)
        };

        let artifact = load().map_err(|source| DeployError::Artifact {
            contract: name.to_string(),
            source,
        })?;

        tracing::debug!(
            contract = %artifact.name,
            path = %artifact.path.display(),
            bytecode_len = artifact.bytecode.len(),
            compiler_version = ?artifact.compiler_version,
            "Contract artifact loaded"
        );

        Ok(artifact)
    }

    /// Parse an artifact from its JSON representation.
    pub fn from_json(name: &str, json: &str) -> Result<Self> {
        let file: ArtifactFile =
            serde_json::from_str(json).context("Failed to parse artifact JSON")?;

        if let Some(contract_name) = &file.contract_name {
            if contract_name != name {
                anyhow::bail!(
                    "Artifact is for contract `{}`, expected `{}`",
                    contract_name,
                    name
                );
            }
        }

        let (bytecode, nested_links) = match file.bytecode {
            BytecodeField::Hex(hex) => (hex, None),
            BytecodeField::Object {
                object,
                link_references,
            } => (object, link_references),
        };

        let has_links = [file.link_references.as_ref(), nested_links.as_ref()]
            .into_iter()
            .flatten()
            .any(|links| links.as_object().is_some_and(|links| !links.is_empty()));
        if has_links || bytecode.contains("__") {
            anyhow::bail!("Bytecode has unlinked library references");
        }

        let bytecode: Bytes = bytecode
            .parse()
            .context("Bytecode is not valid hex")?;
        if bytecode.is_empty() {
            anyhow::bail!("Bytecode is empty; abstract contracts and interfaces cannot be deployed");
        }

        if let Some(constructor) = &file.abi.constructor {
            if !constructor.inputs.is_empty() {
                anyhow::bail!(
                    "Constructor expects {} argument(s), but constructor arguments are not supported",
                    constructor.inputs.len()
                );
            }
        }

        Ok(Self {
            name: name.to_string(),
            bytecode,
            abi: file.abi,
            compiler_version: None,
            path: PathBuf::new(),
        })
    }
}

/// Locate `<name>.json` under `dir`, trying the Hardhat layout first.
fn find_artifact(dir: &Path, name: &str) -> Result<PathBuf> {
    let file_name = format!("{}.json", name);

    let hardhat_path = dir
        .join("contracts")
        .join(format!("{}.sol", name))
        .join(&file_name);
    if hardhat_path.is_file() {
        return Ok(hardhat_path);
    }

    if !dir.is_dir() {
        anyhow::bail!("Artifacts directory not found: {}", dir.display());
    }

    let mut found = Vec::new();
    search(dir, &file_name, &mut found)?;
    found.sort();

    match found.len() {
        0 => anyhow::bail!("No artifact named {} under {}", file_name, dir.display()),
        1 => Ok(found.remove(0)),
        _ => anyhow::bail!(
            "Contract name `{}` is ambiguous, found: {}",
            name,
            found
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn search(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        // Symlinked directories are not followed, so link cycles cannot recurse forever.
        if entry.file_type()?.is_dir() {
            // Hardhat build info is large and never holds artifacts.
            if path.file_name().is_some_and(|n| n == "build-info") {
                continue;
            }
            search(&path, file_name, found)?;
        } else if path.file_name().is_some_and(|n| n == file_name) {
            found.push(path);
        }
    }

    Ok(())
}

/// Read the solc version from Hardhat's debug file and build info, if present.
fn read_compiler_version(artifact_path: &Path) -> Option<String> {
    let dir = artifact_path.parent()?;
    let stem = artifact_path.file_stem()?.to_str()?;
    let debug_path = dir.join(format!("{}.dbg.json", stem));

    let debug: DebugFile = serde_json::from_str(&std::fs::read_to_string(debug_path).ok()?).ok()?;
    let build_info: BuildInfo =
        serde_json::from_str(&std::fs::read_to_string(dir.join(debug.build_info)).ok()?).ok()?;

    Some(build_info.solc_version)
}
