//! Reading and writing flow documents as JSON files.
//!
//! A flow named `support` lives at `{flows_dir}/support.json`.

use crate::error::{FlowError, Result};
use crate::graph::FlowDocument;
use std::fs;
use std::path::{Path, PathBuf};

pub const FLOW_EXTENSION: &str = "json";

pub fn to_json(doc: &FlowDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

pub fn from_json(json: &str) -> Result<FlowDocument> {
    FlowDocument::parse(json)
}

/// Accepts `name` or `name.json`; rejects anything that could escape `flows_dir`.
pub fn flow_path(flows_dir: &Path, name: &str) -> Result<PathBuf> {
    let trimmed = name.trim();
    let stem = trimmed
        .strip_suffix(".json")
        .unwrap_or(trimmed);
    if stem.is_empty() || stem.starts_with('.') || stem.contains(['/', '\\']) {
        return Err(FlowError::InvalidName(name.to_string()));
    }
    Ok(flows_dir.join(format!("{}.{}", stem, FLOW_EXTENSION)))
}

pub fn save_flow(flows_dir: &Path, name: &str, doc: &FlowDocument) -> Result<PathBuf> {
    let path = flow_path(flows_dir, name)?;
    let json = to_json(doc)?;
    fs::create_dir_all(flows_dir).map_err(|e| FlowError::io(flows_dir, e))?;
    fs::write(&path, json).map_err(|e| FlowError::io(&path, e))?;
    log::info!("Saved flow to {}", path.display());
    Ok(path)
}

pub fn load_flow(flows_dir: &Path, name: &str) -> Result<FlowDocument> {
    let path = flow_path(flows_dir, name)?;
    let json = fs::read_to_string(&path).map_err(|e| FlowError::io(&path, e))?;
    let doc = from_json(&json)?;
    log::info!(
        "Loaded flow {} ({} nodes, {} edges)",
        path.display(),
        doc.nodes.len(),
        doc.edges.len()
    );
    Ok(doc)
}

pub fn delete_flow(flows_dir: &Path, name: &str) -> Result<()> {
    let path = flow_path(flows_dir, name)?;
    fs::remove_file(&path).map_err(|e| FlowError::io(&path, e))?;
    log::info!("Deleted flow {}", path.display());
    Ok(())
}

/// Names of saved flows that [`load_flow`] accepts, sorted. A missing
/// directory has no flows.
pub fn list_flows(flows_dir: &Path) -> Result<Vec<String>> {
    if !flows_dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(flows_dir).map_err(|e| FlowError::io(flows_dir, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| FlowError::io(flows_dir, e))?.path();
        if path.extension().and_then(|e| e.to_str()) == Some(FLOW_EXTENSION) {
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if flow_path(flows_dir, stem).is_ok() => names.push(stem.to_string()),
                _ => log::debug!("Skipping {}: not a loadable flow name", path.display()),
            }
        }
    }
    names.sort();
    Ok(names)
}
