//! # Node Descriptors
//!
//! Reads the node descriptor directory: one JSON object per `*.json` file,
//! `{short_name, name, url, type, wallet, identity, msp_id?}`. Files are
//! read in file name order so registry load order is stable.

use crate::config::ConfigError;
use shared_types::Node;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parse and validate one descriptor file.
pub fn load_descriptor(path: &Path) -> Result<Node, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let node: Node = serde_json::from_str(&text).map_err(|source| ConfigError::Descriptor {
        path: path.to_path_buf(),
        source,
    })?;
    node.validate().map_err(|source| ConfigError::InvalidNode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(node)
}

/// Load every `*.json` descriptor in `dir`, sorted by file name.
///
/// Other files are ignored. The first malformed descriptor aborts the load.
pub fn load_descriptor_dir(dir: &Path) -> Result<Vec<Node>, ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let nodes = paths
        .iter()
        .map(|path| load_descriptor(path))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(dir = %dir.display(), count = nodes.len(), "Loaded node descriptors");
    Ok(nodes)
}
