//! Schema Loading
//!
//! Finds PDSC files under a directory, strips the comments PDSC allows but
//! JSON does not, decodes each file and feeds its references into a
//! [`DependencyGraph`]. Files are processed one at a time, in path order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use walkdir::WalkDir;

use super::DependencyGraph;
use crate::error::{Result, SchemaError};
use crate::schema::SchemaRecord;

/// Configuration for schema loading
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// File extension to pick up, without the dot
    pub extension: String,
    /// Skip files whose path relative to the root starts with one of these
    pub skip_prefixes: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            extension: "pdsc".to_string(),
            skip_prefixes: vec![
                "target/".to_string(),
                ".git/".to_string(),
                "node_modules/".to_string(),
            ],
        }
    }
}

/// List schema files under `dir`, sorted by path
pub fn discover(dir: &Path, config: &LoadConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if path.extension().map(|e| e != config.extension.as_str()).unwrap_or(true) {
            continue;
        }

        let relative = path.strip_prefix(dir).unwrap_or(path).to_string_lossy();
        if config.skip_prefixes.iter().any(|p| relative.starts_with(p.as_str())) {
            tracing::debug!(path = %path.display(), "skipping");
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn line_comment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?m)//[^"\n]*$"#).expect("valid line comment regex"))
}

fn block_comment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/\*(\*[^/]|[^*])*\*/").expect("valid block comment regex"))
}

/// Remove `//` and `/* */` comments
///
/// Line comments containing a `"` are left alone so URLs inside string
/// literals survive.
pub fn strip_comments(content: &str) -> String {
    let without_lines = line_comment().replace_all(content, "");
    block_comment().replace_all(&without_lines, "").into_owned()
}

/// Read and decode one schema file
pub fn load_file(path: &Path) -> Result<SchemaRecord> {
    let content = fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let stripped = strip_comments(&content);
    SchemaRecord::from_json(&stripped).map_err(|source| {
        tracing::debug!(path = %path.display(), content = %stripped, "decode failed");
        SchemaError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        }
    })
}

/// Load every schema under `dir` into `graph`
///
/// Stops at the first file that cannot be read or decoded. Returns the
/// number of files ingested.
pub fn load_into(dir: &Path, config: &LoadConfig, graph: &mut DependencyGraph) -> Result<usize> {
    tracing::info!(dir = %dir.display(), "walking");
    let files = discover(dir, config)?;

    for path in &files {
        let record = load_file(path)?;
        let added = graph.ingest(&record);
        tracing::debug!(path = %path.display(), record = %record.full_name(), edges = added, "ingested");
    }

    tracing::info!(files = files.len(), edges = graph.edge_count(), "finished walking");
    Ok(files.len())
}

/// Build a graph from every schema under `dir`
pub fn load_from_directory(dir: &Path, config: &LoadConfig, namespace: &str) -> Result<DependencyGraph> {
    let mut graph = DependencyGraph::new(namespace);
    load_into(dir, config, &mut graph)?;
    Ok(graph)
}
