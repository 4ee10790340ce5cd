// src/registry.rs

use anyhow::{Context, Result};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

/// Name of the optional per-project agent-to-schema mapping file,
/// looked up under `.claude/hooks/`.
pub const AGENT_SCHEMA_MAP_FILE: &str = "agent_schema_map.json";

/// Loads schema documents and the agent-to-schema mapping for one project.
///
/// Everything is read fresh per invocation; the hook runs once and exits,
/// so there is no cache to invalidate.
pub struct SchemaRegistry {
    project_dir: PathBuf,
    schemas_dir: PathBuf,
    agent_schema_map: BTreeMap<String, String>,
}

impl SchemaRegistry {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let schemas_dir = project_dir.join(".claude").join("schemas");
        let hooks_dir = project_dir.join(".claude").join("hooks");
        let agent_schema_map = load_agent_schema_map(&hooks_dir);
        Self { project_dir, schemas_dir, agent_schema_map }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Explicit per-project schema override for an agent, if configured.
    pub fn agent_override(&self, agent: &str) -> Option<&str> {
        self.agent_schema_map.get(agent).map(String::as_str)
    }

    /// Read a named schema document from the schemas directory.
    /// Missing or unreadable schemas yield `None`; the caller decides
    /// whether that is fatal for the file being validated.
    pub fn load_schema(&self, name: &str) -> Option<Value> {
        let path = self.schemas_dir.join(name);
        if !path.exists() {
            return None;
        }
        match read_json(&path) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("error loading schema {name}: {e:#}");
                None
            }
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&text).with_context(|| "parse json")?;
    Ok(value)
}

/// Absence of the mapping file is the common case and yields an empty map.
/// A present-but-broken file is logged and also yields an empty map, so a
/// bad config never aborts the run.
fn load_agent_schema_map(hooks_dir: &Path) -> BTreeMap<String, String> {
    let map_file = hooks_dir.join(AGENT_SCHEMA_MAP_FILE);
    if !map_file.exists() {
        return BTreeMap::new();
    }
    match read_json(&map_file) {
        Ok(map) => map,
        Err(e) => {
            warn!("could not load {AGENT_SCHEMA_MAP_FILE}: {e:#}");
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn missing_map_file_yields_empty_map() {
        let dir = project_with(&[]);
        let reg = SchemaRegistry::new(dir.path());
        assert_eq!(reg.agent_override("T-tasker"), None);
    }

    #[test]
    fn unparsable_map_file_yields_empty_map() {
        let dir = project_with(&[(".claude/hooks/agent_schema_map.json", "{not json")]);
        let reg = SchemaRegistry::new(dir.path());
        assert_eq!(reg.agent_override("T-tasker"), None);
    }

    #[test]
    fn map_file_overrides_are_visible() {
        let dir = project_with(&[(
            ".claude/hooks/agent_schema_map.json",
            r#"{"my-agent": "task-file.json"}"#,
        )]);
        let reg = SchemaRegistry::new(dir.path());
        assert_eq!(reg.agent_override("my-agent"), Some("task-file.json"));
        assert_eq!(reg.agent_override("other"), None);
    }

    #[test]
    fn load_schema_missing_returns_none() {
        let dir = project_with(&[]);
        let reg = SchemaRegistry::new(dir.path());
        assert!(reg.load_schema("task-file.json").is_none());
    }

    #[test]
    fn load_schema_reads_document() {
        let dir = project_with(&[(
            ".claude/schemas/task-file.json",
            r#"{"type": "object"}"#,
        )]);
        let reg = SchemaRegistry::new(dir.path());
        let schema = reg.load_schema("task-file.json").unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn load_schema_unparsable_returns_none() {
        let dir = project_with(&[(".claude/schemas/task-file.json", "{broken")]);
        let reg = SchemaRegistry::new(dir.path());
        assert!(reg.load_schema("task-file.json").is_none());
    }
}
