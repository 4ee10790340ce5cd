// src/resolver.rs

use crate::registry::SchemaRegistry;

/// Filename suffix patterns, ordered; first match wins. Matching is
/// case-insensitive against the base filename.
const FILENAME_PATTERNS: &[(&str, &str)] = &[
    ("_tasklist.json", "task-file.json"),
    ("_plan.json", "plan-file.json"),
    ("_codebaseanalysis.json", "plan-file.json"),
];

/// Built-in fallback table for known agents; the per-project mapping file
/// takes precedence over these.
const DEFAULT_AGENT_SCHEMAS: &[(&str, &str)] = &[
    ("T-tasker", "task-file.json"),
    ("tasklist-agent-v2", "task-file.json"),
    ("task-updater-agent", "task-file.json"),
    ("input-analyzer", "plan-file.json"),
    ("specs-agent-v2", "plan-file.json"),
];

/// The filename signal and the agent signal named different schemas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub agent: String,
    pub from_filename: String,
    pub from_agent: String,
}

impl Conflict {
    pub fn message(&self) -> String {
        format!(
            "Schema mismatch: File pattern suggests '{}' but agent '{}' suggests '{}'",
            self.from_filename, self.agent, self.from_agent
        )
    }
}

/// Outcome of dual-source schema resolution. `schema` is `None` when
/// neither signal produced a name, in which case the file is outside the
/// validated surface and passes by default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub schema: Option<String>,
    pub conflict: Option<Conflict>,
}

pub fn schema_from_filename(filename: &str) -> Option<&'static str> {
    let lower = filename.to_ascii_lowercase();
    FILENAME_PATTERNS
        .iter()
        .find(|(suffix, _)| lower.ends_with(suffix))
        .map(|(_, schema)| *schema)
}

pub fn schema_from_agent<'r>(registry: &'r SchemaRegistry, agent: &str) -> Option<&'r str> {
    if let Some(schema) = registry.agent_override(agent) {
        return Some(schema);
    }
    DEFAULT_AGENT_SCHEMAS
        .iter()
        .find(|(name, _)| *name == agent)
        .map(|(_, schema)| *schema)
}

/// Resolve the schema for `filename` written by `agent`.
///
/// When both signals are present and disagree, the filename signal wins
/// and the disagreement is reported as a [`Conflict`]; absence of both is
/// not an error.
pub fn resolve(registry: &SchemaRegistry, filename: &str, agent: &str) -> Resolution {
    let from_filename = schema_from_filename(filename);
    let from_agent = schema_from_agent(registry, agent);

    let conflict = match (from_filename, from_agent) {
        (Some(f), Some(a)) if f != a => Some(Conflict {
            agent: agent.to_string(),
            from_filename: f.to_string(),
            from_agent: a.to_string(),
        }),
        _ => None,
    };

    Resolution {
        schema: from_filename.or(from_agent).map(str::to_string),
        conflict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn empty_registry() -> (TempDir, SchemaRegistry) {
        let dir = TempDir::new().unwrap();
        let reg = SchemaRegistry::new(dir.path());
        (dir, reg)
    }

    #[test]
    fn filename_suffixes_match_case_insensitively() {
        assert_eq!(schema_from_filename("A_TaskList.json"), Some("task-file.json"));
        assert_eq!(schema_from_filename("a_tasklist.JSON"), Some("task-file.json"));
        assert_eq!(schema_from_filename("x_plan.json"), Some("plan-file.json"));
        assert_eq!(schema_from_filename("x_CodebaseAnalysis.json"), Some("plan-file.json"));
        assert_eq!(schema_from_filename("random.json"), None);
    }

    #[test]
    fn known_agents_fall_back_to_default_table() {
        let (_dir, reg) = empty_registry();
        assert_eq!(schema_from_agent(&reg, "T-tasker"), Some("task-file.json"));
        assert_eq!(schema_from_agent(&reg, "input-analyzer"), Some("plan-file.json"));
        assert_eq!(schema_from_agent(&reg, "unknown"), None);
    }

    #[test]
    fn explicit_map_overrides_default_table() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".claude/hooks")).unwrap();
        std::fs::write(
            dir.path().join(".claude/hooks/agent_schema_map.json"),
            r#"{"T-tasker": "plan-file.json"}"#,
        )
        .unwrap();
        let reg = SchemaRegistry::new(dir.path());
        assert_eq!(schema_from_agent(&reg, "T-tasker"), Some("plan-file.json"));
    }

    #[test]
    fn filename_wins_and_conflict_is_flagged() {
        let (_dir, reg) = empty_registry();
        let res = resolve(&reg, "A_TaskList.json", "input-analyzer");
        assert_eq!(res.schema.as_deref(), Some("task-file.json"));
        let conflict = res.conflict.unwrap();
        assert_eq!(conflict.from_filename, "task-file.json");
        assert_eq!(conflict.from_agent, "plan-file.json");
        assert!(conflict.message().contains("Schema mismatch"));
    }

    #[test]
    fn agreeing_signals_do_not_conflict() {
        let (_dir, reg) = empty_registry();
        let res = resolve(&reg, "A_TaskList.json", "T-tasker");
        assert_eq!(res.schema.as_deref(), Some("task-file.json"));
        assert!(res.conflict.is_none());
    }

    #[test]
    fn single_signal_is_used_as_is() {
        let (_dir, reg) = empty_registry();
        let by_name = resolve(&reg, "A_TaskList.json", "nobody");
        assert_eq!(by_name.schema.as_deref(), Some("task-file.json"));
        let by_agent = resolve(&reg, "output.json", "T-tasker");
        assert_eq!(by_agent.schema.as_deref(), Some("task-file.json"));
    }

    #[test]
    fn no_signal_means_no_schema() {
        let (_dir, reg) = empty_registry();
        let res = resolve(&reg, "output.json", "nobody");
        assert_eq!(res.schema, None);
        assert!(res.conflict.is_none());
    }
}
