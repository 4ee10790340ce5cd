// src/hook.rs
//
// Invoked by the orchestrator on SubagentStop. Reads one JSON event from
// stdin, scans the subagent's transcript for JSON files it wrote, and
// validates each against its resolved schema.

use crate::{registry::SchemaRegistry, report, transcript, validate};
use regex::Regex;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{debug, warn};

/// Environment variable carrying the acting agent's identity.
pub const AGENT_ENV_VAR: &str = "CLAUDE_AGENT_NAME";

/// All candidates valid (or nothing to do): pass through.
pub const EXIT_PASS: i32 = 0;
/// Blocking validation failure: the caller relays stderr back to the
/// agent and retries.
pub const EXIT_BLOCK: i32 = 2;

/// Hook event payload on stdin. Unknown fields are ignored; all known
/// fields are optional so a sparse payload still runs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HookInput {
    pub cwd: Option<PathBuf>,
    pub transcript_path: Option<PathBuf>,
    pub hook_event_name: Option<String>,
}

/// Exit code plus the lines to print on stderr. Kept as data so the
/// whole run is testable in-process.
#[derive(Debug)]
pub struct HookOutcome {
    pub code: i32,
    pub report: Vec<String>,
}

impl HookOutcome {
    fn pass_quiet() -> Self {
        Self { code: EXIT_PASS, report: Vec::new() }
    }
}

/// Determine the acting agent: environment first, then the first
/// `"subagent_type"` occurrence in the transcript, then "unknown".
pub fn agent_identity(env_value: Option<String>, transcript: &str) -> String {
    if let Some(name) = env_value.filter(|v| !v.is_empty()) {
        return name;
    }
    let probe = Regex::new(r#""subagent_type"\s*:\s*"([^"]+)""#).unwrap();
    if let Some(cap) = probe.captures(transcript) {
        return cap.get(1).unwrap().as_str().to_string();
    }
    "unknown".to_string()
}

/// Run the whole hook over a raw stdin payload.
pub fn run_hook(raw_input: &str, env_agent: Option<String>) -> HookOutcome {
    let input: HookInput = match serde_json::from_str(raw_input) {
        Ok(v) => v,
        Err(e) => {
            // Our own input problems must never block the caller.
            warn!("could not parse hook input JSON: {e}");
            return HookOutcome::pass_quiet();
        }
    };
    if let Some(event) = &input.hook_event_name {
        debug!("hook event: {event}");
    }

    let project_dir = input
        .cwd
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let transcript_path = input.transcript_path.unwrap_or_default();

    let transcript_text = fs::read_to_string(&transcript_path).unwrap_or_default();
    let agent = agent_identity(env_agent, &transcript_text);

    let candidates = transcript::scan_transcript(&transcript_path);
    if candidates.is_empty() {
        return HookOutcome::pass_quiet();
    }

    let registry = SchemaRegistry::new(&project_dir);
    let mut all_valid = true;
    let mut error_lines = Vec::new();
    for candidate in &candidates {
        let check = validate::validate_file(&registry, &candidate.path, &agent);
        if !check.valid {
            all_valid = false;
            error_lines.extend(check.messages);
            error_lines.push(String::new()); // blank line between files
        }
    }

    if all_valid {
        HookOutcome {
            code: EXIT_PASS,
            report: vec![report::success_line(candidates.len())],
        }
    } else {
        HookOutcome {
            code: EXIT_BLOCK,
            report: report::failure_report(&agent, &error_lines),
        }
    }
}
