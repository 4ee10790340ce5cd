// src/report.rs

/// 70-column banner matching the width of the orchestrator's own output.
pub const BANNER: &str =
    "======================================================================";

/// Framed failure report fed back to the requesting agent via stderr.
pub fn failure_report(agent: &str, error_lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(error_lines.len() + 10);
    out.push(BANNER.to_string());
    out.push("JSON SCHEMA VALIDATION FAILED".to_string());
    out.push(BANNER.to_string());
    out.push(String::new());
    out.push(format!("Agent: {agent}"));
    out.push(String::new());
    out.extend(error_lines.iter().cloned());
    out.push(BANNER.to_string());
    out.push("Please fix the validation errors and try again.".to_string());
    out.push("Refer to the schema file in .claude/schemas/ for requirements.".to_string());
    out.push(BANNER.to_string());
    out
}

pub fn success_line(count: usize) -> String {
    format!("✓ Validated {count} JSON file(s) successfully")
}
