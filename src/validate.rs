// src/validate.rs

use crate::{registry::SchemaRegistry, resolver};
use jsonschema::{error::ValidationErrorKind, Draft};
use serde_json::Value;
use std::{fs, path::PathBuf};
use tracing::warn;

/// Itemized violations per file; anything beyond is folded into a
/// remainder count.
const MAX_REPORTED_VIOLATIONS: usize = 10;

/// Outcome of validating one candidate file.
#[derive(Clone, Debug)]
pub struct FileCheck {
    pub valid: bool,
    pub messages: Vec<String>,
}

impl FileCheck {
    fn pass() -> Self {
        Self { valid: true, messages: Vec::new() }
    }

    fn fail(messages: Vec<String>) -> Self {
        Self { valid: false, messages }
    }
}

/// Validate `path` (absolute, or relative to the registry's project dir)
/// against whatever schema resolves for it.
///
/// A file that does not exist, or that no schema claims, passes
/// vacuously. A resolver conflict is logged and carried as context on
/// failure but never fails a structurally valid file on its own.
pub fn validate_file(registry: &SchemaRegistry, path: &str, agent: &str) -> FileCheck {
    let mut target = PathBuf::from(path);
    if target.is_relative() {
        target = registry.project_dir().join(&target);
    }
    if !target.exists() {
        return FileCheck::pass();
    }

    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();

    let resolution = resolver::resolve(registry, &filename, agent);
    let Some(schema_name) = resolution.schema else {
        return FileCheck::pass();
    };

    let mut messages = Vec::new();
    if let Some(conflict) = &resolution.conflict {
        warn!("{}", conflict.message());
        messages.push(conflict.message());
    }

    let Some(schema) = registry.load_schema(&schema_name) else {
        messages.push(format!("Could not load schema: {schema_name}"));
        return FileCheck::fail(messages);
    };

    let text = match fs::read_to_string(&target) {
        Ok(t) => t,
        Err(e) => {
            messages.push(format!("Error reading {filename}: {e}"));
            return FileCheck::fail(messages);
        }
    };

    let data: Value = match serde_json::from_str(&text) {
        Ok(d) => d,
        Err(e) => {
            messages.push(format!("Invalid JSON syntax in {filename}:"));
            messages.push(format!(
                "  Line {}, Column {}: {}",
                e.line(),
                e.column(),
                strip_position(&e.to_string())
            ));
            return FileCheck::fail(messages);
        }
    };

    let validator = match jsonschema::options().with_draft(Draft::Draft7).build(&schema) {
        Ok(v) => v,
        Err(e) => {
            messages.push(format!("Validation error: {e}"));
            return FileCheck::fail(messages);
        }
    };

    let mut violations: Vec<Violation> =
        validator.iter_errors(&data).map(Violation::from_error).collect();
    if violations.is_empty() {
        return FileCheck::pass();
    }

    // Deterministic report order regardless of keyword evaluation order.
    violations.sort_by(|a, b| pointer_cmp(&a.pointer, &b.pointer));

    messages.push(format!(
        "Schema validation failed for {filename} (schema: {schema_name}):"
    ));
    messages.push(String::new());
    for (i, v) in violations.iter().take(MAX_REPORTED_VIOLATIONS).enumerate() {
        messages.push(format!("  {}. At {}:", i + 1, v.location));
        messages.push(format!("     {}", v.message));
        if let Some(extra) = &v.extra {
            messages.push(format!("     {extra}"));
        }
        messages.push(String::new());
    }
    if violations.len() > MAX_REPORTED_VIOLATIONS {
        messages.push(format!(
            "  ... and {} more errors",
            violations.len() - MAX_REPORTED_VIOLATIONS
        ));
    }
    FileCheck::fail(messages)
}

struct Violation {
    pointer: String,
    location: String,
    message: String,
    extra: Option<String>,
}

impl Violation {
    fn from_error(err: jsonschema::ValidationError<'_>) -> Self {
        let pointer = err.instance_path.to_string();
        let location = pointer_display(&pointer);
        let extra = match &err.kind {
            ValidationErrorKind::Required { .. } => {
                Some(format!("Missing required field(s): {err}"))
            }
            ValidationErrorKind::Pattern { pattern } => {
                Some(format!("Value does not match pattern: {pattern}"))
            }
            ValidationErrorKind::Enum { options } => Some(format!("Allowed values: {options}")),
            _ => None,
        };
        let message = err.to_string();
        Self { pointer, location, message, extra }
    }
}

/// Compare JSON Pointers element-wise, with numeric segments ordered as
/// integers so `/tasks/2` sorts before `/tasks/10`.
fn pointer_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    let mut xs = a.split('/').skip(1);
    let mut ys = b.split('/').skip(1);
    loop {
        match (xs.next(), ys.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<usize>(), y.parse::<usize>()) {
                    (Ok(i), Ok(j)) => i.cmp(&j),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Render a JSON Pointer as `root.field[0].subfield`. A segment that
/// parses as an unsigned integer is treated as an array index.
fn pointer_display(pointer: &str) -> String {
    let mut out = String::from("root");
    for seg in pointer.split('/').skip(1) {
        let seg = seg.replace("~1", "/").replace("~0", "~");
        if seg.parse::<usize>().is_ok() {
            out.push('[');
            out.push_str(&seg);
            out.push(']');
        } else {
            out.push('.');
            out.push_str(&seg);
        }
    }
    out
}

/// serde_json appends ` at line .. column ..` to its messages; the
/// position is printed separately, so drop the suffix.
fn strip_position(msg: &str) -> &str {
    msg.split(" at line ").next().unwrap_or(msg)
}
