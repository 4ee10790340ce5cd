// src/transcript.rs

use regex::Regex;
use std::{collections::BTreeSet, fs, path::Path};
use tracing::warn;

/// Kind of tool operation that produced a candidate path. The transcript
/// pattern keys on the `file_path` argument shared by write and edit
/// tools, so edits surface as writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileOp {
    Write,
}

/// A JSON file discovered in the transcript, deduplicated by value.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Candidate {
    pub op: FileOp,
    pub path: String,
}

/// Extract candidate JSON files from a transcript on disk.
/// A missing transcript is not an error; it simply means nothing to check.
pub fn scan_transcript(path: &Path) -> Vec<Candidate> {
    if !path.exists() {
        return Vec::new();
    }
    match fs::read_to_string(path) {
        Ok(content) => scan_transcript_text(&content),
        Err(e) => {
            warn!("could not parse transcript: {e}");
            Vec::new()
        }
    }
}

/// Extract every `"file_path": ".../*.json"` occurrence from transcript
/// text and keep the relevant ones.
pub fn scan_transcript_text(content: &str) -> Vec<Candidate> {
    let file_pattern = Regex::new(r#""file_path"\s*:\s*"([^"]+\.json)""#).unwrap();

    let mut seen = BTreeSet::new();
    for cap in file_pattern.captures_iter(content) {
        let path = cap.get(1).unwrap().as_str();
        if is_relevant(path) {
            seen.insert(Candidate { op: FileOp::Write, path: path.to_string() });
        }
    }
    seen.into_iter().collect()
}

/// Allow-list relevance filter. Noise directories and lockfiles are
/// rejected first; anything left must still match an include rule to
/// survive.
fn is_relevant(path: &str) -> bool {
    let exclude = Regex::new(
        r"node_modules/|\.next/|dist/|build/|target/|\.git/|package-lock\.json$|pnpm-lock\.json$|yarn\.lock$",
    )
    .unwrap();
    if exclude.is_match(path) {
        return false;
    }

    let include = Regex::new(
        r"tasks/.*\.json$|\.claude/schemas/.*\.json$|[^/]+_TaskList\.json$|[^/]+_plan\.json$|[^/]+_CodebaseAnalysis\.json$",
    )
    .unwrap();
    include.is_match(path)
}
