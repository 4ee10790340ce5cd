// src/main.rs

use agent_json_guard::{hook, validate, SchemaRegistry, AGENT_ENV_VAR, EXIT_BLOCK, EXIT_PASS};
use clap::{Parser, Subcommand};
use std::{io::Read, path::PathBuf};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "agent-json-guard",
    version,
    about = "Validates agent-written JSON files against project schemas"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Validate one JSON file against its resolved schema and exit
    Check {
        file: PathBuf,
        /// Agent identity used for schema resolution
        #[arg(long, default_value = "unknown")]
        agent: String,
        /// Project root holding .claude/schemas (defaults to the current directory)
        #[arg(long)]
        project_dir: Option<PathBuf>,
    },
}

fn init_tracing() {
    // Diagnostics go to stderr; stdout stays a clean data channel.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let code = match cli.cmd {
        None => run_hook_mode(),
        Some(Cmd::Check { file, agent, project_dir }) => run_check(&file, &agent, project_dir),
    };
    std::process::exit(code);
}

/// Default mode: consume one hook event from stdin and report on stderr.
fn run_hook_mode() -> i32 {
    let mut raw = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut raw) {
        error!("failed to read stdin: {e}");
        return 1;
    }
    let outcome = hook::run_hook(&raw, std::env::var(AGENT_ENV_VAR).ok());
    for line in &outcome.report {
        eprintln!("{line}");
    }
    outcome.code
}

/// Manual mode for checking a single file outside any hook invocation.
fn run_check(file: &PathBuf, agent: &str, project_dir: Option<PathBuf>) -> i32 {
    let project_dir = project_dir
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let registry = SchemaRegistry::new(project_dir);
    let check = validate::validate_file(&registry, &file.to_string_lossy(), agent);
    if check.valid {
        println!("OK: {}", file.display());
        EXIT_PASS
    } else {
        for line in &check.messages {
            eprintln!("{line}");
        }
        EXIT_BLOCK
    }
}
