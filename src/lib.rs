pub mod hook;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod transcript;
pub mod validate;

pub use hook::{run_hook, HookInput, HookOutcome, AGENT_ENV_VAR, EXIT_BLOCK, EXIT_PASS};
pub use registry::SchemaRegistry;
pub use resolver::{resolve, Conflict, Resolution};
pub use transcript::{Candidate, FileOp};
pub use validate::{validate_file, FileCheck};
