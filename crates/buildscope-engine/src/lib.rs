// Engine module - Tree reconstruction and on-demand analysis
// This layer sits between decoded log records (types) and CLI presentation

pub mod cmdline;
pub mod condition;
pub mod ingest;
pub mod reconstruct;
pub mod registry;
pub mod strings;

pub use cmdline::{CommandLine, CommandLineDiff, Parameter};
pub use condition::{ConditionNode, ConditionNodeKind, ConditionTree};
pub use ingest::ReconstructionWorker;
pub use reconstruct::{ReconstructOptions, Reconstructor, UnknownDataTally};
pub use registry::IdentifierRegistry;
pub use strings::StringTable;

use buildscope_types::{LogRecord, Result, Tree};

// Façade API - Stable public interface for CLI layer
// CLI should use these functions instead of driving the state machine directly

/// Rebuild the build tree from decoded records
pub fn reconstruct<I>(records: I, options: ReconstructOptions) -> Result<Tree>
where
    I: IntoIterator<Item = LogRecord>,
{
    reconstruct::reconstruct(records, options)
}

/// Rebuild the build tree from a JSON Lines document
pub fn reconstruct_jsonl(input: &str, options: ReconstructOptions) -> Result<Tree> {
    let records = buildscope_types::parse_records(input)?;
    reconstruct::reconstruct(records, options)
}

/// Explain a condition using its property-substituted form
pub fn explain_condition(unevaluated: &str, evaluated: &str) -> Result<ConditionTree> {
    condition::explain(unevaluated, evaluated)
}

/// Diff two command lines; `None` if either is blank
pub fn compare_command_lines(left: &str, right: &str) -> Option<CommandLineDiff> {
    cmdline::try_compare(left, right)
}
