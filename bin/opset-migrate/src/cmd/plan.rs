use std::path::PathBuf;

use argh::FromArgs;
use opset_service_manager::{OperatorSetMigrator, RegistryCoordinator};

use super::load_snapshot;
use crate::{
    cli::OutputFormat,
    errors::{DisplayableError, DisplayedError},
    offline::DryRunDirectory,
    output::{output, plan::PlanInfo},
};

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "plan")]
/// Compute the operator-set migration for a registry snapshot
pub(crate) struct PlanArgs {
    /// path to the registry snapshot
    #[argh(positional)]
    pub(crate) snapshot: PathBuf,

    /// output format: "porcelain" (default) or "json"
    #[argh(option, short = 'o', default = "OutputFormat::Porcelain")]
    pub(crate) output_format: OutputFormat,
}

/// Prints the operator sets to create and every operator's assignment.
pub(crate) fn plan(args: PlanArgs) -> Result<(), DisplayedError> {
    let snapshot = load_snapshot(&args.snapshot)?;

    // Planning never touches the directory.
    let directory = DryRunDirectory::new();
    let plan = OperatorSetMigrator::new(&directory, &snapshot)
        .plan()
        .user_error("Snapshot cannot be migrated")?;

    let block = snapshot
        .current_block()
        .internal_error("Failed to read snapshot block")?;
    output(&PlanInfo::new(block, &plan), args.output_format)
}
