use std::{path::PathBuf, sync::Arc};

use argh::FromArgs;
use opset_config::Config;
use opset_service_manager::{Collaborators, RegistryCoordinator, ServiceManager};
use tracing::*;

use super::load_snapshot;
use crate::{
    cli::OutputFormat,
    errors::{DisplayableError, DisplayedError},
    offline::{DryRunDirectory, OfflineRewardsCoordinator, OfflineTokenLedger},
    output::{output, plan::PlanInfo, simulate::SimulationInfo},
};

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "simulate")]
/// Run the migration as the configured owner and print the directory calls it makes
pub(crate) struct SimulateArgs {
    /// path to the registry snapshot
    #[argh(positional)]
    pub(crate) snapshot: PathBuf,

    /// output format: "porcelain" (default) or "json"
    #[argh(option, short = 'o', default = "OutputFormat::Porcelain")]
    pub(crate) output_format: OutputFormat,
}

pub(crate) fn simulate(config: Option<&Config>, args: SimulateArgs) -> Result<(), DisplayedError> {
    let config = config.ok_or_else(|| {
        DisplayedError::UserError(
            "The simulate command needs a service config (-c)".to_string(),
            Box::new(()),
        )
    })?;

    let snapshot = Arc::new(load_snapshot(&args.snapshot)?);
    let block = snapshot
        .current_block()
        .internal_error("Failed to read snapshot block")?;
    let directory = Arc::new(DryRunDirectory::new());

    let collaborators = Collaborators {
        directory: directory.clone(),
        rewards_coordinator: Arc::new(OfflineRewardsCoordinator::new(
            config.collaborators.rewards_coordinator,
        )),
        tokens: Arc::new(OfflineTokenLedger),
        registry: snapshot.clone(),
        stake_registry: snapshot,
    };
    let mut manager = ServiceManager::from_config(config, collaborators);

    info!(owner = %config.service.owner, %block, "simulating migration");
    let plan = manager
        .migrate_and_create_operator_sets(config.service.owner)
        .user_error("Simulated migration failed")?;

    let info = SimulationInfo {
        service: manager.address(),
        collaborators: config.collaborators.clone(),
        plan: PlanInfo::new(block, &plan),
        calls: directory.calls(),
    };
    output(&info, args.output_format)
}
