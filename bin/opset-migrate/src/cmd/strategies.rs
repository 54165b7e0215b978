use std::path::PathBuf;

use argh::FromArgs;
use opset_primitives::Address;
use opset_service_manager::RestakeableStrategyQuery;

use super::load_snapshot;
use crate::{
    cli::OutputFormat,
    errors::{DisplayableError, DisplayedError},
    output::{output, strategies::StrategiesInfo},
};

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "strategies")]
/// List restakeable strategies, for the whole service or for one operator
pub(crate) struct StrategiesArgs {
    /// path to the registry snapshot
    #[argh(positional)]
    pub(crate) snapshot: PathBuf,

    /// only list strategies of the quorums this operator is registered in
    #[argh(option)]
    pub(crate) operator: Option<Address>,

    /// output format: "porcelain" (default) or "json"
    #[argh(option, short = 'o', default = "OutputFormat::Porcelain")]
    pub(crate) output_format: OutputFormat,
}

pub(crate) fn get_strategies(args: StrategiesArgs) -> Result<(), DisplayedError> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let query = RestakeableStrategyQuery::new(&snapshot, &snapshot);

    let strategies = match args.operator {
        Some(operator) => query
            .operator_restaked_strategies(operator)
            .user_error(format!("Failed to get strategies of operator {operator}"))?,
        None => query
            .restakeable_strategies()
            .user_error("Failed to get restakeable strategies")?,
    };

    let info = StrategiesInfo {
        operator: args.operator,
        strategies,
    };
    output(&info, args.output_format)
}
