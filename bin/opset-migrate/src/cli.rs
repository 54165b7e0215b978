use std::{fmt, path::PathBuf, str::FromStr};

use argh::FromArgs;

use crate::cmd::{plan::PlanArgs, simulate::SimulateArgs, strategies::StrategiesArgs};

/// Offline planner for migrating quorum membership to operator sets
#[derive(FromArgs, Debug)]
pub(crate) struct Cli {
    /// path to the service config file (required by `simulate`)
    #[argh(option, short = 'c')]
    pub(crate) config: Option<PathBuf>,

    #[argh(subcommand)]
    pub(crate) cmd: Command,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
pub(crate) enum Command {
    Plan(PlanArgs),
    Strategies(StrategiesArgs),
    Simulate(SimulateArgs),
}

/// Output format of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// One `key: value` line per field.
    Porcelain,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "porcelain" => Ok(OutputFormat::Porcelain),
            other => Err(format!(
                "unknown output format '{other}', expected 'json' or 'porcelain'"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Porcelain => f.write_str("porcelain"),
        }
    }
}
