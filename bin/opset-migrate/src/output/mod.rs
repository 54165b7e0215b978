//! Rendering of command results.

pub(crate) mod helpers;
pub(crate) mod plan;
pub(crate) mod simulate;
pub(crate) mod strategies;
pub(crate) mod traits;

use serde::Serialize;

use self::traits::Formattable;
use crate::{
    cli::OutputFormat,
    errors::{DisplayableError, DisplayedError},
};

/// Writes `data` to stdout in the requested format.
pub(crate) fn output<T: Formattable + Serialize>(
    data: &T,
    format: OutputFormat,
) -> Result<(), DisplayedError> {
    let rendered = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).internal_error("Failed to serialize output")?
        }
        OutputFormat::Porcelain => data.format_porcelain(),
    };
    println!("{rendered}");
    Ok(())
}
