use std::path::Path;

use opset_service_manager::RegistrySnapshot;
use tracing::*;

use crate::errors::{DisplayableError, DisplayedError};

pub(crate) mod plan;
pub(crate) mod simulate;
pub(crate) mod strategies;

/// Loads and validates the registry snapshot at `path`.
pub(crate) fn load_snapshot(path: &Path) -> Result<RegistrySnapshot, DisplayedError> {
    let snapshot = RegistrySnapshot::load(path).user_error(format!(
        "Failed to load registry snapshot {}",
        path.display()
    ))?;

    debug!(
        path = %path.display(),
        block = snapshot.block(),
        quorums = snapshot.num_quorums(),
        operators = snapshot.num_operators(),
        "loaded registry snapshot"
    );
    Ok(snapshot)
}
