//! Migration of quorum membership to operator sets.
//!
//! Each quorum `q` becomes operator set `q`. An operator registered in quorums `{0, 2}` ends up
//! in operator sets `[0, 2]`. The migration walks every quorum's operator snapshot, folds the
//! resolved addresses into one sorted, duplicate-free operator list, decodes each operator's
//! current membership bitmap and hands the result to the directory in two batch calls.

use std::fmt;

use opset_primitives::{
    Address, OperatorSetAssignment, OperatorSetId, QuorumBitmap, QuorumNumber,
    MAX_QUORUM_COUNT,
};
use serde::{Deserialize, Serialize};
use tracing::*;

use crate::{
    errors::{MalformedInputError, ServiceManagerError},
    merge::{is_strictly_ascending, merge_sorted_unique},
    traits::{
        BlockNumber, Collaborator, CollaboratorError, OperatorSetDirectory, RegistryCoordinator,
    },
};

/// Everything the directory needs to recreate the quorum memberships as operator sets.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    /// Operator sets to create, one per quorum, ascending.
    pub operator_set_ids_to_create: Vec<OperatorSetId>,

    /// Every operator registered in at least one quorum, strictly ascending.
    pub operators: Vec<Address>,

    /// `operator_set_ids[i]` lists the operator sets `operators[i]` joins, ascending.
    pub operator_set_ids: Vec<OperatorSetAssignment>,
}

impl MigrationPlan {
    pub fn is_empty(&self) -> bool {
        self.operator_set_ids_to_create.is_empty() && self.operators.is_empty()
    }

    /// Returns the assignment computed for `operator`, if it was part of any snapshot.
    pub fn assignment_of(&self, operator: &Address) -> Option<&OperatorSetAssignment> {
        self.operators
            .binary_search(operator)
            .ok()
            .map(|idx| &self.operator_set_ids[idx])
    }
}

/// Decodes a membership bitmap into the operator sets the operator belongs to.
pub fn assignment_from_bitmap(bitmap: &QuorumBitmap) -> OperatorSetAssignment {
    bitmap.iter().map(OperatorSetId::from).collect()
}

/// Reads the registry's quorum count, rejecting counts the bitmap cannot represent.
pub(crate) fn checked_quorum_count(
    registry: &dyn RegistryCoordinator,
) -> Result<QuorumNumber, CollaboratorError> {
    let count = registry.quorum_count()?;
    if count as usize > MAX_QUORUM_COUNT {
        return Err(CollaboratorError::new(
            Collaborator::RegistryCoordinator,
            "quorum_count",
            format!("reported {count} quorums, at most {MAX_QUORUM_COUNT} are supported"),
        ));
    }
    Ok(count)
}

/// Reads `operator`'s current bitmap, rejecting memberships in quorums the registry does not have.
pub(crate) fn checked_bitmap(
    registry: &dyn RegistryCoordinator,
    operator: Address,
    quorum_count: QuorumNumber,
) -> Result<QuorumBitmap, CollaboratorError> {
    let operator_id = registry.operator_id(operator)?;
    let bitmap = registry.current_bitmap(operator_id)?;

    if let Some(quorum) = bitmap.iter().find(|q| *q >= quorum_count) {
        return Err(CollaboratorError::new(
            Collaborator::RegistryCoordinator,
            "current_bitmap",
            format!("operator {operator} is in quorum {quorum} but only {quorum_count} exist"),
        ));
    }
    Ok(bitmap)
}

/// Orchestrates the migration against the directory and the registry.
pub struct OperatorSetMigrator<'a> {
    directory: &'a dyn OperatorSetDirectory,
    registry: &'a dyn RegistryCoordinator,
}

impl fmt::Debug for OperatorSetMigrator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorSetMigrator").finish_non_exhaustive()
    }
}

impl<'a> OperatorSetMigrator<'a> {
    pub fn new(
        directory: &'a dyn OperatorSetDirectory,
        registry: &'a dyn RegistryCoordinator,
    ) -> Self {
        Self {
            directory,
            registry,
        }
    }

    /// Computes the migration without calling the directory.
    #[instrument(skip_all, fields(component = "migration"))]
    pub fn plan(&self) -> Result<MigrationPlan, ServiceManagerError> {
        let quorum_count = checked_quorum_count(self.registry)?;
        let block = self.registry.current_block()?;

        let mut operators: Vec<Address> = Vec::new();
        for quorum in 0..quorum_count {
            let quorum_operators = self.quorum_addresses(quorum, block)?;
            debug!(%quorum, %block, count = quorum_operators.len(), "folding quorum snapshot");
            operators = merge_sorted_unique(&operators, &quorum_operators);
        }

        // Memberships are read once, after every quorum has been folded.
        let mut operator_set_ids = Vec::with_capacity(operators.len());
        for operator in &operators {
            let bitmap = checked_bitmap(self.registry, *operator, quorum_count)?;
            trace!(%operator, ?bitmap, "decoded membership");
            operator_set_ids.push(assignment_from_bitmap(&bitmap));
        }

        let plan = MigrationPlan {
            operator_set_ids_to_create: (0..quorum_count).map(OperatorSetId::from).collect(),
            operators,
            operator_set_ids,
        };

        info!(
            operator_sets = plan.operator_set_ids_to_create.len(),
            operators = plan.operators.len(),
            %block,
            "computed migration plan"
        );
        Ok(plan)
    }

    /// Switches the service to operator sets and recreates every quorum as one.
    ///
    /// The directory is told the service is an operator-set authority before anything is read.
    /// That call is not undone if a later step fails.
    #[instrument(skip_all, fields(component = "migration"))]
    pub fn migrate_and_create_operator_sets(&self) -> Result<MigrationPlan, ServiceManagerError> {
        self.directory.become_operator_set_authority()?;
        info!("service is now an operator-set authority");

        let plan = self.plan()?;

        if !plan.operator_set_ids_to_create.is_empty() {
            self.directory
                .create_operator_sets(&plan.operator_set_ids_to_create)?;
        }
        if !plan.operators.is_empty() {
            self.directory
                .migrate_operators(&plan.operators, &plan.operator_set_ids)?;
        }

        info!(
            operator_sets = plan.operator_set_ids_to_create.len(),
            operators = plan.operators.len(),
            "migrated quorums to operator sets"
        );
        Ok(plan)
    }

    /// Migrates an explicit batch of operators to the given operator sets.
    #[instrument(skip_all, fields(component = "migration", operators = operators.len()))]
    pub fn migrate_to_operator_sets(
        &self,
        operator_set_ids: &[OperatorSetAssignment],
        operators: &[Address],
    ) -> Result<(), ServiceManagerError> {
        if operator_set_ids.len() != operators.len() {
            return Err(MalformedInputError::LengthMismatch {
                operators: operators.len(),
                operator_set_ids: operator_set_ids.len(),
            }
            .into());
        }
        if operators.is_empty() {
            debug!("nothing to migrate");
            return Ok(());
        }

        self.directory.migrate_operators(operators, operator_set_ids)?;
        Ok(())
    }

    /// Resolves a quorum's snapshot to addresses, checking the registry kept them sorted.
    fn quorum_addresses(
        &self,
        quorum: QuorumNumber,
        block: BlockNumber,
    ) -> Result<Vec<Address>, CollaboratorError> {
        let operator_ids = self.registry.operator_snapshot(quorum, block)?;
        let addresses = operator_ids
            .into_iter()
            .map(|id| self.registry.resolve_address(id))
            .collect::<Result<Vec<_>, _>>()?;

        if !is_strictly_ascending(&addresses) {
            return Err(CollaboratorError::new(
                Collaborator::RegistryCoordinator,
                "operator_snapshot",
                format!("operators of quorum {quorum} are not in strictly ascending order"),
            ));
        }
        Ok(addresses)
    }
}
