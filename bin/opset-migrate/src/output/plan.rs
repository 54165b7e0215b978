//! Migration plan formatting

use opset_primitives::{Address, OperatorSetAssignment, OperatorSetId};
use opset_service_manager::{BlockNumber, MigrationPlan};
use serde::Serialize;

use super::{
    helpers::{porcelain_field, porcelain_list},
    traits::Formattable,
};

/// Migration plan displayed to the user
#[derive(Debug, Serialize)]
pub(crate) struct PlanInfo {
    pub(crate) block: BlockNumber,
    pub(crate) operator_set_ids_to_create: Vec<OperatorSetId>,
    pub(crate) operators: Vec<OperatorAssignmentInfo>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OperatorAssignmentInfo {
    pub(crate) operator: Address,
    pub(crate) operator_set_ids: OperatorSetAssignment,
}

impl PlanInfo {
    pub(crate) fn new(block: BlockNumber, plan: &MigrationPlan) -> Self {
        let operators = plan
            .operators
            .iter()
            .zip(&plan.operator_set_ids)
            .map(|(operator, ids)| OperatorAssignmentInfo {
                operator: *operator,
                operator_set_ids: ids.clone(),
            })
            .collect();

        Self {
            block,
            operator_set_ids_to_create: plan.operator_set_ids_to_create.clone(),
            operators,
        }
    }

    /// Porcelain lines with every key under `prefix`.
    pub(crate) fn porcelain_lines(&self, prefix: &str) -> Vec<String> {
        let mut output = Vec::with_capacity(3 + 2 * self.operators.len());

        output.push(porcelain_field(&format!("{prefix}block"), self.block));
        output.push(porcelain_field(
            &format!("{prefix}operator_sets_to_create"),
            porcelain_list(&self.operator_set_ids_to_create),
        ));
        output.push(porcelain_field(
            &format!("{prefix}operator_count"),
            self.operators.len(),
        ));
        for (i, entry) in self.operators.iter().enumerate() {
            output.push(porcelain_field(
                &format!("{prefix}operator[{i}].address"),
                entry.operator,
            ));
            output.push(porcelain_field(
                &format!("{prefix}operator[{i}].operator_set_ids"),
                porcelain_list(&entry.operator_set_ids),
            ));
        }

        output
    }
}

impl Formattable for PlanInfo {
    fn format_porcelain(&self) -> String {
        self.porcelain_lines("").join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_porcelain() {
        let plan = MigrationPlan {
            operator_set_ids_to_create: vec![0, 1],
            operators: vec![Address::with_last_byte(0x10), Address::with_last_byte(0x20)],
            operator_set_ids: vec![vec![0], vec![0, 1]],
        };

        let rendered = PlanInfo::new(7, &plan).format_porcelain();

        assert_eq!(
            rendered,
            [
                "block: 7",
                "operator_sets_to_create: 0,1",
                "operator_count: 2",
                "operator[0].address: 0x0000000000000000000000000000000000000010",
                "operator[0].operator_set_ids: 0",
                "operator[1].address: 0x0000000000000000000000000000000000000020",
                "operator[1].operator_set_ids: 0,1",
            ]
            .join("\n")
        );
    }
}
