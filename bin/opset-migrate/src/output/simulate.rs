use opset_config::CollaboratorsConfig;
use opset_primitives::Address;
use serde::Serialize;

use super::{
    helpers::{porcelain_field, porcelain_list},
    plan::PlanInfo,
    traits::Formattable,
};
use crate::offline::DryRunCall;

/// Outcome of a simulated migration
#[derive(Debug, Serialize)]
pub(crate) struct SimulationInfo {
    pub(crate) service: Address,
    /// Collaborator addresses the simulated manager was configured with.
    pub(crate) collaborators: CollaboratorsConfig,
    pub(crate) plan: PlanInfo,
    pub(crate) calls: Vec<DryRunCall>,
}

fn call_detail(call: &DryRunCall) -> Option<String> {
    match call {
        DryRunCall::UpdateMetadataUri { uri } => Some(uri.clone()),
        DryRunCall::RegisterOperator { operator } | DryRunCall::DeregisterOperator { operator } => {
            Some(operator.to_string())
        }
        DryRunCall::BecomeOperatorSetAuthority => None,
        DryRunCall::CreateOperatorSets { operator_set_ids } => {
            Some(porcelain_list(operator_set_ids))
        }
        DryRunCall::MigrateOperators { operators, .. } => {
            Some(format!("{} operators", operators.len()))
        }
    }
}

impl Formattable for SimulationInfo {
    fn format_porcelain(&self) -> String {
        let wired = &self.collaborators;
        let mut output = vec![
            porcelain_field("service", self.service),
            porcelain_field("collaborators.directory", wired.directory),
            porcelain_field(
                "collaborators.rewards_coordinator",
                wired.rewards_coordinator,
            ),
            porcelain_field(
                "collaborators.registry_coordinator",
                wired.registry_coordinator,
            ),
            porcelain_field("collaborators.stake_registry", wired.stake_registry),
        ];
        output.extend(self.plan.porcelain_lines("plan."));

        output.push(porcelain_field("call_count", self.calls.len()));
        for (i, call) in self.calls.iter().enumerate() {
            let value = match call_detail(call) {
                Some(detail) => format!("{} {detail}", call.name()),
                None => call.name().to_string(),
            };
            output.push(porcelain_field(&format!("call[{i}]"), value));
        }

        output.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use opset_service_manager::MigrationPlan;

    use super::*;

    #[test]
    fn test_simulation_porcelain_lists_calls() {
        let info = SimulationInfo {
            service: Address::with_last_byte(0xa1),
            collaborators: CollaboratorsConfig {
                directory: Address::with_last_byte(0xc3),
                rewards_coordinator: Address::with_last_byte(0xc4),
                registry_coordinator: Address::with_last_byte(0xc5),
                stake_registry: Address::with_last_byte(0xc6),
            },
            plan: PlanInfo::new(3, &MigrationPlan::default()),
            calls: vec![
                DryRunCall::BecomeOperatorSetAuthority,
                DryRunCall::CreateOperatorSets {
                    operator_set_ids: vec![0, 1],
                },
            ],
        };

        let rendered = info.format_porcelain();

        assert!(rendered.contains(&format!(
            "collaborators.directory: {}",
            Address::with_last_byte(0xc3)
        )));
        assert!(rendered.contains(&format!(
            "collaborators.stake_registry: {}",
            Address::with_last_byte(0xc6)
        )));
        assert!(rendered.contains("plan.block: 3"));
        assert!(rendered.contains("call_count: 2"));
        assert!(rendered.contains("call[0]: become_operator_set_authority"));
        assert!(rendered.contains("call[1]: create_operator_sets 0,1"));
    }
}
