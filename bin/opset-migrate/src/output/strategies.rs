use opset_primitives::Address;
use serde::Serialize;

use super::{helpers::porcelain_field, traits::Formattable};

/// Restakeable strategies displayed to the user
#[derive(Debug, Serialize)]
pub(crate) struct StrategiesInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) operator: Option<Address>,
    pub(crate) strategies: Vec<Address>,
}

impl Formattable for StrategiesInfo {
    fn format_porcelain(&self) -> String {
        let mut output = Vec::new();

        if let Some(operator) = &self.operator {
            output.push(porcelain_field("operator", operator));
        }
        output.push(porcelain_field("strategy_count", self.strategies.len()));
        for (i, strategy) in self.strategies.iter().enumerate() {
            output.push(porcelain_field(&format!("strategy[{i}]"), strategy));
        }

        output.join("\n")
    }
}
