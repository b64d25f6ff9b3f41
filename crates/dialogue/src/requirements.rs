//! Which facts each intent needs before it can be answered.

use std::collections::BTreeMap;

use qaryz_config::DialogueConfig;
use qaryz_core::{Context, Field, Intent};
use serde::{Deserialize, Serialize};

/// Where the information-gathering stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Collecting,
    Complete,
    OfferingProducts,
    Error,
}

/// Bankruptcy procedure the debt qualifies for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Procedure {
    OutOfCourt,
    Judicial,
}

impl Procedure {
    pub fn label(self) -> &'static str {
        match self {
            Procedure::OutOfCourt => "внесудебное банкротство",
            Procedure::Judicial => "судебное банкротство",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStatus {
    pub phase: Phase,
    pub has_sufficient_info: bool,
    pub missing_critical: Vec<Field>,
    pub completion_percentage: f32,
    pub filled_count: usize,
    pub required_total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure: Option<Procedure>,
}

impl CompletionStatus {
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_procedure(mut self, procedure: Option<Procedure>) -> Self {
        self.procedure = procedure;
        self
    }

    /// Status reported for a turn that failed.
    pub fn failed() -> Self {
        Self {
            phase: Phase::Error,
            ..Default::default()
        }
    }
}

/// Intent → ordered required fields.
#[derive(Debug, Clone)]
pub struct RequirementSet {
    table: BTreeMap<Intent, Vec<Field>>,
}

impl Default for RequirementSet {
    fn default() -> Self {
        Self::from_config(&DialogueConfig::default())
    }
}

impl RequirementSet {
    pub fn new(table: BTreeMap<Intent, Vec<Field>>) -> Self {
        Self { table }
    }

    pub fn from_config(config: &DialogueConfig) -> Self {
        Self::new(config.requirement_table())
    }

    /// Required fields in declared order. Empty for an intent not in the table.
    pub fn required(&self, intent: Intent) -> &[Field] {
        self.table.get(&intent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn missing_fields(&self, ctx: &Context, intent: Intent) -> Vec<Field> {
        self.required(intent)
            .iter()
            .copied()
            .filter(|field| !ctx.is_known(*field))
            .collect()
    }

    /// Every required field is known. No partial credit.
    pub fn is_sufficient(&self, ctx: &Context, intent: Intent) -> bool {
        self.required(intent).iter().all(|field| ctx.is_known(*field))
    }

    pub fn analyze(&self, ctx: &Context, intent: Intent) -> CompletionStatus {
        let required_total = self.required(intent).len();
        let missing_critical = self.missing_fields(ctx, intent);
        let filled_count = required_total - missing_critical.len();
        let has_sufficient_info = missing_critical.is_empty();

        let completion_percentage = if required_total == 0 {
            100.0
        } else {
            filled_count as f32 / required_total as f32 * 100.0
        };

        CompletionStatus {
            phase: if has_sufficient_info { Phase::Complete } else { Phase::Collecting },
            has_sufficient_info,
            missing_critical,
            completion_percentage,
            filled_count,
            required_total,
            procedure: None,
        }
    }
}
