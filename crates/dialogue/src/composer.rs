//! Final answer assembly: fact summary, procedure classification and the
//! generated consultation.

use qaryz_config::DialogueConfig;
use qaryz_core::facts::group_thousands;
use qaryz_core::{AnswerGenerator, Context, Field, Intent};
use tracing::warn;

use crate::requirements::Procedure;

/// Shown instead of the narrative when the answer generator fails.
pub const GENERATION_APOLOGY: &str = "Извините, сейчас не удалось подготовить подробную консультацию. \
     Попробуйте задать вопрос ещё раз чуть позже.";

const SUMMARY_HEADER: &str = "Ваша ситуация:";

/// Always listed in the summary, with a placeholder when unknown.
const CORE_SUMMARY: [Field; 7] = [
    Field::DebtAmount,
    Field::HasOverdue12Months,
    Field::MonthlyIncome,
    Field::EmploymentType,
    Field::HasProperty,
    Field::HasCar,
    Field::HasCollateral,
];

/// Listed only when known.
const EXTRA_SUMMARY: [Field; 7] = [
    Field::CollateralType,
    Field::IncomeStability,
    Field::CreditorsCount,
    Field::HasCollectorPressure,
    Field::HasAccountArrest,
    Field::HasWageArrest,
    Field::PreviousRejection,
];

#[derive(Debug, Clone)]
pub struct AnswerComposer {
    monthly_calculation_index: u64,
    out_of_court_mci_multiplier: u64,
}

impl Default for AnswerComposer {
    fn default() -> Self {
        Self::from_config(&DialogueConfig::default())
    }
}

impl AnswerComposer {
    pub fn new(monthly_calculation_index: u64, out_of_court_mci_multiplier: u64) -> Self {
        Self {
            monthly_calculation_index,
            out_of_court_mci_multiplier,
        }
    }

    pub fn from_config(config: &DialogueConfig) -> Self {
        Self::new(config.monthly_calculation_index, config.out_of_court_mci_multiplier)
    }

    /// Largest debt, in tenge, that still qualifies for the out-of-court procedure.
    pub fn out_of_court_limit(&self) -> u64 {
        self.out_of_court_mci_multiplier
            .saturating_mul(self.monthly_calculation_index)
    }

    /// `None` while the debt amount is unknown.
    pub fn classify(&self, ctx: &Context) -> Option<Procedure> {
        let debt = ctx.facts.debt_amount?;
        Some(if debt <= self.out_of_court_limit() {
            Procedure::OutOfCourt
        } else {
            Procedure::Judicial
        })
    }

    pub fn summary_block(&self, ctx: &Context) -> String {
        let mut lines = vec![SUMMARY_HEADER.to_string()];
        for field in CORE_SUMMARY {
            let value = ctx
                .facts
                .get(field)
                .map_or_else(|| field.unknown_placeholder().to_string(), |v| v.to_string());
            lines.push(format!("- {}: {value}", field.label()));
        }
        for field in EXTRA_SUMMARY {
            if let Some(value) = ctx.facts.get(field) {
                lines.push(format!("- {}: {value}", field.label()));
            }
        }
        lines.join("\n")
    }

    pub fn classification_line(&self, ctx: &Context) -> Option<String> {
        let procedure = self.classify(ctx)?;
        let comparison = match procedure {
            Procedure::OutOfCourt => "не превышает",
            Procedure::Judicial => "превышает",
        };
        Some(format!(
            "Тип процедуры: {} (долг {comparison} {} МРП = {} тенге)",
            procedure.label(),
            self.out_of_court_mci_multiplier,
            group_thousands(self.out_of_court_limit()),
        ))
    }

    /// The brief handed to the answer generator.
    pub fn structured_query(&self, ctx: &Context, intent: Intent, message: &str) -> String {
        let mut query = String::from("КОНСУЛЬТАЦИЯ ПО БАНКРОТСТВУ - СТРУКТУРИРОВАННЫЕ ДАННЫЕ:\n\n");
        query.push_str(&self.summary_block(ctx));
        if let Some(line) = self.classification_line(ctx) {
            query.push('\n');
            query.push_str(&line);
        }
        query.push_str(&format!(
            "\n\nЗапрос клиента: {}\nИсходное сообщение: {message}\n\n\
             Определи правильный тип банкротства и создай развернутую консультацию согласно документации.",
            intent.description()
        ));
        query
    }

    /// Summary, classification, blank line, narrative.
    pub fn compose(&self, ctx: &Context, narrative: &str) -> String {
        let mut out = self.summary_block(ctx);
        if let Some(line) = self.classification_line(ctx) {
            out.push('\n');
            out.push_str(&line);
        }
        out.push_str("\n\n");
        out.push_str(narrative.trim());
        out
    }

    /// Ask `generator` for the narrative and assemble the final answer.
    /// Generator failures are replaced by [`GENERATION_APOLOGY`].
    pub async fn compose_answer(
        &self,
        ctx: &Context,
        intent: Intent,
        message: &str,
        generator: &dyn AnswerGenerator,
    ) -> String {
        let query = self.structured_query(ctx, intent, message);
        let narrative = match generator.generate_answer(&query).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => GENERATION_APOLOGY.to_string(),
            Err(e) => {
                warn!(error = %e, "Answer generation failed");
                GENERATION_APOLOGY.to_string()
            }
        };
        self.compose(ctx, &narrative)
    }
}
