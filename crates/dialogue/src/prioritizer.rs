//! Picks the next question to ask.
//!
//! Deterministic for a given context, intent and message: the catalog is
//! static and message-driven re-ranking works on a per-turn copy.

use qaryz_config::DialogueConfig;
use qaryz_core::{Context, EmploymentType, Field, Intent};
use tracing::debug;

use crate::catalog::{CATALOG, Question, descriptor};
use crate::keywords::{INCOME_TOPIC, OVERDUE_TOPIC, PROPERTY_TOPIC};
use crate::requirements::RequirementSet;

#[derive(Debug, Clone)]
pub struct QuestionPrioritizer {
    requirements: RequirementSet,
    large_debt_threshold: u64,
}

impl Default for QuestionPrioritizer {
    fn default() -> Self {
        Self::from_config(&DialogueConfig::default())
    }
}

impl QuestionPrioritizer {
    pub fn new(requirements: RequirementSet, large_debt_threshold: u64) -> Self {
        Self {
            requirements,
            large_debt_threshold,
        }
    }

    pub fn from_config(config: &DialogueConfig) -> Self {
        Self::new(RequirementSet::from_config(config), config.large_debt_threshold)
    }

    pub fn requirements(&self) -> &RequirementSet {
        &self.requirements
    }

    /// Highest-priority applicable question for a missing required field.
    pub fn next_question(&self, ctx: &Context, intent: Intent) -> Option<Question> {
        let missing = self.requirements.missing_fields(ctx, intent);
        CATALOG
            .iter()
            .filter(|d| missing.contains(&d.field) && d.applies_to(intent))
            .min_by_key(|d| d.priority)
            .map(|d| d.to_question(ctx.times_asked(d.field)))
    }

    /// The intent's required fields, most urgent first.
    pub fn priority_list(&self, intent: Intent) -> Vec<Field> {
        let mut fields = self.requirements.required(intent).to_vec();
        // Stable sort keeps declared order among fields without a descriptor.
        fields.sort_by_key(|field| descriptor(*field).map_or(u8::MAX, |d| d.priority));
        fields
    }

    /// Promote fields the user's message is already talking about.
    pub fn reorder_by_message_content(&self, list: &[Field], message: &str) -> Vec<Field> {
        let lower = message.to_lowercase();
        let mut order = list.to_vec();

        if INCOME_TOPIC.matches_lowercase(&lower) {
            let had_employment = take(&mut order, Field::EmploymentType);
            let had_income = take(&mut order, Field::MonthlyIncome);
            if had_income {
                order.insert(0, Field::MonthlyIncome);
            }
            if had_employment {
                order.insert(0, Field::EmploymentType);
            }
        }

        if PROPERTY_TOPIC.matches_lowercase(&lower) {
            let had_property = take(&mut order, Field::HasProperty);
            let had_car = take(&mut order, Field::HasCar);
            let mut at = order.len().min(1);
            if had_property {
                order.insert(at, Field::HasProperty);
                at += 1;
            }
            if had_car {
                order.insert(at, Field::HasCar);
            }
        }

        if OVERDUE_TOPIC.matches_lowercase(&lower) && take(&mut order, Field::HasOverdue12Months) {
            order.insert(0, Field::HasOverdue12Months);
        }

        order
    }

    /// Like [`next_question`](Self::next_question), but ranked by what the
    /// message mentions.
    pub fn next_question_for_message(
        &self,
        ctx: &Context,
        intent: Intent,
        message: &str,
    ) -> Option<Question> {
        let order = self.reorder_by_message_content(&self.priority_list(intent), message);
        let picked = order
            .into_iter()
            .filter(|field| !ctx.is_known(*field))
            .find_map(|field| descriptor(field).filter(|d| d.applies_to(intent)))
            .map(|d| d.to_question(ctx.times_asked(d.field)));

        if let Some(question) = &picked {
            debug!(field = %question.field, intent = %intent, "Re-ranked next question");
        }
        picked.or_else(|| self.next_question(ctx, intent))
    }

    /// Whether a high-risk combination warrants one more question beyond the
    /// required set.
    pub fn should_ask_followup(&self, ctx: &Context, intent: Intent) -> bool {
        !self.escalation_fields(ctx, intent).is_empty()
    }

    /// The escalation question, if one is due and was never asked.
    pub fn followup_question(&self, ctx: &Context, intent: Intent) -> Option<Question> {
        self.escalation_fields(ctx, intent)
            .into_iter()
            .filter(|field| ctx.times_asked(*field) == 0)
            .find_map(descriptor)
            .map(|d| d.to_question(0))
    }

    fn escalation_fields(&self, ctx: &Context, intent: Intent) -> Vec<Field> {
        if intent != Intent::EligibilityCheck {
            return Vec::new();
        }

        let facts = &ctx.facts;
        let mut fields = Vec::new();
        if facts.debt_amount.is_some_and(|debt| debt > self.large_debt_threshold)
            && facts.has_property.is_none()
        {
            fields.push(Field::HasProperty);
        }
        if facts.employment_type == Some(EmploymentType::Government) && facts.has_wage_arrest.is_none() {
            fields.push(Field::HasWageArrest);
        }
        fields
    }
}

/// Remove `field` from `order`, reporting whether it was there.
fn take(order: &mut Vec<Field>, field: Field) -> bool {
    match order.iter().position(|f| *f == field) {
        Some(index) => {
            order.remove(index);
            true
        }
        None => false,
    }
}
