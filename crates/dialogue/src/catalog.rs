//! The static question catalog.

use qaryz_core::Intent::{Consequences, Documentation, EligibilityCheck, HowToStart, SpecificProblem};
use qaryz_core::{Field, Intent};
use serde::Serialize;

/// One askable question.
#[derive(Debug, Clone, Copy)]
pub struct QuestionDescriptor {
    pub field: Field,
    pub prompt: &'static str,
    /// Alternate phrasings used when the question is asked again.
    pub variants: &'static [&'static str],
    /// Lower is asked sooner.
    pub priority: u8,
    /// Intents the question applies to; empty means every intent.
    pub intents: &'static [Intent],
}

impl QuestionDescriptor {
    pub fn applies_to(&self, intent: Intent) -> bool {
        self.intents.is_empty() || self.intents.contains(&intent)
    }

    /// Wording for the next ask, given how many times it was asked before.
    pub fn text_for_attempt(&self, times_asked: usize) -> &'static str {
        if times_asked == 0 || self.variants.is_empty() {
            self.prompt
        } else {
            self.variants[(times_asked - 1) % self.variants.len()]
        }
    }

    pub fn to_question(&self, times_asked: usize) -> Question {
        Question {
            field: self.field,
            question: self.text_for_attempt(times_asked).to_string(),
            priority: self.priority,
        }
    }
}

/// A question chosen for a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub field: Field,
    pub question: String,
    pub priority: u8,
}

pub static CATALOG: [QuestionDescriptor; 12] = [
    QuestionDescriptor {
        field: Field::DebtAmount,
        prompt: "Какая у вас общая сумма задолженности?",
        variants: &[
            "Подскажите, пожалуйста, примерную общую сумму долга в тенге.",
            "Сколько всего вы должны по всем кредитам и займам?",
        ],
        priority: 1,
        intents: &[EligibilityCheck, HowToStart, SpecificProblem],
    },
    QuestionDescriptor {
        field: Field::HasOverdue12Months,
        prompt: "Есть ли у вас просрочки по кредитам более 12 месяцев?",
        variants: &[
            "Как давно вы не платите по кредитам? Больше года?",
            "Просрочка по платежам уже превысила 12 месяцев?",
        ],
        priority: 2,
        intents: &[EligibilityCheck, HowToStart, SpecificProblem],
    },
    QuestionDescriptor {
        field: Field::MonthlyIncome,
        prompt: "Какой у вас ежемесячный доход?",
        variants: &["Сколько примерно вы получаете в месяц?"],
        priority: 3,
        intents: &[EligibilityCheck, Consequences],
    },
    QuestionDescriptor {
        field: Field::EmploymentType,
        prompt: "Вы работаете официально или неофициально? (госслужба/частная компания/ИП/пенсионер)",
        variants: &["Уточните, пожалуйста, где и как вы сейчас работаете?"],
        priority: 4,
        intents: &[EligibilityCheck, HowToStart, Documentation],
    },
    QuestionDescriptor {
        field: Field::HasProperty,
        prompt: "Есть ли у вас недвижимость в собственности (квартира, дом, доля)?",
        variants: &["Оформлена ли на вас какая-нибудь недвижимость: квартира, дом или доля?"],
        priority: 5,
        intents: &[EligibilityCheck, HowToStart, Consequences, Documentation],
    },
    QuestionDescriptor {
        field: Field::HasCar,
        prompt: "Есть ли у вас автомобиль в собственности?",
        variants: &["Зарегистрирован ли на вас автомобиль?"],
        priority: 6,
        intents: &[EligibilityCheck, Consequences],
    },
    QuestionDescriptor {
        field: Field::HasCollateral,
        prompt: "Есть ли у вас залоговое имущество (ипотека, автокредит)?",
        variants: &["Есть ли среди ваших кредитов ипотека или автокредит?"],
        priority: 7,
        intents: &[HowToStart, Documentation],
    },
    QuestionDescriptor {
        field: Field::CreditorsCount,
        prompt: "Сколько у вас кредиторов (банков, МФО)?",
        variants: &["Перед сколькими банками и МФО у вас долги?"],
        priority: 8,
        intents: &[HowToStart],
    },
    QuestionDescriptor {
        field: Field::HasWageArrest,
        prompt: "Удерживают ли у вас часть зарплаты по исполнительным документам?",
        variants: &["Производятся ли удержания из вашей зарплаты в пользу кредиторов?"],
        priority: 9,
        intents: &[],
    },
    QuestionDescriptor {
        field: Field::HasAccountArrest,
        prompt: "Арестованы ли ваши банковские счета или карты?",
        variants: &["Блокировал ли судебный исполнитель ваши счета или карты?"],
        priority: 10,
        intents: &[],
    },
    QuestionDescriptor {
        field: Field::HasCollectorPressure,
        prompt: "Беспокоят ли вас коллекторы?",
        variants: &["Звонят ли вам коллекторы по вашим долгам?"],
        priority: 11,
        intents: &[],
    },
    QuestionDescriptor {
        field: Field::PreviousRejection,
        prompt: "Подавали ли вы ранее заявление на банкротство и получали отказ?",
        variants: &["Был ли у вас раньше отказ в процедуре банкротства?"],
        priority: 12,
        intents: &[],
    },
];

pub fn descriptor(field: Field) -> Option<&'static QuestionDescriptor> {
    CATALOG.iter().find(|d| d.field == field)
}
