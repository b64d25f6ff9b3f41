//! Next-steps and services message sent after a consultation was given.

use qaryz_core::Context;

use crate::keywords::{FOLLOWUP_HELP, FOLLOWUP_PLAN};

const SERVICES: &str = "\
🎁 СПЕЦИАЛЬНЫЕ ПРЕДЛОЖЕНИЯ:

✅ БЕСПЛАТНАЯ консультация
   → Персональный разбор вашей ситуации
   → План действий на 30 дней

📚 Полный курс по банкротству
   → Пошаговые инструкции
   → Образцы документов
   → Поддержка экспертов

📖 Учебник по банкротству в Казахстане
   → Все законы и процедуры
   → Реальные кейсы
   → Актуальная информация";

/// Build the offer for a "what now?" message.
///
/// A plan request for a debt above `escalation_threshold` gets an extra
/// line stressing that the case needs a firm plan.
pub fn followup_offer(message: &str, ctx: &Context, escalation_threshold: u64) -> String {
    let lower = message.to_lowercase();
    let mut parts: Vec<String> = Vec::new();

    if FOLLOWUP_PLAN.matches_lowercase(&lower) {
        parts.push(
            "Теперь, когда вы понимаете свою ситуацию с банкротством, рекомендую следующие шаги:".into(),
        );
        if ctx.facts.debt_amount.is_some_and(|debt| debt > escalation_threshold) {
            parts.push("🎯 Учитывая значительную сумму долга, важно действовать по четкому плану.".into());
        }
        parts.push(
            "📋 Рекомендованный план действий:\n\
             1️⃣ Получите персональную консультацию юриста\n\
             2️⃣ Изучите процедуру банкротства подробнее\n\
             3️⃣ Подготовьте необходимые документы"
                .into(),
        );
    } else if FOLLOWUP_HELP.matches_lowercase(&lower) {
        parts.push("Я готов помочь вам с дальнейшими шагами!".into());
        parts.push("📞 Для персонального плана действий рекомендую:".into());
    } else {
        parts.push("Отлично! Теперь можно переходить к практическим шагам.".into());
    }

    parts.push("=".repeat(40));
    parts.push(SERVICES.into());
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with_debt(debt: u64) -> Context {
        let mut ctx = Context::default();
        ctx.facts.debt_amount = Some(debt);
        ctx
    }

    #[test]
    fn plan_branch_escalates_for_large_debt() {
        let text = followup_offer("что дальше?", &ctx_with_debt(3_000_000), 1_000_000);
        assert!(text.starts_with("Теперь, когда вы понимаете"));
        assert!(text.contains("значительную сумму долга"));
        assert!(text.contains("БЕСПЛАТНАЯ консультация"));
    }

    #[test]
    fn plan_branch_without_escalation() {
        let text = followup_offer("план действий", &ctx_with_debt(1_000_000), 1_000_000);
        assert!(!text.contains("значительную сумму долга"));
        assert!(text.contains("Рекомендованный план действий"));
    }

    #[test]
    fn help_branch() {
        let text = followup_offer("Посоветуйте, куда идти", &Context::default(), 1_000_000);
        assert!(text.starts_with("Я готов помочь"));
    }

    #[test]
    fn other_branch_still_lists_services() {
        let text = followup_offer("куда обращаться", &Context::default(), 1_000_000);
        assert!(text.starts_with("Отлично!"));
        assert!(text.ends_with("Актуальная информация"));
    }
}
