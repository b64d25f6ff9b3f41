//! Model-backed fact extraction.

use std::sync::Arc;

use async_trait::async_trait;
use qaryz_core::error::ExtractionError;
use qaryz_core::{
    CollateralType, Context, EmploymentType, ExtractionResult, ExtractionSource, FactValue, Field,
    FieldExtractor, IncomeStability, Intent, Message, Provider, ProviderRequest,
};
use serde_json::Value;
use tracing::debug;

const EXTRACTION_RULES: &str = r#"Ты эксперт по анализу сообщений о банкротстве в Казахстане.
Твоя задача - извлечь структурированные данные из сообщения пользователя.

ПРАВИЛА ИЗВЛЕЧЕНИЯ:

1. СУММЫ ДОЛГОВ:
   - "5 млн", "5 миллионов", "5000000" → 5000000
   - "200к", "200 тысяч", "200000" → 200000
   - "полтора миллиона", "1.5 млн" → 1500000

2. ПРОСРОЧКИ:
   - "не плачу год", "просрочка 12 месяцев" → hasOverdue12Months: true
   - "не плачу 6 месяцев", "просрочка 8 месяцев" → hasOverdue12Months: false
   - "просрочка полтора года" → hasOverdue12Months: true

3. ТРУДОУСТРОЙСТВО:
   - "работаю официально", "белая зарплата" → employmentType: "official"
   - "работаю неофициально", "серая зарплата" → employmentType: "unofficial"
   - "госслужба", "работаю в госорганах" → employmentType: "government"
   - "пенсионер" → employmentType: "retired"
   - "безработный", "не работаю" → employmentType: "unemployed"
   - "ИП", "предприниматель" → employmentType: "self_employed"
   - "в декрете", "декретный отпуск", "сижу с ребенком" → employmentType: "maternity_leave", monthlyIncome: 70000

4. ДОХОДЫ:
   - "зарплата 200 тысяч" → monthlyIncome: 200000
   - "доход нестабильный" → incomeStability: "unstable"

5. ИМУЩЕСТВО:
   - "есть квартира", "своя недвижимость" → hasProperty: true
   - "есть машина", "автомобиль в собственности" → hasCar: true
   - "ипотека" → hasCollateral: true, collateralType: "mortgage"
   - "автокредит" → hasCar: true, hasCollateral: true, collateralType: "auto_loan"

6. СПЕЦИАЛЬНЫЕ СИТУАЦИИ:
   - "коллекторы звонят" → hasCollectorPressure: true
   - "арестован счет", "заблокировали карту", "ЧСИ арестовал счета" → hasAccountArrest: true
   - "удерживают с зарплаты" → hasWageArrest: true
   - "отказ пришел", "отклонили заявление" → previousRejection: true

7. НАМЕРЕНИЯ (intent):
   - "подхожу ли", "могу ли" → "eligibility_check"
   - "как начать", "с чего начать" → "how_to_start"
   - "какие документы" → "documentation"
   - "что будет после", "последствия" → "consequences"
   - конкретные проблемы → "specific_problem"

8. ИСПРАВЛЕНИЯ:
   - если пользователь явно исправляет ранее названное значение ("на самом деле", "ошибся"),
     перечисли такие поля в "corrections".

Если значение не упомянуто, ставь null. Не выдумывай данные.

Верни JSON в формате:
{
  "extracted_data": {
    "debtAmount": число_или_null,
    "hasOverdue12Months": true_false_или_null,
    "monthlyIncome": число_или_null,
    "employmentType": "строка_или_null",
    "incomeStability": "stable/unstable/null",
    "hasProperty": true_false_или_null,
    "hasCar": true_false_или_null,
    "hasCollateral": true_false_или_null,
    "collateralType": "mortgage/auto_loan/other/null",
    "hasCollectorPressure": true_false_или_null,
    "hasAccountArrest": true_false_или_null,
    "hasWageArrest": true_false_или_null,
    "previousRejection": true_false_или_null,
    "creditorsCount": число_или_null
  },
  "intent": "eligibility_check/how_to_start/documentation/consequences/specific_problem",
  "confidence": { "имя_поля": 0.0_to_1.0 },
  "corrections": ["имя_поля"],
  "user_situation": "краткое_описание_ситуации_пользователя"
}

ВАЖНО: Возвращай ТОЛЬКО валидный JSON, без дополнительного текста!"#;

/// Extracts facts by asking a language model for a JSON object.
pub struct LlmExtractor {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
}

impl LlmExtractor {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn request(&self, message: &str, prior: &Context) -> ProviderRequest {
        let known = serde_json::to_string_pretty(&prior.to_snapshot()).unwrap_or_else(|_| "{}".into());
        let user = format!(
            "СООБЩЕНИЕ ПОЛЬЗОВАТЕЛЯ: {message}\n\nКОНТЕКСТ ПРЕДЫДУЩИХ ДАННЫХ: {known}"
        );

        ProviderRequest::new(
            &self.model,
            vec![Message::system(EXTRACTION_RULES), Message::user(user)],
        )
        .with_temperature(self.temperature)
        .with_json_mode()
    }
}

#[async_trait]
impl FieldExtractor for LlmExtractor {
    fn name(&self) -> &str {
        "llm"
    }

    async fn extract(&self, message: &str, prior: &Context) -> Result<ExtractionResult, ExtractionError> {
        let response = self.provider.complete(self.request(message, prior)).await?;
        let result = parse_extraction(&response.message.content, prior)?;
        debug!(
            fields = ?result.fields.known_fields(),
            intent = %result.intent,
            "Model extraction"
        );
        Ok(result)
    }
}

/// Read the model's reply.
///
/// Tolerates prose around the JSON object, numbers sent as strings,
/// booleans sent as `"да"`/`"нет"`, and unknown enum values (dropped).
pub fn parse_extraction(raw: &str, prior: &Context) -> Result<ExtractionResult, ExtractionError> {
    let body = json_object_slice(raw)
        .ok_or_else(|| ExtractionError::Malformed("no JSON object in reply".into()))?;
    let root: Value = serde_json::from_str(body).map_err(|e| ExtractionError::Malformed(e.to_string()))?;

    let data = root
        .get("extracted_data")
        .and_then(Value::as_object)
        .ok_or_else(|| ExtractionError::Malformed("missing extracted_data".into()))?;

    let mut result = ExtractionResult {
        source: ExtractionSource::Llm,
        intent: root
            .get("intent")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Intent>().ok())
            .or(prior.user_intent)
            .unwrap_or_default(),
        situation: root
            .get("user_situation")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        ..Default::default()
    };

    for field in Field::ALL {
        if let Some(value) = data.get(field.as_str()).and_then(|v| fact_value(field, v)) {
            result.fields.set(field, value);
        }
    }

    if let Some(scores) = root.get("confidence").and_then(Value::as_object) {
        for (key, score) in scores {
            if let (Ok(field), Some(score)) = (key.parse::<Field>(), score.as_f64()) {
                result.confidence.insert(field, score.clamp(0.0, 1.0));
            }
        }
    }

    if let Some(corrected) = root.get("corrections").and_then(Value::as_array) {
        result.corrections = corrected
            .iter()
            .filter_map(|v| v.as_str()?.parse::<Field>().ok())
            .filter(|field| result.fields.is_known(*field))
            .collect();
    }

    Ok(result)
}

/// From the first `{` to the last `}`.
fn json_object_slice(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn fact_value(field: Field, value: &Value) -> Option<FactValue> {
    match field {
        Field::DebtAmount | Field::MonthlyIncome => as_u64(value).map(FactValue::Amount),
        Field::CreditorsCount => as_u64(value)
            .and_then(|n| u32::try_from(n).ok())
            .map(FactValue::Count),
        Field::EmploymentType => as_enum::<EmploymentType>(value).map(FactValue::Employment),
        Field::IncomeStability => as_enum::<IncomeStability>(value).map(FactValue::Stability),
        Field::CollateralType => as_enum::<CollateralType>(value).map(FactValue::Collateral),
        Field::HasOverdue12Months
        | Field::HasProperty
        | Field::HasCar
        | Field::HasCollateral
        | Field::HasCollectorPressure
        | Field::HasAccountArrest
        | Field::HasWageArrest
        | Field::PreviousRejection => as_bool(value).map(FactValue::Flag),
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => {
            let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
            digits
                .parse::<u64>()
                .ok()
                .or_else(|| digits.replace(',', ".").parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
        }
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "да" | "yes" => Some(true),
            "false" | "нет" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_enum<T: std::str::FromStr>(value: &Value) -> Option<T> {
    value.as_str()?.parse().ok()
}
