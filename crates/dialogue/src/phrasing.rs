//! Wrapping bare questions into conversational messages.

use std::sync::Arc;

use async_trait::async_trait;
use qaryz_core::error::Result;
use qaryz_core::{Message, PhraseRequest, Provider, ProviderRequest, QuestionPhraser};
use tracing::warn;

/// Fixed templates: a greeting on first contact, a short
/// acknowledgement otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePhraser;

impl TemplatePhraser {
    pub fn render(request: &PhraseRequest<'_>) -> String {
        if request.first_contact {
            format!(
                "Здравствуйте! Я помогу разобраться с вашей ситуацией по банкротству. \
                 Для качественной консультации мне нужно задать несколько вопросов. {}",
                request.question
            )
        } else {
            format!("Понятно. {}", request.question)
        }
    }
}

#[async_trait]
impl QuestionPhraser for TemplatePhraser {
    async fn phrase(&self, request: &PhraseRequest<'_>) -> Result<String> {
        Ok(Self::render(request))
    }
}

/// Asks a language model for a natural transition. Falls back to
/// [`TemplatePhraser`] when the model fails or returns nothing usable.
pub struct LlmPhraser {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
}

impl LlmPhraser {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn prompt(request: &PhraseRequest<'_>) -> String {
        if request.first_contact {
            return format!(
                "Ты опытный юрист-консультант по банкротству в Казахстане.\n\
                 К тебе обратился клиент с первым сообщением: \"{message}\"\n\n\
                 Твоя задача:\n\
                 1. Поприветствовать клиента тепло и профессионально\n\
                 2. Показать, что понимаешь его ситуацию и готов помочь\n\
                 3. Объяснить, что для качественной консультации нужно задать несколько вопросов\n\
                 4. Задать первый вопрос: \"{question}\"\n\n\
                 Стиль: дружелюбный, профессиональный, эмпатичный.\n\
                 Длина: 2-3 предложения + вопрос.\n\
                 Отвечай только на русском языке.",
                message = request.user_message,
                question = request.question,
            );
        }

        let heard = if request.acknowledged.is_empty() {
            "получил ваш ответ".to_string()
        } else {
            request
                .acknowledged
                .iter()
                .map(|(field, value)| format!("{}: {value}", field.label().to_lowercase()))
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "Ты юрист-консультант по банкротству. Клиент ответил на твой вопрос: \"{message}\"\n\n\
             Из ответа ты извлек информацию: {heard}\n\n\
             Теперь нужно задать следующий вопрос: \"{question}\"\n\n\
             Твоя задача:\n\
             1. Кратко отреагировать на ответ клиента\n\
             2. Плавно перейти к следующему вопросу\n\
             3. Если нужно, пояснить, зачем этот вопрос важен\n\n\
             Не используй шаблонные фразы вроде \"Спасибо за информацию!\".\n\
             Длина: 1-2 предложения + вопрос.\n\
             Отвечай только на русском языке.",
            message = request.user_message,
            question = request.question,
        )
    }
}

#[async_trait]
impl QuestionPhraser for LlmPhraser {
    async fn phrase(&self, request: &PhraseRequest<'_>) -> Result<String> {
        let llm_request = ProviderRequest::new(&self.model, vec![Message::user(Self::prompt(request))])
            .with_temperature(self.temperature)
            .with_max_tokens(Some(300));

        match self.provider.complete(llm_request).await {
            Ok(response) if !response.message.content.trim().is_empty() => {
                Ok(response.message.content.trim().to_string())
            }
            Ok(_) => Ok(TemplatePhraser::render(request)),
            Err(e) => {
                warn!(error = %e, "Phrasing failed, using template");
                Ok(TemplatePhraser::render(request))
            }
        }
    }
}
