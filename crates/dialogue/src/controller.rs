//! Dialogue controller: one inbound message in, one reply out.
//!
//! The controller owns no conversation state. Every turn starts from the
//! snapshot the caller sends and ends with the snapshot the caller should
//! keep. Collaborators are injected once and shared across turns.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use qaryz_config::AppConfig;
use qaryz_core::error::Result;
use qaryz_core::{
    AnswerGenerator, Context, ExtractionResult, FieldExtractor, Intent, MergePolicy, PhraseRequest,
    QuestionPhraser, SessionState,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::catalog::Question;
use crate::composer::{AnswerComposer, GENERATION_APOLOGY};
use crate::extraction::ExtractionAdapter;
use crate::followup::followup_offer;
use crate::keywords::{ENTREPRENEUR, FOLLOWUP, GREETING};
use crate::phrasing::TemplatePhraser;
use crate::prioritizer::QuestionPrioritizer;
use crate::requirements::{CompletionStatus, Phase};

pub const GREETING_REPLY: &str = "Здравствуйте! Я помогу вам разобраться с вопросами банкротства.";

pub const TURN_FAILURE_REPLY: &str = "Произошла ошибка в обработке запроса. Попробуйте начать сначала.";

/// Lead-in for an answer given while required facts are missing but no
/// catalog question covers them.
pub const NO_QUESTION_REPLY: &str =
    "Спасибо за предоставленную информацию! Позвольте мне проанализировать вашу ситуацию...";

/// One inbound message with the caller-held conversation state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurnInput {
    pub conversation_id: String,
    pub message: String,
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub session_state: SessionState,
}

impl TurnInput {
    pub fn new(conversation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    pub fn with_state(mut self, session_state: SessionState) -> Self {
        self.session_state = session_state;
        self
    }
}

/// The reply plus everything the caller must carry into the next turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub response: String,
    pub session_state: SessionState,
    /// Full context snapshot after this turn.
    pub context_updates: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<String>,
    pub completion_status: Option<CompletionStatus>,
}

impl TurnResponse {
    fn failure() -> Self {
        Self {
            response: TURN_FAILURE_REPLY.to_string(),
            session_state: SessionState::Error,
            context_updates: Value::Object(Default::default()),
            next_question: None,
            completion_status: Some(CompletionStatus::failed()),
        }
    }
}

pub struct DialogueController {
    adapter: ExtractionAdapter,
    prioritizer: QuestionPrioritizer,
    composer: AnswerComposer,
    answers: Arc<dyn AnswerGenerator>,
    phraser: Arc<dyn QuestionPhraser>,
    merge_policy: MergePolicy,
    followup_escalation_threshold: u64,
    referral_contact: String,
}

impl DialogueController {
    /// Pattern extraction, template phrasing and default dialogue rules.
    pub fn new(answers: Arc<dyn AnswerGenerator>) -> Self {
        Self::from_config(&AppConfig::default(), answers)
    }

    pub fn from_config(config: &AppConfig, answers: Arc<dyn AnswerGenerator>) -> Self {
        let dialogue = &config.dialogue;
        Self {
            adapter: ExtractionAdapter::fallback_only(),
            prioritizer: QuestionPrioritizer::from_config(dialogue),
            composer: AnswerComposer::from_config(dialogue),
            answers,
            phraser: Arc::new(TemplatePhraser),
            merge_policy: config.merge_policy(),
            followup_escalation_threshold: dialogue.followup_escalation_threshold,
            referral_contact: dialogue.referral_contact.clone(),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn FieldExtractor>) -> Self {
        self.adapter = ExtractionAdapter::new(extractor);
        self
    }

    pub fn with_phraser(mut self, phraser: Arc<dyn QuestionPhraser>) -> Self {
        self.phraser = phraser;
        self
    }

    pub fn with_prioritizer(mut self, prioritizer: QuestionPrioritizer) -> Self {
        self.prioritizer = prioritizer;
        self
    }

    pub fn with_composer(mut self, composer: AnswerComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn with_merge_policy(mut self, merge_policy: MergePolicy) -> Self {
        self.merge_policy = merge_policy;
        self
    }

    pub fn with_referral_contact(mut self, contact: impl Into<String>) -> Self {
        self.referral_contact = contact.into();
        self
    }

    pub fn extractor_name(&self) -> &str {
        self.adapter.extractor_name()
    }

    /// Process one message. Never fails: any fault inside the turn,
    /// including a panic in a collaborator, yields an `error` response
    /// with an empty context.
    pub async fn handle_turn(&self, input: TurnInput) -> TurnResponse {
        info!(
            conversation_id = %input.conversation_id,
            state = %input.session_state,
            message_len = input.message.chars().count(),
            "Turn started"
        );

        match AssertUnwindSafe(self.run_turn(&input)).catch_unwind().await {
            Ok(Ok(response)) => {
                info!(
                    conversation_id = %input.conversation_id,
                    state = %response.session_state,
                    "Turn finished"
                );
                response
            }
            Ok(Err(e)) => {
                warn!(conversation_id = %input.conversation_id, error = %e, "Turn failed");
                TurnResponse::failure()
            }
            Err(_) => {
                error!(conversation_id = %input.conversation_id, "Turn panicked");
                TurnResponse::failure()
            }
        }
    }

    async fn run_turn(&self, input: &TurnInput) -> Result<TurnResponse> {
        let message = input.message.as_str();

        if GREETING.matches(message) {
            return Ok(self.greet());
        }

        if ENTREPRENEUR.matches(message) {
            debug!(conversation_id = %input.conversation_id, "Entrepreneur status mentioned");
            let context_updates = match &input.context {
                Value::Null => Value::Object(Default::default()),
                other => other.clone(),
            };
            return Ok(TurnResponse {
                response: self.entrepreneur_reply(),
                session_state: SessionState::Answered,
                context_updates,
                next_question: None,
                completion_status: None,
            });
        }

        let prior = Context::from_snapshot(&input.context)?;

        if input.session_state == SessionState::Answered && FOLLOWUP.matches(message) {
            let intent = prior.user_intent.unwrap_or_default();
            let status = self
                .prioritizer
                .requirements()
                .analyze(&prior, intent)
                .with_phase(Phase::OfferingProducts)
                .with_procedure(self.composer.classify(&prior));
            return Ok(TurnResponse {
                response: followup_offer(message, &prior, self.followup_escalation_threshold),
                session_state: SessionState::OfferingProduct,
                context_updates: prior.to_snapshot(),
                next_question: None,
                completion_status: Some(status),
            });
        }

        let extraction = self.adapter.extract_fields(message, &prior).await;
        let intent = extraction.intent;
        let mut ctx = prior.merge(&extraction, &self.merge_policy);
        ctx.user_intent = Some(intent);
        ctx.advance_step();

        let status = self
            .prioritizer
            .requirements()
            .analyze(&ctx, intent)
            .with_procedure(self.composer.classify(&ctx));
        debug!(
            conversation_id = %input.conversation_id,
            intent = %intent,
            missing = ?status.missing_critical,
            "Context analyzed"
        );

        if status.has_sufficient_info {
            if let Some(question) = self.prioritizer.followup_question(&ctx, intent) {
                let text = self.phrase(&question, message, false, &extraction).await;
                ctx.record_question(question.field);
                return Ok(Self::asking(text, question, ctx, status.with_phase(Phase::Collecting)));
            }

            let answer = self.compose(&ctx, intent, message).await;
            return Ok(TurnResponse {
                response: answer,
                session_state: SessionState::Answered,
                context_updates: ctx.to_snapshot(),
                next_question: None,
                completion_status: Some(status),
            });
        }

        match self.prioritizer.next_question_for_message(&ctx, intent, message) {
            Some(question) => {
                let first_contact = input.session_state == SessionState::Initial
                    && prior.questions_asked.is_empty()
                    && prior.answers_received.is_empty();
                let text = self.phrase(&question, message, first_contact, &extraction).await;
                ctx.record_question(question.field);
                Ok(Self::asking(text, question, ctx, status))
            }
            None => {
                let answer = self.compose(&ctx, intent, message).await;
                Ok(TurnResponse {
                    response: format!("{NO_QUESTION_REPLY}\n\n{answer}"),
                    session_state: SessionState::Answered,
                    context_updates: ctx.to_snapshot(),
                    next_question: None,
                    completion_status: Some(status.with_phase(Phase::Complete)),
                })
            }
        }
    }

    /// Reset the conversation and ask the first question.
    fn greet(&self) -> TurnResponse {
        let mut ctx = Context::fresh_start();
        let intent = Intent::default();
        let status = self.prioritizer.requirements().analyze(&ctx, intent);

        match self.prioritizer.next_question(&ctx, intent) {
            Some(question) => {
                let text = format!("{GREETING_REPLY} {}", question.question);
                ctx.record_question(question.field);
                Self::asking(text, question, ctx, status)
            }
            None => TurnResponse {
                response: GREETING_REPLY.to_string(),
                session_state: SessionState::CollectingInfo,
                context_updates: ctx.to_snapshot(),
                next_question: None,
                completion_status: Some(status),
            },
        }
    }

    fn entrepreneur_reply(&self) -> String {
        format!(
            "К сожалению, если у вас есть статус ИП (индивидуального предпринимателя), \
             банкротство как физическое лицо недоступно. Рекомендую обратиться к {} \
             для консультации по вашим вариантам.",
            self.referral_contact
        )
    }

    fn asking(text: String, question: Question, ctx: Context, status: CompletionStatus) -> TurnResponse {
        TurnResponse {
            response: text,
            session_state: SessionState::CollectingInfo,
            context_updates: ctx.to_snapshot(),
            next_question: Some(question.question),
            completion_status: Some(status),
        }
    }

    async fn phrase(
        &self,
        question: &Question,
        message: &str,
        first_contact: bool,
        extraction: &ExtractionResult,
    ) -> String {
        let acknowledged = extraction
            .fields
            .known_fields()
            .into_iter()
            .filter_map(|field| extraction.fields.get(field).map(|value| (field, value)))
            .collect();
        let request = PhraseRequest {
            question: &question.question,
            user_message: message,
            first_contact,
            acknowledged,
        };

        match self.phraser.phrase(&request).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => question.question.clone(),
            Err(e) => {
                warn!(error = %e, "Phraser failed, sending the bare question");
                question.question.clone()
            }
        }
    }

    async fn compose(&self, ctx: &Context, intent: Intent, message: &str) -> String {
        self.composer
            .compose_answer(ctx, intent, message, self.answers.as_ref())
            .await
    }

    /// Answer a free-form question straight from the knowledge base,
    /// without touching any conversation state.
    pub async fn answer_directly(&self, question: &str) -> String {
        match self.answers.generate_answer(question).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => GENERATION_APOLOGY.to_string(),
            Err(e) => {
                warn!(error = %e, "Direct answer failed");
                GENERATION_APOLOGY.to_string()
            }
        }
    }

    /// Run extraction and merge for a message without producing a reply.
    pub async fn preview_extraction(
        &self,
        message: &str,
        context: &Value,
    ) -> Result<(ExtractionResult, Context)> {
        let prior = Context::from_snapshot(context)?;
        let extraction = self.adapter.extract_fields(message, &prior).await;
        let mut merged = prior.merge(&extraction, &self.merge_policy);
        merged.user_intent = Some(extraction.intent);
        Ok((extraction, merged))
    }

    /// The question the next turn would ask for this context, with the
    /// sufficiency analysis it was chosen from and the intent it assumed.
    pub fn preview_next_question(
        &self,
        context: &Value,
    ) -> Result<(Option<Question>, CompletionStatus, Intent)> {
        let ctx = Context::from_snapshot(context)?;
        let intent = ctx.user_intent.unwrap_or_default();
        let status = self
            .prioritizer
            .requirements()
            .analyze(&ctx, intent)
            .with_procedure(self.composer.classify(&ctx));
        let question = if status.has_sufficient_info {
            self.prioritizer.followup_question(&ctx, intent)
        } else {
            self.prioritizer.next_question(&ctx, intent)
        };
        Ok((question, status, intent))
    }
}

impl std::fmt::Debug for DialogueController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueController")
            .field("adapter", &self.adapter)
            .field("merge_policy", &self.merge_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::Procedure;
    use crate::test_helpers::{
        FailingAnswers, FixedExtractor, PanickingExtractor, RecordingAnswers,
    };
    use qaryz_core::error::{Error, ProviderError};
    use qaryz_core::{EmploymentType, ExtractionSource, Field};
    use serde_json::json;

    fn controller() -> DialogueController {
        DialogueController::new(Arc::new(RecordingAnswers::new("Подробная консультация.")))
    }

    fn extracted(intent: Intent, fill: impl FnOnce(&mut ExtractionResult)) -> ExtractionResult {
        let mut result = ExtractionResult::empty(intent, ExtractionSource::Llm);
        fill(&mut result);
        result
    }

    struct FailingPhraser;

    #[async_trait::async_trait]
    impl QuestionPhraser for FailingPhraser {
        async fn phrase(&self, _request: &PhraseRequest<'_>) -> Result<String> {
            Err(Error::Provider(ProviderError::Network("down".into())))
        }
    }

    #[tokio::test]
    async fn greeting_starts_collection() {
        let response = controller().handle_turn(TurnInput::new("7701", "привет")).await;

        assert_eq!(response.session_state, SessionState::CollectingInfo);
        assert!(response.response.starts_with(GREETING_REPLY));
        assert!(response.response.contains("общая сумма задолженности"));
        assert_eq!(response.context_updates["step"], 1);
        assert_eq!(response.context_updates["questionsAsked"], json!(["debtAmount"]));
        assert_eq!(
            response.next_question.as_deref(),
            Some("Какая у вас общая сумма задолженности?")
        );
    }

    #[tokio::test]
    async fn greeting_resets_existing_context() {
        let input = TurnInput::new("7701", "Добрый день!")
            .with_context(json!({"debtAmount": 3_000_000, "step": 4}))
            .with_state(SessionState::Answered);
        let response = controller().handle_turn(input).await;
        assert!(response.context_updates.get("debtAmount").is_none());
        assert_eq!(response.context_updates["step"], 1);
    }

    #[tokio::test]
    async fn income_answer_leads_to_employment_question() {
        let extractor = FixedExtractor(extracted(Intent::EligibilityCheck, |r| {
            r.fields.monthly_income = Some(300_000);
            r.confidence.insert(Field::MonthlyIncome, 0.9);
        }));
        let input = TurnInput::new("7701", "зарплата 300 тысяч")
            .with_context(json!({"debtAmount": 5_000_000, "hasOverdue12Months": true, "step": 3}))
            .with_state(SessionState::CollectingInfo);

        let response = controller()
            .with_extractor(Arc::new(extractor))
            .handle_turn(input)
            .await;

        assert_eq!(response.session_state, SessionState::CollectingInfo);
        assert!(response.response.starts_with("Понятно. "));
        assert!(response.response.contains("работаете официально"));
        assert_eq!(response.context_updates["monthlyIncome"], 300_000);
        assert_eq!(response.context_updates["step"], 4);
        assert_eq!(response.context_updates["questionsAsked"], json!(["employmentType"]));

        let status = response.completion_status.unwrap();
        assert_eq!(status.missing_critical, vec![Field::EmploymentType]);
        assert_eq!(status.procedure, Some(Procedure::OutOfCourt));
    }

    #[tokio::test]
    async fn entrepreneur_is_referred_regardless_of_context() {
        let snapshot = json!({"debtAmount": 2_000_000, "monthlyIncome": 100_000});
        let input = TurnInput::new("7701", "У меня есть ИП")
            .with_context(snapshot.clone())
            .with_state(SessionState::CollectingInfo);

        let response = controller().handle_turn(input).await;

        assert_eq!(response.session_state, SessionState::Answered);
        assert!(response.response.contains("статус ИП"));
        assert!(response.response.contains("адвокату Мухтарову Торехану"));
        assert_eq!(response.context_updates, snapshot);
    }

    #[tokio::test]
    async fn complete_facts_produce_a_consultation() {
        let answers = Arc::new(RecordingAnswers::new("Вы можете подать заявление."));
        let extractor = FixedExtractor(extracted(Intent::EligibilityCheck, |r| {
            r.fields.employment_type = Some(EmploymentType::Official);
        }));
        let input = TurnInput::new("7701", "работаю официально")
            .with_context(json!({
                "debtAmount": 5_000_000,
                "hasOverdue12Months": true,
                "monthlyIncome": 150_000,
            }))
            .with_state(SessionState::CollectingInfo);

        let response = DialogueController::new(answers.clone())
            .with_extractor(Arc::new(extractor))
            .handle_turn(input)
            .await;

        assert_eq!(response.session_state, SessionState::Answered);
        assert!(response.response.starts_with("Ваша ситуация:"));
        assert!(response.response.contains("Тип процедуры: внесудебное банкротство"));
        assert!(response.response.ends_with("Вы можете подать заявление."));
        assert_eq!(answers.call_count(), 1);

        let status = response.completion_status.unwrap();
        assert!(status.has_sufficient_info);
        assert_eq!(status.phase, Phase::Complete);
    }

    #[tokio::test]
    async fn answer_failure_still_answers() {
        let extractor = FixedExtractor(extracted(Intent::EligibilityCheck, |r| {
            r.fields.employment_type = Some(EmploymentType::Official);
        }));
        let input = TurnInput::new("7701", "официально").with_context(json!({
            "debtAmount": 8_000_000,
            "hasOverdue12Months": true,
            "monthlyIncome": 150_000,
        }));

        let response = DialogueController::new(Arc::new(FailingAnswers))
            .with_extractor(Arc::new(extractor))
            .handle_turn(input)
            .await;

        assert_eq!(response.session_state, SessionState::Answered);
        assert!(response.response.contains("судебное банкротство"));
        assert!(response.response.ends_with(GENERATION_APOLOGY));
    }

    #[tokio::test]
    async fn large_debt_asks_about_property_once() {
        let extractor = FixedExtractor(extracted(Intent::EligibilityCheck, |r| {
            r.fields.employment_type = Some(EmploymentType::Official);
        }));
        let snapshot = json!({
            "debtAmount": 15_000_000,
            "hasOverdue12Months": true,
            "monthlyIncome": 400_000,
        });
        let dialogue = controller().with_extractor(Arc::new(extractor));

        let first = dialogue
            .handle_turn(TurnInput::new("7701", "в частной компании").with_context(snapshot))
            .await;
        assert_eq!(first.session_state, SessionState::CollectingInfo);
        assert!(first.response.contains("недвижимость"));

        let second = dialogue
            .handle_turn(
                TurnInput::new("7701", "не скажу")
                    .with_context(first.context_updates)
                    .with_state(SessionState::CollectingInfo),
            )
            .await;
        assert_eq!(second.session_state, SessionState::Answered);
    }

    #[tokio::test]
    async fn year_of_default_is_not_taken_for_the_debt() {
        let dialogue = controller();

        let first = dialogue
            .handle_turn(
                TurnInput::new("7701", "не плачу с 2021 года")
                    .with_context(json!({"step": 1}))
                    .with_state(SessionState::CollectingInfo),
            )
            .await;
        assert_eq!(first.session_state, SessionState::CollectingInfo);
        assert!(first.context_updates.get("debtAmount").is_none());

        let second = dialogue
            .handle_turn(
                TurnInput::new("7701", "долг 8 млн")
                    .with_context(first.context_updates)
                    .with_state(SessionState::CollectingInfo),
            )
            .await;
        assert_eq!(second.context_updates["debtAmount"], 8_000_000);
    }

    #[tokio::test]
    async fn pattern_amount_does_not_overwrite_pattern_amount() {
        let dialogue = controller();

        let first = dialogue
            .handle_turn(
                TurnInput::new("7701", "долг 3 млн")
                    .with_context(json!({"step": 1}))
                    .with_state(SessionState::CollectingInfo),
            )
            .await;
        assert_eq!(first.context_updates["debtAmount"], 3_000_000);
        assert_eq!(first.context_updates["answersReceived"]["debtAmount"], json!(0.3));

        let second = dialogue
            .handle_turn(
                TurnInput::new("7701", "долг 8 млн")
                    .with_context(first.context_updates)
                    .with_state(SessionState::CollectingInfo),
            )
            .await;
        assert_eq!(second.context_updates["debtAmount"], 3_000_000);
    }

    #[tokio::test]
    async fn followup_after_answer_offers_services() {
        let input = TurnInput::new("7701", "Что дальше?")
            .with_context(json!({"debtAmount": 3_000_000, "userIntent": "eligibility_check"}))
            .with_state(SessionState::Answered);

        let response = controller().handle_turn(input).await;

        assert_eq!(response.session_state, SessionState::OfferingProduct);
        assert!(response.response.contains("значительную сумму долга"));
        assert_eq!(response.completion_status.unwrap().phase, Phase::OfferingProducts);
    }

    #[tokio::test]
    async fn followup_words_mid_collection_are_a_normal_turn() {
        let input = TurnInput::new("7701", "что дальше?")
            .with_context(json!({"step": 2}))
            .with_state(SessionState::CollectingInfo);
        let response = controller().handle_turn(input).await;
        assert_eq!(response.session_state, SessionState::CollectingInfo);
    }

    #[tokio::test]
    async fn first_contact_uses_greeting_template() {
        let response = controller()
            .handle_turn(TurnInput::new("7701", "хочу списать долги"))
            .await;
        assert!(response.response.starts_with("Здравствуйте! Я помогу разобраться"));
        assert_eq!(response.context_updates["step"], 1);
    }

    #[tokio::test]
    async fn phraser_failure_sends_bare_question() {
        let response = controller()
            .with_phraser(Arc::new(FailingPhraser))
            .handle_turn(TurnInput::new("7701", "хочу списать долги"))
            .await;
        assert_eq!(response.response, "Какая у вас общая сумма задолженности?");
    }

    #[tokio::test]
    async fn unparseable_context_is_an_error_turn() {
        let input = TurnInput::new("7701", "долг 5 млн").with_context(json!("not an object"));
        let response = controller().handle_turn(input).await;

        assert_eq!(response.session_state, SessionState::Error);
        assert_eq!(response.response, TURN_FAILURE_REPLY);
        assert_eq!(response.context_updates, json!({}));
        assert_eq!(response.completion_status.unwrap().phase, Phase::Error);
    }

    #[tokio::test]
    async fn collaborator_panic_is_an_error_turn() {
        let response = controller()
            .with_extractor(Arc::new(PanickingExtractor))
            .handle_turn(TurnInput::new("7701", "долг 5 млн"))
            .await;
        assert_eq!(response.session_state, SessionState::Error);
        assert_eq!(response.context_updates, json!({}));
    }

    #[tokio::test]
    async fn preview_next_question_uses_stored_intent() {
        let (question, status, intent) = controller()
            .preview_next_question(&json!({"userIntent": "consequences", "hasProperty": true}))
            .unwrap();
        assert_eq!(intent, Intent::Consequences);
        assert_eq!(question.unwrap().field, Field::HasCar);
        assert_eq!(status.missing_critical, vec![Field::HasCar]);
    }

    #[tokio::test]
    async fn preview_extraction_merges_without_asking() {
        let (extraction, merged) = controller()
            .preview_extraction("долг 5 млн", &json!({"step": 2}))
            .await
            .unwrap();
        assert_eq!(extraction.source, ExtractionSource::Fallback);
        assert_eq!(merged.facts.debt_amount, Some(5_000_000));
        assert_eq!(merged.step, Some(2));
    }

    #[tokio::test]
    async fn direct_answer_falls_back_to_apology() {
        let text = DialogueController::new(Arc::new(FailingAnswers))
            .answer_directly("что такое банкротство?")
            .await;
        assert_eq!(text, GENERATION_APOLOGY);
    }
}
