//! End-to-end dialogue tests for the Qaryz consultation bot.
//!
//! These drive whole conversations through model-backed extraction, the
//! dialogue controller, retrieval over a real corpus directory and the HTTP
//! gateway, with a scripted model standing in for the remote API.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use qaryz_config::{AppConfig, GatewayConfig, KnowledgeConfig};
use qaryz_core::error::ProviderError;
use qaryz_core::message::Message;
use qaryz_core::provider::{Provider, ProviderRequest, ProviderResponse};
use qaryz_core::SessionState;
use qaryz_dialogue::{DialogueController, LlmExtractor, TurnInput, TurnResponse};
use qaryz_gateway::{Components, GatewayState, Services, build_router};
use qaryz_knowledge::{RagAnswerer, build_index};
use serde_json::{Value, json};
use tower::ServiceExt;

// ── Scripted model ───────────────────────────────────────────────────────

/// Replies with scripted texts in order and records every prompt.
/// Embeddings are unsupported, so the index is keyword-only.
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedModel {
    fn name(&self) -> &str {
        "e2e_model"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedModel exhausted after {} calls", self.calls()));
        Ok(ProviderResponse {
            message: Message::assistant(reply),
            usage: None,
            model: request.model,
        })
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────

const CORPUS: &str = "Внесудебное банкротство применяется, если общая сумма долга не превышает 1600 МРП.\n\n\
Заявление о внесудебном банкротстве подается через портал электронного правительства.\n\n\
Судебное банкротство возможно при долге свыше 1600 МРП и просрочке более 12 месяцев.";

async fn controller(model: Arc<ScriptedModel>, docs: &tempfile::TempDir) -> DialogueController {
    let config = AppConfig::default();
    let knowledge = KnowledgeConfig {
        docs_path: docs.path().to_string_lossy().to_string(),
        ..KnowledgeConfig::default()
    };
    let index = build_index(&knowledge, model.as_ref()).await.unwrap();
    assert!(!index.is_empty());
    assert!(!index.has_embeddings());

    let answers = RagAnswerer::from_config(Arc::new(index), model.clone(), &config);
    DialogueController::from_config(&config, Arc::new(answers))
        .with_extractor(Arc::new(LlmExtractor::new(model, "extract-model")))
}

fn corpus_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bankruptcy.txt"), CORPUS).unwrap();
    dir
}

struct Client {
    id: &'static str,
    context: Value,
    state: SessionState,
}

impl Client {
    fn new(id: &'static str) -> Self {
        Self {
            id,
            context: json!({}),
            state: SessionState::Initial,
        }
    }

    async fn say(&mut self, controller: &DialogueController, message: &str) -> TurnResponse {
        let input = TurnInput::new(self.id, message)
            .with_context(self.context.clone())
            .with_state(self.state);
        let response = controller.handle_turn(input).await;
        self.context = response.context_updates.clone();
        self.state = response.session_state;
        response
    }
}

// ── Conversations ────────────────────────────────────────────────────────

#[tokio::test]
async fn full_consultation_out_of_court() {
    let docs = corpus_dir();
    let model = ScriptedModel::new(&[
        r#"{"extracted_data": {"debtAmount": 4000000, "hasOverdue12Months": true},
            "intent": "eligibility_check",
            "confidence": {"debtAmount": 0.9, "hasOverdue12Months": 0.85}}"#,
        r#"{"extracted_data": {"monthlyIncome": 250000, "employmentType": "official"},
            "intent": "eligibility_check"}"#,
        "По вашим данным подходит внесудебная процедура.",
        "Вам подходит внесудебное банкротство. Рекомендую обратиться к адвокату Мухтарову Торехану.",
    ]);
    let controller = controller(model.clone(), &docs).await;
    let mut client = Client::new("77011234567");

    let greeting = client.say(&controller, "Здравствуйте").await;
    assert_eq!(greeting.session_state, SessionState::CollectingInfo);
    assert!(greeting.response.contains("общая сумма задолженности"));
    assert_eq!(model.calls(), 0);

    let second = client.say(&controller, "Должен около 4 млн, не плачу больше года").await;
    assert_eq!(second.session_state, SessionState::CollectingInfo);
    assert_eq!(second.next_question.as_deref(), Some("Какой у вас ежемесячный доход?"));
    assert_eq!(client.context["debtAmount"], 4_000_000);
    assert_eq!(client.context["hasOverdue12Months"], true);
    assert_eq!(client.context["step"], 2);

    let third = client.say(&controller, "Зарплата 250 тысяч, работаю официально").await;
    assert_eq!(third.session_state, SessionState::Answered);
    assert!(third.response.starts_with("Ваша ситуация:"));
    assert!(third.response.contains("- Сумма долга: 4 000 000 тенге"));
    assert!(third.response.contains(
        "Тип процедуры: внесудебное банкротство (долг не превышает 1600 МРП = 5 907 200 тенге)"
    ));
    assert!(third.response.ends_with("Рекомендую обратиться к адвокату Мухтарову Торехану."));
    assert_eq!(model.calls(), 4);

    // The grounded prompt carried the structured brief and retrieved corpus text.
    let grounded = model.prompt(2);
    assert!(grounded.contains("КОНСУЛЬТАЦИЯ ПО БАНКРОТСТВУ"));
    assert!(grounded.contains("1600 МРП"));

    let offer = client.say(&controller, "Что дальше?").await;
    assert_eq!(offer.session_state, SessionState::OfferingProduct);
    assert!(offer.response.contains("БЕСПЛАТНАЯ консультация"));
    assert_eq!(model.calls(), 4);
}

#[tokio::test]
async fn broken_model_output_still_collects_facts() {
    let docs = corpus_dir();
    let model = ScriptedModel::new(&["Я не могу ответить в формате JSON."]);
    let controller = controller(model, &docs).await;
    let mut client = Client::new("77019876543");

    let response = client.say(&controller, "долг 6 780 000 тенге").await;

    assert_eq!(response.session_state, SessionState::CollectingInfo);
    assert_eq!(client.context["debtAmount"], 6_780_000);
    assert_eq!(
        response.completion_status.unwrap().procedure,
        Some(qaryz_dialogue::Procedure::Judicial)
    );
}

#[tokio::test]
async fn correction_replaces_an_earlier_fact() {
    let docs = corpus_dir();
    let model = ScriptedModel::new(&[
        r#"{"extracted_data": {"debtAmount": 3000000}, "confidence": {"debtAmount": 0.9}}"#,
        r#"{"extracted_data": {"debtAmount": 7000000}, "confidence": {"debtAmount": 0.7},
            "corrections": ["debtAmount"]}"#,
    ]);
    let controller = controller(model, &docs).await;
    let mut client = Client::new("77015550000");

    client.say(&controller, "долг 3 млн").await;
    assert_eq!(client.context["debtAmount"], 3_000_000);

    client.say(&controller, "ошибся, на самом деле 7 млн").await;
    assert_eq!(client.context["debtAmount"], 7_000_000);
}

// ── Over HTTP ────────────────────────────────────────────────────────────

async fn post_chat(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn whatsapp_client_round_trip() {
    let docs = corpus_dir();
    let model = ScriptedModel::new(&[
        r#"{"extracted_data": {"debtAmount": 2500000}, "intent": "how_to_start"}"#,
    ]);
    let controller = controller(model, &docs).await;

    let config = GatewayConfig::default();
    let services = Services {
        components: Components {
            provider: "e2e_model".into(),
            extractor: controller.extractor_name().to_string(),
            phrasing: "template",
            knowledge_chunks: 3,
            embeddings: false,
        },
        controller: Arc::new(controller),
    };
    let app = build_router(Arc::new(GatewayState::new(services, &config)), &config);

    let (status, first) = post_chat(
        app.clone(),
        json!({"whatsapp_id": "77010000001", "message": "привет", "context": {}, "session_state": "initial"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["session_state"], "collecting_info");

    let (status, second) = post_chat(
        app.clone(),
        json!({
            "whatsapp_id": "77010000001",
            "message": "Как начать процедуру? Долг 2.5 млн",
            "context": first["context_updates"],
            "session_state": first["session_state"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["session_state"], "collecting_info");
    assert_eq!(second["context_updates"]["userIntent"], "how_to_start");
    assert_eq!(second["context_updates"]["debtAmount"], 2_500_000);
    assert_eq!(
        second["next_question"],
        "Есть ли у вас просрочки по кредитам более 12 месяцев?"
    );

    let (status, referral) = post_chat(
        app,
        json!({
            "whatsapp_id": "77010000001",
            "message": "У меня открыто ИП",
            "context": second["context_updates"],
            "session_state": "collecting_info",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(referral["session_state"], "answered");
    assert_eq!(referral["context_updates"], second["context_updates"]);
}
