//! `qaryz chat`: Interactive or single-message console session.
//!
//! Runs the same controller the gateway uses. The context snapshot and
//! session state the WhatsApp integration would store are kept in memory.

use std::io::Write;

use qaryz_config::AppConfig;
use qaryz_core::SessionState;
use qaryz_dialogue::{TurnInput, TurnResponse};
use qaryz_gateway::build_services;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

/// What a client carries between turns.
#[derive(Debug, Clone)]
pub struct ChatSession {
    conversation_id: String,
    context: Value,
    state: SessionState,
}

impl ChatSession {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            context: Value::Object(Default::default()),
            state: SessionState::Initial,
        }
    }

    pub fn input(&self, message: &str) -> TurnInput {
        TurnInput::new(&self.conversation_id, message)
            .with_context(self.context.clone())
            .with_state(self.state)
    }

    /// Keep what the turn returned. An `error` turn starts the session over.
    pub fn absorb(&mut self, response: &TurnResponse) {
        if response.session_state == SessionState::Error {
            self.reset();
            return;
        }
        self.context = response.context_updates.clone();
        self.state = response.session_state;
    }

    pub fn reset(&mut self) {
        self.context = Value::Object(Default::default());
        self.state = SessionState::Initial;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ⚠️  No API key configured; running with pattern extraction only.");
        eprintln!("     Consultations need a model. Set one of:");
        eprintln!("       QARYZ_API_KEY / OPENAI_API_KEY / OPENROUTER_API_KEY");
        eprintln!("     or add api_key to {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        config.extraction.use_llm = false;
        config.dialogue.llm_phrasing = false;
    }

    let services = build_services(&config).await?;
    let controller = services.controller;
    let mut session = ChatSession::new(format!("cli-{}", uuid::Uuid::new_v4()));

    if let Some(msg) = message {
        let response = controller.handle_turn(session.input(&msg)).await;
        println!("{}", response.response);
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Qaryz — консультация по банкротству     ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:   {}", services.components.provider);
    println!("  Extractor:  {}", services.components.extractor);
    println!("  Knowledge:  {} chunks", services.components.knowledge_chunks);
    println!();
    println!("  Type your message and press Enter.");
    println!("  '/reset' starts over, 'exit' or Ctrl+C quits.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  Вы > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "exit" | "quit" => break,
            "/reset" => {
                session.reset();
                println!("  (session reset)");
                continue;
            }
            _ => {}
        }

        eprint!("  ...");
        let response = controller.handle_turn(session.input(line)).await;
        eprint!("\r     \r");

        println!();
        for text_line in response.response.lines() {
            println!("  Бот > {text_line}");
        }
        println!("        [{}]", response.session_state);
        println!();

        session.absorb(&response);
    }

    println!();
    println!("  До свидания! 👋");
    println!();

    Ok(())
}
