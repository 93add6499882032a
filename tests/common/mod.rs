use microloan_ussd::application::engine::{UssdEngine, UssdRequest, UssdResponse};
use microloan_ussd::domain::session::SessionPolicy;
use microloan_ussd::infrastructure::in_memory::{
    InMemoryAccountDirectory, InMemorySessionStore, StaticCatalog,
};

/// Demo customer with no loans, PIN 4321.
pub const NEW_CUSTOMER: &str = "+251900000003";

pub struct Harness {
    pub engine: UssdEngine,
    pub sessions: InMemorySessionStore,
    pub accounts: InMemoryAccountDirectory,
}

pub fn harness(policy: SessionPolicy) -> Harness {
    let sessions = InMemorySessionStore::new(policy);
    let accounts = InMemoryAccountDirectory::demo();
    let engine = UssdEngine::new(
        Box::new(sessions.clone()),
        Box::new(accounts.clone()),
        Box::new(StaticCatalog::demo()),
    );
    Harness {
        engine,
        sessions,
        accounts,
    }
}

pub fn pin_first() -> SessionPolicy {
    SessionPolicy {
        ask_language: false,
        ..SessionPolicy::default()
    }
}

/// Replays a dialog the way a gateway does, resending every input so far.
pub struct Dialog<'a> {
    engine: &'a UssdEngine,
    session_id: String,
    phone_number: String,
    inputs: Vec<String>,
}

impl<'a> Dialog<'a> {
    pub fn new(engine: &'a UssdEngine, session_id: &str, phone_number: &str) -> Self {
        Self {
            engine,
            session_id: session_id.to_string(),
            phone_number: phone_number.to_string(),
            inputs: Vec::new(),
        }
    }

    pub async fn start(&mut self) -> UssdResponse {
        self.engine
            .handle(UssdRequest::new(&self.session_id, &self.phone_number, ""))
            .await
            .unwrap()
    }

    pub async fn send(&mut self, input: &str) -> UssdResponse {
        self.inputs.push(input.to_string());
        let text = self.inputs.join("*");
        self.engine
            .handle(UssdRequest::new(&self.session_id, &self.phone_number, text))
            .await
            .unwrap()
    }

    pub async fn send_all(&mut self, inputs: &[&str]) -> UssdResponse {
        let mut last = None;
        for input in inputs {
            last = Some(self.send(input).await);
        }
        last.expect("at least one input")
    }
}
