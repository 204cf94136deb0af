//! Travel agents — the three planner flows built on one shared session.
//!
//! ```text
//!            TravelAgent { provider, templates, session }
//!               ↑               ↑                ↑
//!          chat::chat     budget::budget    spot::locate_spot
//! ```
//!
//! Every flow is one render → gateway → session-update chain. The agent owns
//! its session, so interactions are serialised by `&mut self`.

pub mod budget;
pub mod chat;
pub mod spot;

use crate::llm::LlmProvider;
use crate::prompt::Templates;
use crate::session::Session;

pub struct TravelAgent {
    provider: LlmProvider,
    templates: Templates,
    session: Session,
    budget_temperature: f32,
}

impl TravelAgent {
    pub fn new(provider: LlmProvider, templates: Templates, session: Session, budget_temperature: f32) -> Self {
        Self { provider, templates, session, budget_temperature }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::llm::providers::dummy::DummyProvider;

    /// Agent over a dummy provider; the returned handle shares its call counter.
    pub fn agent_with(provider: DummyProvider) -> (TravelAgent, DummyProvider) {
        let handle = provider.clone();
        let agent = TravelAgent::new(LlmProvider::Dummy(provider), Templates::builtin(), Session::new(50), 0.5);
        (agent, handle)
    }
}
