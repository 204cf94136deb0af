//! Mr. Thomas — multi-turn travel chat.
//!
//! The raw user text is recorded as a turn before the model is called; the
//! rendered persona prompt is what goes on the wire, preceded by the earlier
//! turns. A failed call leaves the user turn in place and appends nothing
//! else.

use std::collections::HashMap;

use tracing::{info, warn};

use super::TravelAgent;
use crate::error::AppError;
use crate::llm::CompletionRequest;

impl TravelAgent {
    pub async fn chat(&mut self, input: &str) -> Result<String, AppError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::InvalidInput("message is empty".into()));
        }

        let prompt = self
            .templates
            .chat
            .render(&HashMap::from([("user_input", input.to_string())]))?;

        self.session.append_user_turn(input);

        // Everything before the turn just appended.
        let prior = self.session.len() - 1;
        let request = CompletionRequest::new(&prompt)
            .with_history(self.session.history_as_context().take(prior));

        let reply = match self.provider.complete(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(session_id = %self.session.id(), error = %e, "chat: gateway call failed");
                return Err(e.into());
            }
        };

        self.session.append_assistant_turn(reply.clone());
        info!(session_id = %self.session.id(), turns = self.session.len(), "chat: reply recorded");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::agent_with;
    use crate::error::AppError;
    use crate::llm::providers::dummy::DummyProvider;
    use crate::llm::GatewayErrorKind;
    use crate::session::{Role, SessionState};

    #[tokio::test]
    async fn successful_chat_appends_both_turns() {
        let (mut agent, calls) = agent_with(DummyProvider::new());
        let reply = agent.chat("Plan a trip to Kyoto").await.unwrap();
        assert!(reply.starts_with("[echo] "));
        assert!(reply.contains("User request: Plan a trip to Kyoto"));
        assert!(reply.contains("DO NOT USE LATEX"));

        let turns: Vec<_> = agent.session().history_as_context().collect();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role(), Role::User);
        assert_eq!(turns[0].text(), "Plan a trip to Kyoto");
        assert_eq!(turns[1].role(), Role::Assistant);
        assert_eq!(calls.calls(), 1);
    }

    #[tokio::test]
    async fn failed_call_keeps_only_user_turn() {
        let (mut agent, calls) = agent_with(DummyProvider::failing(GatewayErrorKind::Network));
        let err = agent.chat("Plan a trip to Kyoto").await.unwrap_err();
        assert!(matches!(err, AppError::Gateway(ref g) if g.kind == GatewayErrorKind::Network));

        let turns: Vec<_> = agent.session().history_as_context().collect();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role(), Role::User);
        assert_eq!(turns[0].text(), "Plan a trip to Kyoto");
        assert_eq!(calls.calls(), 1);
    }

    #[tokio::test]
    async fn blank_input_rejected_before_any_call() {
        let (mut agent, calls) = agent_with(DummyProvider::new());
        let err = agent.chat("   ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(agent.session().state(), SessionState::Empty);
        assert_eq!(calls.calls(), 0);
    }

    #[tokio::test]
    async fn turns_accumulate_across_messages() {
        let (mut agent, _) = agent_with(DummyProvider::new());
        agent.chat("Hi").await.unwrap();
        agent.chat("What about Osaka?").await.unwrap();
        let texts: Vec<&str> = agent.session().history_as_context().map(|t| t.text()).collect();
        assert_eq!(texts.len(), 4);
        assert_eq!(texts[0], "Hi");
        assert_eq!(texts[2], "What about Osaka?");
    }

    #[tokio::test]
    async fn prior_turns_replayed_without_the_new_one() {
        let (mut agent, provider) = agent_with(DummyProvider::new());
        let first = agent.chat("Hi").await.unwrap();
        assert!(provider.last_history().is_empty());

        agent.chat("What about Osaka?").await.unwrap();
        assert_eq!(
            provider.last_history(),
            vec![(Role::User, "Hi".to_string()), (Role::Assistant, first)]
        );
    }

    #[tokio::test]
    async fn newest_message_never_in_its_own_history() {
        let (mut agent, provider) = agent_with(DummyProvider::new());
        agent.chat("Hi").await.unwrap();
        agent.chat("Kyoto in May").await.unwrap();
        agent.chat("And June?").await.unwrap();
        let history = provider.last_history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[2], (Role::User, "Kyoto in May".to_string()));
        assert!(history.iter().all(|(_, text)| text != "And June?"));
    }
}
