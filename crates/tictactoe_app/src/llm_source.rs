//! LLM-backed decision source for the delegated opponent.

use crate::llm_client::{LlmClient, LlmConfig};
use tictactoe_core::{DecisionRequest, DecisionSource, DecisionSourceError};
use tracing::{debug, instrument};

/// Sends the board to an LLM and hands back its raw reply.
///
/// Validation of the reply happens in the core; this type only moves text.
#[derive(Debug, Clone)]
pub struct LlmDecisionSource {
    client: LlmClient,
    label: String,
}

impl LlmDecisionSource {
    /// Creates a source from an LLM configuration.
    #[instrument(skip(config), fields(provider = %config.provider(), model = %config.model()))]
    pub fn new(config: LlmConfig) -> Self {
        let label = format!("{}:{}", config.provider(), config.model());
        Self {
            client: LlmClient::new(config),
            label,
        }
    }
}

#[async_trait::async_trait]
impl DecisionSource for LlmDecisionSource {
    #[instrument(skip(self, request), fields(source = %self.label, own_mark = %request.own_mark))]
    async fn request(&self, request: &DecisionRequest) -> Result<String, DecisionSourceError> {
        let reply = self
            .client
            .generate(request.system_prompt(), &request.user_message())
            .await
            .map_err(|e| DecisionSourceError::new(e.message))?;
        debug!(reply = %reply, "LLM replied");
        Ok(reply)
    }

    fn name(&self) -> &str {
        &self.label
    }
}
