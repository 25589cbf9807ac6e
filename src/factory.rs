use crate::provider::ProviderAdapter;
use crate::{Error, GeminiProvider, OpenAIProvider, Orchestrator, OrchestratorConfig};

/// Factory for creating a fully wired [`Orchestrator`].
pub struct ProviderFactory;

impl ProviderFactory {
    /// Build an orchestrator with every known provider registered.
    ///
    /// Providers without credentials are registered anyway and report
    /// `NotConfigured` when selected.
    pub async fn create(config: &OrchestratorConfig) -> Result<Orchestrator, Error> {
        let openai = OpenAIProvider::from_config(&config.openai)?;
        let gemini = GeminiProvider::from_config(&config.gemini).await?;

        let adapters: [&dyn ProviderAdapter; 2] = [&openai, &gemini];
        for adapter in adapters {
            if !adapter.is_configured() {
                tracing::warn!(provider = %adapter.id(), "provider has no credentials");
            }
        }

        let mut orchestrator = Orchestrator::new(config.timeout);
        orchestrator.register(openai).register(gemini);
        Ok(orchestrator)
    }

    /// Build an orchestrator from environment variables.
    pub async fn from_env() -> Result<Orchestrator, Error> {
        let config = OrchestratorConfig::from_env()?;
        Self::create(&config).await
    }
}
