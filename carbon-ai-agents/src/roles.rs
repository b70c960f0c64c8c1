//! Agent roles and knowledge-base context injection.
//!
//! Four fixed roles assist with the carbon-accounting workflow. Each role has
//! a seed query describing the knowledge it benefits from; before a role's
//! task prompt is built, the retriever is asked for that context and the
//! result is prepended to the role's template.
//!
//! Retrieval being unavailable is not an error here: the role still works,
//! just without grounding. That decision is expressed as a tagged
//! [`RoleContext`] rather than a silently swallowed exception, so callers and
//! tests can tell the two prompt shapes apart.

use crate::error::GenerationError;
use crate::llm::{ChatMessage, ChatProvider, ChatRequest};
use crate::llm::groq::DEFAULT_TEMPERATURE;
use carbon_ai_retriever::RetrievalSystem;

/// The four fixed assistant roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    /// Helps classify activity data into the correct scope and category
    DataEntry,
    /// Recommends offset purchases for residual emissions
    OffsetAdvisor,
    /// Flags regulations relevant to the reporting organization
    RegulationRadar,
    /// Proposes emission-reduction measures
    Optimizer,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [
        AgentRole::DataEntry,
        AgentRole::OffsetAdvisor,
        AgentRole::RegulationRadar,
        AgentRole::Optimizer,
    ];

    /// Stable identifier for logs and UI.
    pub fn name(&self) -> &'static str {
        match self {
            AgentRole::DataEntry => "data-entry",
            AgentRole::OffsetAdvisor => "offset-advisor",
            AgentRole::RegulationRadar => "regulation-radar",
            AgentRole::Optimizer => "optimizer",
        }
    }

    /// Seed query describing the knowledge this role needs.
    pub fn seed_query(&self) -> &'static str {
        match self {
            AgentRole::DataEntry => "GHG Protocol Scope 1 Scope 2 Scope 3 definitions",
            AgentRole::OffsetAdvisor => "carbon offset markets credits verification standards",
            AgentRole::RegulationRadar => "carbon regulations compliance CBAM EU ETS reporting",
            AgentRole::Optimizer => "emission reduction strategies energy efficiency",
        }
    }

    /// Task prompt template. `{task}` is replaced with the user-supplied
    /// task parameters.
    pub fn template(&self) -> &'static str {
        match self {
            AgentRole::DataEntry => {
                "You are a data entry assistant for a carbon accounting platform. \
Classify the described activity into the correct GHG Protocol scope and emission category, \
and point out any missing data needed to compute emissions.\n\nActivity: {task}"
            }
            AgentRole::OffsetAdvisor => {
                "You are a carbon offset advisor. Recommend suitable offset project types and \
verification standards for the residual emissions described, and note typical price ranges.\n\nSituation: {task}"
            }
            AgentRole::RegulationRadar => {
                "You are a regulation monitoring assistant. Identify the carbon reporting and \
compliance obligations that apply to the organization described, and name the relevant regulations.\n\nOrganization: {task}"
            }
            AgentRole::Optimizer => {
                "You are an emissions optimization assistant. Propose concrete reduction measures \
for the emission profile described, ordered by expected impact.\n\nProfile: {task}"
            }
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of the pre-prompt knowledge lookup for a role.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleContext {
    /// Retrieval succeeded; the string is the formatted context block
    WithContext(String),
    /// Retrieval is disabled, uninitialized, or failed; the role's template
    /// is used unmodified
    WithoutContext,
}

impl RoleContext {
    pub fn is_grounded(&self) -> bool {
        matches!(self, RoleContext::WithContext(_))
    }
}

/// Injects knowledge-base context into role prompts before execution.
///
/// Constructed with or without a retrieval system; `None` models the
/// retrieval-disabled deployment, and any retrieval failure at lookup time
/// degrades to the same ungrounded prompt.
pub struct ContextInjector<'a> {
    retrieval: Option<&'a RetrievalSystem>,
}

impl<'a> ContextInjector<'a> {
    pub fn new(retrieval: Option<&'a RetrievalSystem>) -> Self {
        Self { retrieval }
    }

    /// Look up the role's seed-query context.
    pub async fn context_for(&self, role: AgentRole) -> RoleContext {
        let Some(retrieval) = self.retrieval else {
            tracing::debug!("Retrieval disabled, {role} runs without context");
            return RoleContext::WithoutContext;
        };

        match retrieval.context_for(role.seed_query()).await {
            Ok(context) if !context.is_empty() => RoleContext::WithContext(context),
            Ok(_) => {
                tracing::debug!("No relevant context found for {role}");
                RoleContext::WithoutContext
            }
            Err(e) => {
                tracing::warn!("Context retrieval failed for {role}, continuing without: {e}");
                RoleContext::WithoutContext
            }
        }
    }

    /// Render the role's prompt for a task, prepending context when present.
    pub fn render_prompt(role: AgentRole, context: &RoleContext, task: &str) -> String {
        let body = role.template().replace("{task}", task);
        match context {
            RoleContext::WithContext(context) => {
                format!("Relevant knowledge base excerpts:\n\n{context}\n\n{body}")
            }
            RoleContext::WithoutContext => body,
        }
    }

    /// Build the role's prompt for a task, looking up context first.
    pub async fn build_prompt(&self, role: AgentRole, task: &str) -> String {
        let context = self.context_for(role).await;
        Self::render_prompt(role, &context, task)
    }

    /// Execute a role's task through the hosted LLM.
    pub async fn run_task(
        &self,
        role: AgentRole,
        task: &str,
        llm: &dyn ChatProvider,
    ) -> Result<String, GenerationError> {
        let prompt = self.build_prompt(role, task).await;
        tracing::info!("Running {role} task via {}", llm.name());
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(DEFAULT_TEMPERATURE);
        llm.chat(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbon_ai_embed::{EmbeddingProvider, HashEmbeddingProvider};
    use carbon_ai_retriever::RetrievalConfig;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_roles_have_distinct_seed_queries() {
        let queries: std::collections::HashSet<_> =
            AgentRole::ALL.iter().map(|r| r.seed_query()).collect();
        assert_eq!(queries.len(), AgentRole::ALL.len());
        for role in AgentRole::ALL {
            assert!(!role.seed_query().is_empty());
            assert!(role.template().contains("{task}"));
        }
    }

    #[tokio::test]
    async fn test_disabled_retrieval_uses_unmodified_template() {
        let injector = ContextInjector::new(None);

        for role in AgentRole::ALL {
            let context = injector.context_for(role).await;
            assert_eq!(context, RoleContext::WithoutContext);

            let prompt = injector.build_prompt(role, "diesel generator usage").await;
            let expected = role.template().replace("{task}", "diesel generator usage");
            assert_eq!(prompt, expected);
            assert!(!prompt.contains("knowledge base excerpts"));
        }
    }

    #[tokio::test]
    async fn test_grounded_prompt_prepends_context() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("scopes.txt"),
            "Scope 1 covers direct emissions. Scope 2 covers purchased electricity. Scope 3 covers the value chain.",
        )
        .unwrap();
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbeddingProvider::new(64));
        let retrieval =
            RetrievalSystem::open_or_build(RetrievalConfig::new(dir.path()), provider)
                .await
                .unwrap();

        let injector = ContextInjector::new(Some(&retrieval));
        let context = injector.context_for(AgentRole::DataEntry).await;
        assert!(context.is_grounded());

        let prompt = injector
            .build_prompt(AgentRole::DataEntry, "office electricity bill")
            .await;
        assert!(prompt.starts_with("Relevant knowledge base excerpts:"));
        assert!(prompt.contains("[Source 1]:"));
        assert!(prompt.contains("office electricity bill"));
    }

    #[tokio::test]
    async fn test_retrieval_failure_degrades_to_plain_template() {
        // An index built with one embedding model and queried with another
        // fails retrieval; the injector must fall back, not propagate.
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("scopes.txt"), "Scope 1 covers direct emissions.").unwrap();
        let build_provider: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbeddingProvider::new(64));
        RetrievalSystem::open_or_build(RetrievalConfig::new(dir.path()), build_provider)
            .await
            .unwrap();

        let mismatched: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbeddingProvider::new(32));
        let retrieval =
            RetrievalSystem::open_or_build(RetrievalConfig::new(dir.path()), mismatched)
                .await
                .unwrap();

        let injector = ContextInjector::new(Some(&retrieval));
        let context = injector.context_for(AgentRole::Optimizer).await;
        assert_eq!(context, RoleContext::WithoutContext);

        let prompt = injector.build_prompt(AgentRole::Optimizer, "fleet fuel use").await;
        assert_eq!(
            prompt,
            AgentRole::Optimizer.template().replace("{task}", "fleet fuel use")
        );
    }
}
