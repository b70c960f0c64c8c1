//! carbon-ai-agents: answer generation and agent roles for the
//! carbon-accounting assistant
//!
//! This crate sits on top of `carbon-ai-retriever` and adds the two
//! LLM-facing surfaces of the system:
//!
//! - **[`composer`]**: retrieval-grounded question answering: retrieve the
//!   top chunks for a question, build a QA prompt, run one chat completion,
//!   return the answer together with its sources
//! - **[`roles`]**: four fixed assistant roles whose task prompts are
//!   prefixed with knowledge-base context when retrieval is available, and
//!   used verbatim when it is not
//!
//! The hosted LLM is reached through the [`llm::ChatProvider`] trait; the
//! shipped implementation is [`llm::GroqClient`]. Every failure mode of the
//! generation path is a [`GenerationError`].

pub mod composer;
pub mod error;
pub mod llm;
pub mod roles;

pub use composer::{AnswerComposer, ComposedAnswer};
pub use error::GenerationError;
pub use llm::{ChatMessage, ChatProvider, ChatRequest, GroqClient};
pub use roles::{AgentRole, ContextInjector, RoleContext};
