pub mod chunking_strategy;
pub mod index_builder;
pub mod knowledge_index;
pub mod loader;
pub mod search;
