//! # tactics-rag
//!
//! Retrieval-augmented query pipeline for a Teamfight Tactics (金铲铲之战)
//! knowledge assistant.
//!
//! ## Overview
//!
//! One user question is answered in four stages:
//!
//! 1. **Expansion** — a generation model turns the question into several
//!    candidate search strings (entity comparisons, category synonyms,
//!    list-style variants). Best-effort; the original question is always
//!    among the candidates.
//! 2. **Retrieval** — each candidate is embedded in query mode and searched
//!    against a vector index with a large per-candidate cap; results are
//!    merged and deduplicated by chunk identifier, never re-ranked or
//!    trimmed to a global top-K.
//! 3. **Synthesis** — the retrieved texts become a grounded prompt; the
//!    model answers exhaustively from that context (or admits it does not
//!    know) and every contributing chunk's provenance is cited.
//! 4. **Orchestration** — [`QueryPipeline::answer_query`] sequences the
//!    stages, recovering expansion and per-candidate retrieval failures and
//!    surfacing only configuration, synthesis, and cancellation errors.
//!
//! Ingestion (scraping, chunking, upserting) is upstream's concern; this
//! crate only consumes a populated index through the [`VectorIndex`] trait.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tactics_rag::{PipelineConfig, QueryPipeline};
//! use tactics_rag::openai::OpenAIChatModel;
//! use tactics_rag::pinecone::{PineconeEmbeddings, PineconeIndex};
//!
//! let pipeline = QueryPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedding_provider(Arc::new(PineconeEmbeddings::from_env()?))
//!     .vector_index(Arc::new(PineconeIndex::from_env(index_host)?))
//!     .generation_model(Arc::new(OpenAIChatModel::from_env()?))
//!     .build()?;
//!
//! let result = pipeline.answer_query("5费卡有哪些").await?;
//! println!("{}\n来源: {:?}", result.answer, result.sources);
//! ```
//!
//! ## Features
//!
//! - `pinecone` — [`pinecone::PineconeIndex`] and
//!   [`pinecone::PineconeEmbeddings`] (reqwest-based).
//! - `openai` — [`openai::OpenAIChatModel`] for any OpenAI-compatible chat
//!   endpoint (DeepSeek, OpenRouter, OpenAI).
//!
//! [`InMemoryVectorIndex`] is always available for development and tests.

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod expansion;
pub mod generation;
pub mod inmemory;
pub mod pipeline;
pub mod retriever;
pub mod synthesis;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "pinecone")]
pub mod pinecone;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use document::{AnswerResult, ChunkMetadata, Match, RetrievalResult, UNKNOWN_SOURCE};
pub use embedding::{EmbeddingMode, EmbeddingProvider};
pub use error::{RagError, Result};
pub use expansion::QueryExpander;
pub use generation::GenerationModel;
pub use inmemory::InMemoryVectorIndex;
pub use pipeline::{QueryPipeline, QueryPipelineBuilder};
pub use retriever::Retriever;
pub use synthesis::{AnswerSynthesizer, NO_CONTEXT_SENTINEL};
pub use vectorstore::VectorIndex;
