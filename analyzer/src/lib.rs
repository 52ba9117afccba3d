//! Roundscope — reconstructs per-conversation dialog rounds from the raw,
//! semi-structured log records emitted by a distributed voice-assistant stack
//! (API gateway, ASR server, central dialog manager, NLP/LLM workers).
//!
//! The core is a batch pipeline: noise filtering, in-place field
//! normalization (peeling layered encodings back into structured data),
//! trace-id resolution, and a stateful many-to-one join that buckets records
//! by trace id and reduces each bucket into typed conversational aggregates.

pub mod app;
pub mod core;
pub mod domain;
pub mod utils;
