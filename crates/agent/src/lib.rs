//! Generation runtime - model-backed drafting with deterministic degradation
//!
//! This crate turns underwriting results into policy text:
//! - Composes prompts for initial drafts, refinements and policy questions
//! - Walks an ordered list of candidate models with bounded retries
//! - Falls back to fixed output when no candidate answers
//!
//! # Architecture
//!
//! 1. **Provider** (`llm`, `gemini`) - one HTTP call per attempt, failures classified
//! 2. **Cascade** (`retry`) - pure state machine deciding retry, advance or give up
//! 3. **Orchestrator** (`orchestrator`) - drives the cascade, sleeps, logs, degrades
//!
//! # Safety Principle
//!
//! The model only writes prose. Risk levels and premiums are computed by
//! `policygen-core` before a prompt is ever built.

pub mod fallback;
pub mod gemini;
pub mod llm;
pub mod orchestrator;
pub mod prompts;
pub mod retry;

pub use gemini::GeminiClient;
pub use llm::{ErrorClass, OfflineProvider, ProviderClient, ProviderError};
pub use orchestrator::{
    AttemptFailure, DegradedReason, GenerationKind, GenerationOrchestrator, GenerationOutcome,
    Provenance,
};
pub use prompts::PolicyDraftRequest;
pub use retry::{GenerationSettings, RetryPolicy, Sleeper, TokioSleeper};
