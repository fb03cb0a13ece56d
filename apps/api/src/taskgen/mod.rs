// Task Generation Pipeline
// Implements: prompt construction, model invocation, response validation,
// deterministic fallback, and orchestration with per-item persistence.
// All LLM calls go through llm_client — no direct Anthropic SDK calls here.

pub mod agent;
pub mod fallback;
pub mod handlers;
pub mod prompts;
pub mod service;
pub mod types;
pub mod validator;
