// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Instruction that keeps generated tasks inside the marketing domain.
pub const MARKETING_SCOPE_INSTRUCTION: &str = "\
    CRITICAL: Every task must be a MARKETING action: competitor research, \
    competitive analysis, content strategy, pricing strategy, or market \
    positioning. Do NOT propose engineering, legal, or operational work. \
    Every task must be concrete enough for a person to start today.";
