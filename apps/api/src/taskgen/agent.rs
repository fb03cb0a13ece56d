//! Task Generation Agent — builds the prompt, invokes the model once, and
//! parses the untrusted response into raw candidate records.
//!
//! Model output is external, untrusted data: individual items that fail to
//! parse are dropped with a log line, never fatal. Only transport/timeout
//! failure or a completely unparsable response raises `AgentError` — and
//! the orchestrator recovers from that by falling back.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::llm_client::prompts::MARKETING_SCOPE_INSTRUCTION;
use crate::llm_client::{strip_json_fences, LlmError, ModelClient};
use crate::taskgen::prompts::{TASKGEN_PROMPT_TEMPLATE, TASKGEN_SYSTEM};
use crate::taskgen::types::{
    ProductAnalyticsSnapshot, ProjectInfo, TaskPriority, TaskType,
};

/// Failure of the whole agent path. Always recovered by the orchestrator
/// (fallback synthesis) — never surfaced to the HTTP caller.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("model response was not parseable JSON: {0}")]
    Unparsable(#[from] serde_json::Error),
}

/// A raw candidate as the model emitted it. Every field is optional —
/// the validator decides what survives.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCandidate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub task_type: Option<String>,
    pub priority: Option<String>,
    pub estimated_hours: Option<f64>,
    pub marketing_focus: Option<String>,
}

/// Envelope form the prompt asks for: `{"tasks": [...]}`.
#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    tasks: Vec<serde_json::Value>,
}

pub struct TaskGenerationAgent {
    model: Arc<dyn ModelClient>,
}

impl TaskGenerationAgent {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Runs one prompt → model → parse cycle.
    ///
    /// Invokes the model exactly once per call; retry policy lives in the
    /// model client. Returns the candidates that parsed — possibly zero.
    pub async fn generate(
        &self,
        product_id: Uuid,
        analytics: &ProductAnalyticsSnapshot,
        project_info: &ProjectInfo,
        max_tasks: u8,
    ) -> Result<Vec<RawCandidate>, AgentError> {
        let prompt = build_taskgen_prompt(product_id, analytics, project_info, max_tasks);

        info!("Generating marketing tasks for product {product_id} (max {max_tasks})");
        let text = self.model.invoke(&prompt, TASKGEN_SYSTEM).await?;

        let candidates = parse_candidates(&text)?;
        info!(
            "Model returned {} parseable task candidates for product {product_id}",
            candidates.len()
        );
        Ok(candidates)
    }
}

/// Builds the generation prompt by filling the template with snapshot and
/// project context. The enumerations embedded here are the same closed sets
/// the validator enforces.
pub fn build_taskgen_prompt(
    product_id: Uuid,
    analytics: &ProductAnalyticsSnapshot,
    project_info: &ProjectInfo,
    max_tasks: u8,
) -> String {
    let task_types = TaskType::ALL
        .iter()
        .map(|t| t.as_wire())
        .collect::<Vec<_>>()
        .join(", ");

    let priorities = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High]
        .iter()
        .map(|p| p.as_wire())
        .collect::<Vec<_>>()
        .join(", ");

    let positive_themes = if analytics.positive_themes.is_empty() {
        "none recorded".to_string()
    } else {
        analytics.positive_themes.join(", ")
    };

    let project_context = format!(
        "- Project: {}\n- Target product: {}\n- Budget: {}\n- Project category: {}",
        project_info.name,
        project_info.target_product_name.as_deref().unwrap_or("N/A"),
        project_info.budget.as_deref().unwrap_or("N/A"),
        project_info.category.as_deref().unwrap_or("N/A"),
    );

    TASKGEN_PROMPT_TEMPLATE
        .replace("{scope_instruction}", MARKETING_SCOPE_INSTRUCTION)
        .replace("{product_id}", &product_id.to_string())
        .replace("{category}", &analytics.category)
        .replace("{trust_score}", &format!("{:.2}", analytics.trust_score))
        .replace("{review_count}", &analytics.review_count.to_string())
        .replace(
            "{spam_percentage}",
            &format!("{:.2}", analytics.spam_percentage),
        )
        .replace("{sentiment_trend}", analytics.sentiment_trend.as_wire())
        .replace("{positive_themes}", &positive_themes)
        .replace("{project_context}", &project_context)
        .replace("{task_types}", &task_types)
        .replace("{priorities}", &priorities)
        .replace("{max_tasks}", &max_tasks.to_string())
}

/// Parses the raw model text into candidates.
///
/// Accepts the requested `{"tasks": [...]}` envelope or a bare JSON array
/// (models sometimes strip the wrapper). Items that fail to deserialize are
/// dropped individually; a response that is not JSON at all is `Unparsable`.
pub fn parse_candidates(text: &str) -> Result<Vec<RawCandidate>, AgentError> {
    let text = strip_json_fences(text);

    let items: Vec<serde_json::Value> =
        if let Ok(envelope) = serde_json::from_str::<TaskEnvelope>(text) {
            envelope.tasks
        } else {
            serde_json::from_str::<Vec<serde_json::Value>>(text)?
        };

    let mut candidates = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<RawCandidate>(item.clone()) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => {
                warn!("Dropping unparsable task candidate: {e}");
                debug!("Offending candidate JSON: {item}");
            }
        }
    }
    Ok(candidates)
}
