//! Shared schema for the task generation pipeline.
//!
//! The `TaskType` / `TaskPriority` enumerations are the single source of
//! truth consumed by the prompt builder, the validator, and the fallback
//! generator — they must never drift apart.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Bounds on `max_tasks` for a single generation request.
pub const MAX_TASKS_MIN: u8 = 1;
pub const MAX_TASKS_MAX: u8 = 10;
pub const MAX_TASKS_DEFAULT: u8 = 5;

/// The closed set of marketing task categories the pipeline may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    MarketingResearch,
    CompetitiveAnalysis,
    ContentStrategy,
    PricingStrategy,
    MarketPositioning,
}

impl TaskType {
    /// All values, in prompt/display order.
    pub const ALL: [TaskType; 5] = [
        TaskType::MarketingResearch,
        TaskType::CompetitiveAnalysis,
        TaskType::ContentStrategy,
        TaskType::PricingStrategy,
        TaskType::MarketPositioning,
    ];

    /// Exact-match mapping from the wire string. Unknown strings are a
    /// validation drop, not a default — task_type is structural.
    pub fn from_wire(s: &str) -> Option<TaskType> {
        match s {
            "marketing_research" => Some(TaskType::MarketingResearch),
            "competitive_analysis" => Some(TaskType::CompetitiveAnalysis),
            "content_strategy" => Some(TaskType::ContentStrategy),
            "pricing_strategy" => Some(TaskType::PricingStrategy),
            "market_positioning" => Some(TaskType::MarketPositioning),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            TaskType::MarketingResearch => "marketing_research",
            TaskType::CompetitiveAnalysis => "competitive_analysis",
            TaskType::ContentStrategy => "content_strategy",
            TaskType::PricingStrategy => "pricing_strategy",
            TaskType::MarketPositioning => "market_positioning",
        }
    }

    /// Default effort estimate substituted when the model omits or mangles
    /// `estimated_hours`.
    pub fn default_hours(&self) -> f64 {
        match self {
            TaskType::MarketingResearch => 4.0,
            TaskType::CompetitiveAnalysis => 3.0,
            TaskType::MarketPositioning => 2.5,
            TaskType::ContentStrategy | TaskType::PricingStrategy => 2.0,
        }
    }

    /// The natural marketing focus for a task of this type, used when the
    /// model does not supply one.
    pub fn default_focus(&self) -> &'static str {
        match self {
            TaskType::MarketingResearch => "research",
            TaskType::CompetitiveAnalysis => "analysis",
            TaskType::ContentStrategy | TaskType::PricingStrategy => "strategy",
            TaskType::MarketPositioning => "analysis",
        }
    }
}

/// Task priority. Advisory only — unknown wire values default to `Medium`
/// instead of dropping the candidate.
///
/// Ord: `Low < Medium < High`, so sorting descending puts high first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn from_wire(s: &str) -> Option<TaskPriority> {
        match s {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Directional review-sentiment signal computed upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentTrend {
    Improving,
    Stable,
    Declining,
}

impl SentimentTrend {
    pub fn from_wire(s: &str) -> Option<SentimentTrend> {
        match s {
            "improving" => Some(SentimentTrend::Improving),
            "stable" => Some(SentimentTrend::Stable),
            "declining" => Some(SentimentTrend::Declining),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            SentimentTrend::Improving => "improving",
            SentimentTrend::Stable => "stable",
            SentimentTrend::Declining => "declining",
        }
    }
}

/// Read-only analytics snapshot for one product, computed upstream.
/// Fetched fresh per request; this pipeline never caches or mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAnalyticsSnapshot {
    pub trust_score: f64,
    pub review_count: i64,
    pub spam_percentage: f64,
    pub sentiment_trend: SentimentTrend,
    pub positive_themes: Vec<String>,
    pub category: String,
}

/// Project context for the product, used only to enrich the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub project_id: Uuid,
    pub name: String,
    pub target_product_name: Option<String>,
    pub budget: Option<String>,
    pub category: Option<String>,
}

/// A fully validated marketing task proposal.
///
/// `id` is `None` until the proposal is persisted; `status` is always
/// `pending` at creation. `stage_metadata` carries at least `source`
/// ("llm" or "fallback"), `product_id`, and `marketing_focus`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProposal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub status: String,
    pub estimated_hours: f64,
    pub stage_metadata: Value,
}

impl TaskProposal {
    /// True when this proposal was synthesized by the rule-based fallback.
    pub fn is_fallback(&self) -> bool {
        self.stage_metadata
            .get("source")
            .and_then(Value::as_str)
            .map(|s| s == "fallback")
            .unwrap_or(false)
    }
}

/// Builds the `stage_metadata` object every proposal carries.
pub fn stage_metadata(source: &str, product_id: Uuid, marketing_focus: &str) -> Value {
    serde_json::json!({
        "source": source,
        "product_id": product_id,
        "marketing_focus": marketing_focus,
    })
}

/// Request body for both generation endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub user_id: Uuid,
    pub max_tasks: Option<u8>,
}

/// Aggregated result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub product_id: Uuid,
    pub tasks_generated: usize,
    pub tasks: Vec<TaskProposal>,
    pub used_fallback: bool,
    pub message: String,
}
