//! Task Generator Service — orchestrates the full generation pipeline.
//!
//! Flow: validate request → fetch analytics → fetch project context →
//!       agent generate → validate candidates → (fallback?) → order →
//!       (persist?) → GenerationResult.
//!
//! Failure policy: analytics/project absence is terminal; everything from
//! the model call onward degrades instead of aborting. Persistence failures
//! are per-item: a failed insert drops that task from the result and the
//! batch continues.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::gateways::analytics::AnalyticsGateway;
use crate::gateways::project::ProjectGateway;
use crate::gateways::tasks::TaskStore;
use crate::taskgen::agent::TaskGenerationAgent;
use crate::taskgen::types::{
    GenerationResult, TaskProposal, MAX_TASKS_DEFAULT, MAX_TASKS_MAX, MAX_TASKS_MIN,
};
use crate::taskgen::{fallback, validator};

pub struct TaskGeneratorService {
    analytics: Arc<dyn AnalyticsGateway>,
    projects: Arc<dyn ProjectGateway>,
    store: Arc<dyn TaskStore>,
    agent: TaskGenerationAgent,
}

impl TaskGeneratorService {
    pub fn new(
        analytics: Arc<dyn AnalyticsGateway>,
        projects: Arc<dyn ProjectGateway>,
        store: Arc<dyn TaskStore>,
        agent: TaskGenerationAgent,
    ) -> Self {
        Self {
            analytics,
            projects,
            store,
            agent,
        }
    }

    /// Runs the pipeline without persisting anything.
    pub async fn preview(
        &self,
        product_id: Uuid,
        user_id: Uuid,
        max_tasks: Option<u8>,
    ) -> Result<GenerationResult, AppError> {
        let max_tasks = validate_max_tasks(max_tasks)?;
        let tasks = self.run_pipeline(product_id, user_id, max_tasks).await?;

        let used_fallback = tasks.iter().any(TaskProposal::is_fallback);
        let message = format!("Previewed {} marketing tasks (not saved)", tasks.len());
        Ok(GenerationResult {
            product_id,
            tasks_generated: tasks.len(),
            tasks,
            used_fallback,
            message,
        })
    }

    /// Runs the pipeline and persists each proposal. A single failed insert
    /// is logged and excluded; the remaining writes proceed. Losing the
    /// entire batch is surfaced as `TotalGenerationFailure`.
    pub async fn generate_and_save(
        &self,
        product_id: Uuid,
        user_id: Uuid,
        max_tasks: Option<u8>,
    ) -> Result<GenerationResult, AppError> {
        let max_tasks = validate_max_tasks(max_tasks)?;
        let tasks = self.run_pipeline(product_id, user_id, max_tasks).await?;

        let mut saved = Vec::with_capacity(tasks.len());
        for proposal in &tasks {
            match self.store.create(proposal).await {
                Ok(persisted) => saved.push(persisted),
                Err(e) => {
                    warn!(
                        "Failed to persist task '{}' for product {product_id}: {e}",
                        proposal.name
                    );
                }
            }
        }

        info!(
            "Persisted {}/{} generated tasks for product {product_id}",
            saved.len(),
            tasks.len()
        );

        if saved.is_empty() {
            // Every insert failed. An empty batch is never a success.
            return Err(AppError::TotalGenerationFailure(format!(
                "Generated {} tasks for product {product_id} but none could be saved",
                tasks.len()
            )));
        }

        let used_fallback = saved.iter().any(TaskProposal::is_fallback);
        let message = format!("Created {} marketing tasks from analytics data", saved.len());
        Ok(GenerationResult {
            product_id,
            tasks_generated: saved.len(),
            tasks: saved,
            used_fallback,
            message,
        })
    }

    /// Shared pipeline: fetch context, generate, validate, fall back if
    /// needed, then order by priority and truncate.
    async fn run_pipeline(
        &self,
        product_id: Uuid,
        user_id: Uuid,
        max_tasks: u8,
    ) -> Result<Vec<TaskProposal>, AppError> {
        let analytics = self
            .analytics
            .analyze(product_id, user_id)
            .await?
            .ok_or(AppError::AnalyticsMissing(product_id))?;

        let project_info = self
            .projects
            .get_context(product_id)
            .await?
            .ok_or(AppError::ProjectMissing(product_id))?;

        let candidates = match self
            .agent
            .generate(product_id, &analytics, &project_info, max_tasks)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Agent path failed for product {product_id}, will fall back: {e}");
                Vec::new()
            }
        };

        let mut proposals = validator::normalize(candidates, product_id);

        if proposals.is_empty() {
            info!("No usable model candidates for product {product_id}; using fallback rules");
            proposals = fallback::synthesize(product_id, &analytics, max_tasks);
        }

        // Stable sort keeps the original order within a priority band.
        proposals.sort_by(|a, b| b.priority.cmp(&a.priority));
        proposals.truncate(max_tasks as usize);

        if proposals.is_empty() {
            // Structurally unreachable: the fallback always emits at least
            // one task. Kept explicit so an empty batch can never masquerade
            // as success.
            return Err(AppError::TotalGenerationFailure(format!(
                "No tasks could be generated for product {product_id}"
            )));
        }

        Ok(proposals)
    }
}

/// Validates the requested bound before any collaborator is touched.
fn validate_max_tasks(requested: Option<u8>) -> Result<u8, AppError> {
    let max_tasks = requested.unwrap_or(MAX_TASKS_DEFAULT);
    if !(MAX_TASKS_MIN..=MAX_TASKS_MAX).contains(&max_tasks) {
        return Err(AppError::InvalidRequest(format!(
            "max_tasks must be between {MAX_TASKS_MIN} and {MAX_TASKS_MAX}, got {max_tasks}"
        )));
    }
    Ok(max_tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{LlmError, ModelClient};
    use crate::taskgen::types::{
        ProductAnalyticsSnapshot, ProjectInfo, SentimentTrend, TaskPriority, TaskType,
    };

    // ── Mock collaborators ──────────────────────────────────────────────

    struct FixedAnalytics {
        snapshot: Option<ProductAnalyticsSnapshot>,
        calls: AtomicUsize,
    }

    impl FixedAnalytics {
        fn some(snapshot: ProductAnalyticsSnapshot) -> Self {
            Self {
                snapshot: Some(snapshot),
                calls: AtomicUsize::new(0),
            }
        }

        fn none() -> Self {
            Self {
                snapshot: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AnalyticsGateway for FixedAnalytics {
        async fn analyze(
            &self,
            _product_id: Uuid,
            _user_id: Uuid,
        ) -> Result<Option<ProductAnalyticsSnapshot>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.snapshot.clone())
        }
    }

    struct FixedProject {
        info: Option<ProjectInfo>,
    }

    #[async_trait]
    impl ProjectGateway for FixedProject {
        async fn get_context(&self, _product_id: Uuid) -> Result<Option<ProjectInfo>, AppError> {
            Ok(self.info.clone())
        }
    }

    /// In-memory store that can be told to fail for specific task names,
    /// or for every insert.
    struct RecordingStore {
        created: Mutex<Vec<TaskProposal>>,
        fail_names: Vec<String>,
        fail_all: bool,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                created: Mutex::new(Vec::new()),
                fail_names: Vec::new(),
                fail_all: false,
            }
        }

        fn failing_on(names: &[&str]) -> Self {
            Self {
                created: Mutex::new(Vec::new()),
                fail_names: names.iter().map(|s| s.to_string()).collect(),
                fail_all: false,
            }
        }

        fn failing_always() -> Self {
            Self {
                created: Mutex::new(Vec::new()),
                fail_names: Vec::new(),
                fail_all: true,
            }
        }

        fn created_count(&self) -> usize {
            self.created.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TaskStore for RecordingStore {
        async fn create(&self, proposal: &TaskProposal) -> Result<TaskProposal, AppError> {
            if self.fail_all || self.fail_names.contains(&proposal.name) {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "insert rejected for '{}'",
                    proposal.name
                )));
            }
            let persisted = TaskProposal {
                id: Some(Uuid::new_v4()),
                ..proposal.clone()
            };
            self.created.lock().unwrap().push(persisted.clone());
            Ok(persisted)
        }
    }

    /// Model client that replays a scripted outcome.
    enum ScriptedModel {
        Text(String),
        Unavailable,
    }

    #[async_trait]
    impl ModelClient for ScriptedModel {
        async fn invoke(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            match self {
                ScriptedModel::Text(text) => Ok(text.clone()),
                ScriptedModel::Unavailable => Err(LlmError::EmptyContent),
            }
        }
    }

    // ── Fixtures ────────────────────────────────────────────────────────

    fn snapshot(trust: f64, spam: f64, trend: SentimentTrend) -> ProductAnalyticsSnapshot {
        ProductAnalyticsSnapshot {
            trust_score: trust,
            review_count: 900,
            spam_percentage: spam,
            sentiment_trend: trend,
            positive_themes: vec!["durable".to_string()],
            category: "sports".to_string(),
        }
    }

    fn project_info() -> ProjectInfo {
        ProjectInfo {
            project_id: Uuid::new_v4(),
            name: "Competitor watch".to_string(),
            target_product_name: None,
            budget: None,
            category: Some("sports".to_string()),
        }
    }

    fn service_with(
        analytics: FixedAnalytics,
        project: Option<ProjectInfo>,
        store: Arc<RecordingStore>,
        model: ScriptedModel,
    ) -> TaskGeneratorService {
        TaskGeneratorService::new(
            Arc::new(analytics),
            Arc::new(FixedProject { info: project }),
            store,
            TaskGenerationAgent::new(Arc::new(model)),
        )
    }

    fn llm_json(tasks: &[(&str, &str, &str)]) -> String {
        let items: Vec<serde_json::Value> = tasks
            .iter()
            .map(|(name, task_type, priority)| {
                serde_json::json!({
                    "name": name,
                    "description": "Concrete steps and expected outcome.",
                    "task_type": task_type,
                    "priority": priority,
                    "estimated_hours": 2.5,
                    "marketing_focus": "research"
                })
            })
            .collect();
        serde_json::json!({ "tasks": items }).to_string()
    }

    // ── Tests ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_out_of_range_max_tasks_fails_before_any_collaborator_call() {
        for bad in [Some(0), Some(11)] {
            let analytics = FixedAnalytics::some(snapshot(80.0, 1.0, SentimentTrend::Stable));
            let store = Arc::new(RecordingStore::new());
            let service = service_with(
                analytics,
                Some(project_info()),
                store.clone(),
                ScriptedModel::Unavailable,
            );
            let result = service
                .preview(Uuid::new_v4(), Uuid::new_v4(), bad)
                .await;
            assert!(matches!(result, Err(AppError::InvalidRequest(_))));
            assert_eq!(store.created_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_invalid_request_does_not_touch_analytics() {
        let analytics = FixedAnalytics::some(snapshot(80.0, 1.0, SentimentTrend::Stable));
        let analytics = Arc::new(analytics);
        let service = TaskGeneratorService::new(
            analytics.clone(),
            Arc::new(FixedProject {
                info: Some(project_info()),
            }),
            Arc::new(RecordingStore::new()),
            TaskGenerationAgent::new(Arc::new(ScriptedModel::Unavailable)),
        );
        let result = service.preview(Uuid::new_v4(), Uuid::new_v4(), Some(11)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert_eq!(analytics.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_analytics_is_terminal() {
        let service = service_with(
            FixedAnalytics::none(),
            Some(project_info()),
            Arc::new(RecordingStore::new()),
            ScriptedModel::Unavailable,
        );
        let product_id = Uuid::new_v4();
        let result = service.preview(product_id, Uuid::new_v4(), None).await;
        assert!(matches!(result, Err(AppError::AnalyticsMissing(id)) if id == product_id));
    }

    #[tokio::test]
    async fn test_missing_project_is_terminal() {
        let service = service_with(
            FixedAnalytics::some(snapshot(80.0, 1.0, SentimentTrend::Stable)),
            None,
            Arc::new(RecordingStore::new()),
            ScriptedModel::Unavailable,
        );
        let product_id = Uuid::new_v4();
        let result = service.preview(product_id, Uuid::new_v4(), None).await;
        assert!(matches!(result, Err(AppError::ProjectMissing(id)) if id == product_id));
    }

    /// Scenario A: low trust, clean reviews, stable sentiment, agent down.
    #[tokio::test]
    async fn test_agent_unavailable_low_trust_falls_back_to_research_task() {
        let service = service_with(
            FixedAnalytics::some(snapshot(35.0, 2.0, SentimentTrend::Stable)),
            Some(project_info()),
            Arc::new(RecordingStore::new()),
            ScriptedModel::Unavailable,
        );

        let result = service
            .preview(Uuid::new_v4(), Uuid::new_v4(), Some(5))
            .await
            .unwrap();

        assert!(result.used_fallback);
        assert_eq!(result.tasks_generated, result.tasks.len());
        assert!(result.tasks.iter().any(|t| {
            t.task_type == TaskType::MarketingResearch
                && t.priority == TaskPriority::High
                && t.stage_metadata["source"] == "fallback"
        }));
    }

    /// Scenario B: multiple fallback rules fire, truncated to max_tasks,
    /// high priority ordered first.
    #[tokio::test]
    async fn test_fallback_rules_truncated_and_ordered_by_priority() {
        let service = service_with(
            FixedAnalytics::some(snapshot(85.0, 15.0, SentimentTrend::Declining)),
            Some(project_info()),
            Arc::new(RecordingStore::new()),
            ScriptedModel::Unavailable,
        );

        let result = service
            .preview(Uuid::new_v4(), Uuid::new_v4(), Some(2))
            .await
            .unwrap();

        assert_eq!(result.tasks_generated, 2);
        assert!(result.used_fallback);
        // Declining-sentiment rule is high priority, spam rule is medium.
        assert_eq!(result.tasks[0].priority, TaskPriority::High);
        assert_eq!(result.tasks[0].task_type, TaskType::ContentStrategy);
        assert_eq!(result.tasks[1].priority, TaskPriority::Medium);
        assert_eq!(result.tasks[1].task_type, TaskType::CompetitiveAnalysis);
    }

    /// Scenario C: 7 well-formed candidates, truncated to 5 by priority.
    #[tokio::test]
    async fn test_model_candidates_truncated_by_priority_no_fallback() {
        let response = llm_json(&[
            ("T1", "marketing_research", "low"),
            ("T2", "competitive_analysis", "high"),
            ("T3", "content_strategy", "medium"),
            ("T4", "pricing_strategy", "high"),
            ("T5", "market_positioning", "medium"),
            ("T6", "marketing_research", "medium"),
            ("T7", "content_strategy", "low"),
        ]);
        let service = service_with(
            FixedAnalytics::some(snapshot(70.0, 3.0, SentimentTrend::Improving)),
            Some(project_info()),
            Arc::new(RecordingStore::new()),
            ScriptedModel::Text(response),
        );

        let result = service
            .preview(Uuid::new_v4(), Uuid::new_v4(), Some(5))
            .await
            .unwrap();

        assert_eq!(result.tasks_generated, 5);
        assert!(!result.used_fallback);
        // Highs first in original order, then mediums in original order.
        let names: Vec<&str> = result.tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["T2", "T4", "T3", "T5", "T6"]);
        for task in &result.tasks {
            assert_eq!(task.stage_metadata["source"], "llm");
            assert!(task.estimated_hours > 0.0);
        }
    }

    /// Scenario D: the candidate with an unknown task_type is dropped,
    /// valid ones still come back.
    #[tokio::test]
    async fn test_unknown_task_type_dropped_rest_survive() {
        let response = llm_json(&[
            ("Keep me", "marketing_research", "high"),
            ("Drop me", "guerrilla_marketing", "high"),
        ]);
        let service = service_with(
            FixedAnalytics::some(snapshot(70.0, 3.0, SentimentTrend::Stable)),
            Some(project_info()),
            Arc::new(RecordingStore::new()),
            ScriptedModel::Text(response),
        );

        let result = service
            .preview(Uuid::new_v4(), Uuid::new_v4(), None)
            .await
            .unwrap();

        assert_eq!(result.tasks_generated, 1);
        assert_eq!(result.tasks[0].name, "Keep me");
        assert!(!result.used_fallback);
    }

    #[tokio::test]
    async fn test_model_refusal_text_triggers_fallback() {
        let service = service_with(
            FixedAnalytics::some(snapshot(90.0, 1.0, SentimentTrend::Stable)),
            Some(project_info()),
            Arc::new(RecordingStore::new()),
            ScriptedModel::Text("I cannot help with that.".to_string()),
        );

        let result = service
            .preview(Uuid::new_v4(), Uuid::new_v4(), None)
            .await
            .unwrap();

        assert!(result.used_fallback);
        assert_eq!(result.tasks[0].task_type, TaskType::MarketPositioning);
    }

    #[tokio::test]
    async fn test_preview_never_persists() {
        let store = Arc::new(RecordingStore::new());
        let service = service_with(
            FixedAnalytics::some(snapshot(35.0, 2.0, SentimentTrend::Stable)),
            Some(project_info()),
            store.clone(),
            ScriptedModel::Unavailable,
        );

        service
            .preview(Uuid::new_v4(), Uuid::new_v4(), None)
            .await
            .unwrap();

        assert_eq!(store.created_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_and_save_persists_every_returned_task() {
        let store = Arc::new(RecordingStore::new());
        let response = llm_json(&[
            ("S1", "marketing_research", "high"),
            ("S2", "content_strategy", "low"),
        ]);
        let service = service_with(
            FixedAnalytics::some(snapshot(70.0, 3.0, SentimentTrend::Stable)),
            Some(project_info()),
            store.clone(),
            ScriptedModel::Text(response),
        );

        let result = service
            .generate_and_save(Uuid::new_v4(), Uuid::new_v4(), Some(5))
            .await
            .unwrap();

        assert_eq!(result.tasks_generated, 2);
        assert_eq!(store.created_count(), 2);
        assert!(result.tasks.iter().all(|t| t.id.is_some()));
    }

    #[tokio::test]
    async fn test_single_persistence_failure_excludes_item_but_continues() {
        let store = Arc::new(RecordingStore::failing_on(&["S2"]));
        let response = llm_json(&[
            ("S1", "marketing_research", "high"),
            ("S2", "content_strategy", "high"),
            ("S3", "pricing_strategy", "medium"),
        ]);
        let service = service_with(
            FixedAnalytics::some(snapshot(70.0, 3.0, SentimentTrend::Stable)),
            Some(project_info()),
            store.clone(),
            ScriptedModel::Text(response),
        );

        let result = service
            .generate_and_save(Uuid::new_v4(), Uuid::new_v4(), Some(5))
            .await
            .unwrap();

        // 3 proposals, 1 failed insert: tasks_generated = n - k.
        assert_eq!(result.tasks_generated, 2);
        assert_eq!(store.created_count(), 2);
        assert!(result.tasks.iter().all(|t| t.name != "S2"));
    }

    #[tokio::test]
    async fn test_fully_failed_persistence_batch_is_an_error_not_empty_success() {
        // Agent down, benign snapshot: fallback yields one positioning task,
        // and the store rejects every insert.
        let store = Arc::new(RecordingStore::failing_always());
        let service = service_with(
            FixedAnalytics::some(snapshot(90.0, 1.0, SentimentTrend::Stable)),
            Some(project_info()),
            store.clone(),
            ScriptedModel::Unavailable,
        );

        let result = service
            .generate_and_save(Uuid::new_v4(), Uuid::new_v4(), Some(5))
            .await;

        assert!(matches!(result, Err(AppError::TotalGenerationFailure(_))));
        assert_eq!(store.created_count(), 0);
    }

    #[tokio::test]
    async fn test_result_respects_bounds_for_valid_requests() {
        for max in [Some(1), Some(3), None, Some(10)] {
            let service = service_with(
                FixedAnalytics::some(snapshot(20.0, 50.0, SentimentTrend::Declining)),
                Some(project_info()),
                Arc::new(RecordingStore::new()),
                ScriptedModel::Unavailable,
            );
            let result = service
                .preview(Uuid::new_v4(), Uuid::new_v4(), max)
                .await
                .unwrap();
            let bound = max.unwrap_or(MAX_TASKS_DEFAULT) as usize;
            assert!(result.tasks_generated > 0);
            assert!(result.tasks_generated <= bound);
            assert_eq!(result.tasks_generated, result.tasks.len());
        }
    }

    #[test]
    fn test_validate_max_tasks_bounds() {
        assert_eq!(validate_max_tasks(None).unwrap(), 5);
        assert_eq!(validate_max_tasks(Some(1)).unwrap(), 1);
        assert_eq!(validate_max_tasks(Some(10)).unwrap(), 10);
        assert!(validate_max_tasks(Some(0)).is_err());
        assert!(validate_max_tasks(Some(11)).is_err());
    }
}
