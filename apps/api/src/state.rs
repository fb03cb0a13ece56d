use std::sync::Arc;

use crate::taskgen::service::TaskGeneratorService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The task generation pipeline. Holds its collaborators (analytics,
    /// project, and task-store gateways plus the model client) behind trait
    /// objects so tests can substitute them.
    pub task_generator: Arc<TaskGeneratorService>,
}
