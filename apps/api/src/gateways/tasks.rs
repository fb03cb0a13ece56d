//! Task store — persistence gateway for generated task proposals.
//!
//! Each `create` is independently atomic. The pipeline makes no cross-item
//! transaction guarantee: a failed insert is logged by the caller and the
//! batch continues.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::task::TaskRow;
use crate::taskgen::types::TaskProposal;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persists one proposal and returns it with its assigned id.
    async fn create(&self, proposal: &TaskProposal) -> Result<TaskProposal, AppError>;
}

pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, proposal: &TaskProposal) -> Result<TaskProposal, AppError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks
                (id, name, description, task_type, priority, status,
                 estimated_hours, stage_metadata, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), now())
            RETURNING id, name, description, task_type, priority, status,
                      estimated_hours, stage_metadata, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&proposal.name)
        .bind(&proposal.description)
        .bind(proposal.task_type.as_wire())
        .bind(proposal.priority.as_wire())
        .bind(&proposal.status)
        .bind(proposal.estimated_hours)
        .bind(&proposal.stage_metadata)
        .fetch_one(&self.pool)
        .await?;

        debug!("Persisted task {} ('{}')", row.id, row.name);

        Ok(TaskProposal {
            id: Some(row.id),
            ..proposal.clone()
        })
    }
}
