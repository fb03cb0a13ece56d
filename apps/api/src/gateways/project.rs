//! Project gateway — resolves the project a product is linked to.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::project::ProjectRow;
use crate::taskgen::types::ProjectInfo;

/// Supplies project context for a product. Returns `None` when the product
/// is not linked to any project — the caller turns that into
/// `AppError::ProjectMissing`.
#[async_trait]
pub trait ProjectGateway: Send + Sync {
    async fn get_context(&self, product_id: Uuid) -> Result<Option<ProjectInfo>, AppError>;
}

pub struct PgProjectGateway {
    pool: PgPool,
}

impl PgProjectGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectGateway for PgProjectGateway {
    async fn get_context(&self, product_id: Uuid) -> Result<Option<ProjectInfo>, AppError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT p.id, p.name, p.target_product_name, p.budget, p.category
            FROM projects p
            JOIN products pr ON pr.project_id = p.id
            WHERE pr.id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|p| ProjectInfo {
            project_id: p.id,
            name: p.name,
            target_product_name: p.target_product_name,
            budget: p.budget,
            category: p.category,
        }))
    }
}
