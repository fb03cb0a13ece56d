use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Project row joined through a product's project link.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub target_product_name: Option<String>,
    pub budget: Option<String>,
    pub category: Option<String>,
}
