use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the upstream `product_analytics` table. The analytics service
/// owns writes; this API only reads the latest snapshot per product.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductAnalyticsRow {
    pub product_id: Uuid,
    pub trust_score: f64,
    pub review_count: i64,
    pub spam_percentage: f64,
    pub sentiment_trend: String,
    /// JSONB array of theme strings, ordered by prominence.
    pub positive_themes: Value,
    pub category: String,
    pub computed_at: DateTime<Utc>,
}
