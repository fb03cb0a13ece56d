//! Analytics gateway — read-only access to the upstream analytics snapshot.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analytics::ProductAnalyticsRow;
use crate::taskgen::types::{ProductAnalyticsSnapshot, SentimentTrend};

/// Supplies the already-computed analytics snapshot for a product.
/// Returns `None` when analytics have not been computed yet — the caller
/// turns that into `AppError::AnalyticsMissing`.
#[async_trait]
pub trait AnalyticsGateway: Send + Sync {
    async fn analyze(
        &self,
        product_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProductAnalyticsSnapshot>, AppError>;
}

pub struct PgAnalyticsGateway {
    pool: PgPool,
}

impl PgAnalyticsGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsGateway for PgAnalyticsGateway {
    async fn analyze(
        &self,
        product_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProductAnalyticsSnapshot>, AppError> {
        debug!("Fetching analytics snapshot for product {product_id} (user {user_id})");

        let row = sqlx::query_as::<_, ProductAnalyticsRow>(
            r#"
            SELECT product_id, trust_score, review_count, spam_percentage,
                   sentiment_trend, positive_themes, category, computed_at
            FROM product_analytics
            WHERE product_id = $1
            ORDER BY computed_at DESC
            LIMIT 1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(snapshot_from_row))
    }
}

/// Converts a stored row into the domain snapshot. The analytics store is
/// upstream-owned, so unknown sentiment strings are mapped to `stable` with
/// a warning rather than failing the request.
fn snapshot_from_row(row: ProductAnalyticsRow) -> ProductAnalyticsSnapshot {
    let sentiment_trend = SentimentTrend::from_wire(&row.sentiment_trend).unwrap_or_else(|| {
        warn!(
            "Unknown sentiment_trend '{}' for product {}; treating as stable",
            row.sentiment_trend, row.product_id
        );
        SentimentTrend::Stable
    });

    let positive_themes = match &row.positive_themes {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    ProductAnalyticsSnapshot {
        trust_score: row.trust_score,
        review_count: row.review_count,
        spam_percentage: row.spam_percentage,
        sentiment_trend,
        positive_themes,
        category: row.category,
    }
}
