//! Fallback Task Generator — deterministic, rule-based substitute for model
//! output. Pure function of the analytics snapshot: no model call, no
//! randomness, no external state. Guarantees the pipeline never returns zero
//! tasks for a product with a valid snapshot.

use uuid::Uuid;

use crate::taskgen::types::{
    stage_metadata, ProductAnalyticsSnapshot, SentimentTrend, TaskPriority, TaskProposal, TaskType,
};

/// Threshold below which a competitor's trust score is a research opportunity.
const LOW_TRUST_THRESHOLD: f64 = 50.0;
/// Spam share above which review authenticity becomes a competitive angle.
const SPAM_THRESHOLD: f64 = 10.0;

/// Applies the fixed rule set in order, one task per triggered rule, then
/// truncates to `max_tasks`. If no rule fires, emits one generic positioning
/// task so the result is never empty.
pub fn synthesize(
    product_id: Uuid,
    analytics: &ProductAnalyticsSnapshot,
    max_tasks: u8,
) -> Vec<TaskProposal> {
    let mut tasks = Vec::new();

    if analytics.trust_score < LOW_TRUST_THRESHOLD {
        tasks.push(proposal(
            product_id,
            format!(
                "Research competitors outperforming this product's trust score of {:.1}",
                analytics.trust_score
            ),
            format!(
                "Identify 5 products in the {} category with substantially higher \
                 trust scores. Compare their review profiles, pricing, and messaging \
                 against this competitor (trust score {:.1}/100) and collect the \
                 practices that drive the gap.",
                analytics.category, analytics.trust_score
            ),
            TaskType::MarketingResearch,
            TaskPriority::High,
            4.0,
            "research",
        ));
    }

    if analytics.spam_percentage > SPAM_THRESHOLD {
        tasks.push(proposal(
            product_id,
            format!(
                "Analyze review authenticity ({:.1}% flagged as spam)",
                analytics.spam_percentage
            ),
            format!(
                "With {:.1}% of this competitor's {} reviews flagged as spam, audit \
                 how inflated its public rating is, estimate its organic sentiment, \
                 and document the authenticity gap as a competitive talking point.",
                analytics.spam_percentage, analytics.review_count
            ),
            TaskType::CompetitiveAnalysis,
            TaskPriority::Medium,
            3.0,
            "analysis",
        ));
    }

    if analytics.sentiment_trend == SentimentTrend::Declining {
        tasks.push(proposal(
            product_id,
            "Build a content plan around the competitor's declining sentiment".to_string(),
            "Review sentiment for this competitor is trending down. Mine recent \
             negative feedback for recurring complaints, then draft content and \
             messaging that positions our product as the answer to each complaint."
                .to_string(),
            TaskType::ContentStrategy,
            TaskPriority::High,
            2.0,
            "strategy",
        ));
    }

    if tasks.is_empty() {
        tasks.push(proposal(
            product_id,
            format!("Map the competitive positioning in {}", analytics.category),
            format!(
                "This competitor shows no acute weakness (trust score {:.1}, spam \
                 {:.1}%, sentiment {}). Map where it sits in the {} market: target \
                 audience, price band, and headline selling points, and identify \
                 positioning gaps we can occupy.",
                analytics.trust_score,
                analytics.spam_percentage,
                analytics.sentiment_trend.as_wire(),
                analytics.category
            ),
            TaskType::MarketPositioning,
            TaskPriority::Medium,
            2.5,
            "analysis",
        ));
    }

    tasks.truncate(max_tasks as usize);
    tasks
}

#[allow(clippy::too_many_arguments)]
fn proposal(
    product_id: Uuid,
    name: String,
    description: String,
    task_type: TaskType,
    priority: TaskPriority,
    estimated_hours: f64,
    focus: &str,
) -> TaskProposal {
    TaskProposal {
        id: None,
        name,
        description,
        task_type,
        priority,
        status: "pending".to_string(),
        estimated_hours,
        stage_metadata: stage_metadata("fallback", product_id, focus),
    }
}
