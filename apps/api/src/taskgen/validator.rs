//! Task Validator — normalizes raw model candidates against the task schema.
//!
//! Policy: task_type is structural (unknown → drop the candidate), priority
//! is advisory (unknown → default medium), estimated_hours is clamped to a
//! per-type positive default. Never errors — malformed input degrades to
//! fewer output items, each drop logged individually.

use tracing::debug;
use uuid::Uuid;

use crate::taskgen::agent::RawCandidate;
use crate::taskgen::types::{stage_metadata, TaskPriority, TaskProposal, TaskType};

/// Normalizes candidates into validated proposals, tagged `source = "llm"`.
/// The output is never longer than the input.
pub fn normalize(candidates: Vec<RawCandidate>, product_id: Uuid) -> Vec<TaskProposal> {
    let total = candidates.len();
    let proposals: Vec<TaskProposal> = candidates
        .into_iter()
        .filter_map(|c| normalize_one(c, product_id))
        .collect();

    let dropped = total - proposals.len();
    if dropped > 0 {
        debug!("Validator dropped {dropped}/{total} candidates for product {product_id}");
    }
    proposals
}

fn normalize_one(candidate: RawCandidate, product_id: Uuid) -> Option<TaskProposal> {
    let name = candidate.name.as_deref().unwrap_or("").trim().to_string();
    if name.is_empty() {
        debug!("Dropping candidate with empty name");
        return None;
    }

    let description = candidate
        .description
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();
    if description.is_empty() {
        debug!("Dropping candidate '{name}' with empty description");
        return None;
    }

    let Some(task_type) = candidate.task_type.as_deref().and_then(TaskType::from_wire) else {
        debug!(
            "Dropping candidate '{name}' with unknown task_type {:?}",
            candidate.task_type
        );
        return None;
    };

    let priority = candidate
        .priority
        .as_deref()
        .and_then(TaskPriority::from_wire)
        .unwrap_or(TaskPriority::Medium);

    let estimated_hours = match candidate.estimated_hours {
        Some(h) if h > 0.0 && h.is_finite() => h,
        _ => task_type.default_hours(),
    };

    let focus = candidate
        .marketing_focus
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| task_type.default_focus());

    Some(TaskProposal {
        id: None,
        name,
        description,
        task_type,
        priority,
        status: "pending".to_string(),
        estimated_hours,
        stage_metadata: stage_metadata("llm", product_id, focus),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, task_type: &str) -> RawCandidate {
        RawCandidate {
            name: Some(name.to_string()),
            description: Some("Do the thing carefully.".to_string()),
            task_type: Some(task_type.to_string()),
            priority: Some("high".to_string()),
            estimated_hours: Some(3.0),
            marketing_focus: Some("research".to_string()),
        }
    }

    #[test]
    fn test_valid_candidate_passes_through() {
        let product_id = Uuid::new_v4();
        let proposals = normalize(vec![candidate("Research rivals", "marketing_research")], product_id);
        assert_eq!(proposals.len(), 1);
        let p = &proposals[0];
        assert_eq!(p.name, "Research rivals");
        assert_eq!(p.task_type, TaskType::MarketingResearch);
        assert_eq!(p.priority, TaskPriority::High);
        assert_eq!(p.status, "pending");
        assert!((p.estimated_hours - 3.0).abs() < f64::EPSILON);
        assert_eq!(p.stage_metadata["source"], "llm");
        assert_eq!(p.stage_metadata["product_id"], product_id.to_string());
        assert_eq!(p.stage_metadata["marketing_focus"], "research");
    }

    #[test]
    fn test_empty_name_after_trim_is_dropped() {
        let mut c = candidate("   ", "marketing_research");
        c.name = Some("   ".to_string());
        assert!(normalize(vec![c], Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_missing_description_is_dropped() {
        let mut c = candidate("Name", "marketing_research");
        c.description = None;
        assert!(normalize(vec![c], Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_unknown_task_type_is_dropped_but_rest_survive() {
        let proposals = normalize(
            vec![
                candidate("A", "growth_hacking"),
                candidate("B", "competitive_analysis"),
            ],
            Uuid::new_v4(),
        );
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].name, "B");
    }

    #[test]
    fn test_unknown_priority_defaults_to_medium() {
        let mut c = candidate("A", "content_strategy");
        c.priority = Some("urgent".to_string());
        let proposals = normalize(vec![c], Uuid::new_v4());
        assert_eq!(proposals[0].priority, TaskPriority::Medium);
    }

    #[test]
    fn test_missing_priority_defaults_to_medium() {
        let mut c = candidate("A", "content_strategy");
        c.priority = None;
        let proposals = normalize(vec![c], Uuid::new_v4());
        assert_eq!(proposals[0].priority, TaskPriority::Medium);
    }

    #[test]
    fn test_bad_estimated_hours_clamped_to_type_default() {
        for bad in [Some(0.0), Some(-2.0), Some(f64::NAN), None] {
            let mut c = candidate("A", "marketing_research");
            c.estimated_hours = bad;
            let proposals = normalize(vec![c], Uuid::new_v4());
            assert!((proposals[0].estimated_hours - 4.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_missing_focus_defaults_per_type() {
        let mut c = candidate("A", "pricing_strategy");
        c.marketing_focus = None;
        let proposals = normalize(vec![c], Uuid::new_v4());
        assert_eq!(proposals[0].stage_metadata["marketing_focus"], "strategy");
    }

    #[test]
    fn test_name_and_description_are_trimmed() {
        let mut c = candidate("  Padded name  ", "marketing_research");
        c.description = Some("  padded description  ".to_string());
        let proposals = normalize(vec![c], Uuid::new_v4());
        assert_eq!(proposals[0].name, "Padded name");
        assert_eq!(proposals[0].description, "padded description");
    }

    #[test]
    fn test_output_never_longer_than_input() {
        let proposals = normalize(vec![], Uuid::new_v4());
        assert!(proposals.is_empty());
    }
}
