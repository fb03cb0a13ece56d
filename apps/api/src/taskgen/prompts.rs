// All LLM prompt constants for the task generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for marketing task generation — enforces JSON-only output.
pub const TASKGEN_SYSTEM: &str = "You are an expert marketing strategist and \
    market researcher generating concrete, actionable marketing tasks from \
    competitor product analytics. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Task generation prompt template.
/// Replace: {scope_instruction}, {product_id}, {category}, {trust_score},
///          {review_count}, {spam_percentage}, {sentiment_trend},
///          {positive_themes}, {project_context}, {task_types},
///          {priorities}, {max_tasks}
pub const TASKGEN_PROMPT_TEMPLATE: &str = r#"{scope_instruction}

COMPETITOR PRODUCT UNDER ANALYSIS:
- Product ID: {product_id}
- Category: {category}

ANALYTICS SNAPSHOT (source of truth — base every task on these signals):
- Trust score: {trust_score}/100
- Review count: {review_count}
- Spam percentage: {spam_percentage}%
- Sentiment trend: {sentiment_trend}
- Key positive themes: {positive_themes}

PROJECT CONTEXT:
{project_context}

Generate AT MOST {max_tasks} marketing tasks. Return a JSON object:
{
  "tasks": [
    {
      "name": "Short, specific task name (e.g. 'Research 5 competitors with trust score > 80')",
      "description": "Detailed description: purpose, concrete steps, data to collect, expected outcome",
      "task_type": "one of: {task_types}",
      "priority": "one of: {priorities}",
      "estimated_hours": 2.5,
      "marketing_focus": "research|strategy|execution|analysis"
    }
  ]
}

HARD RULES:
1. `task_type` MUST be exactly one of: {task_types} — no other values
2. `priority` MUST be exactly one of: {priorities}
3. Return AT MOST {max_tasks} tasks
4. Every task must be grounded in the analytics snapshot above — reference
   the trust score, spam level, sentiment, or themes it responds to
5. `estimated_hours` must be a positive number
6. Prefer tasks that exploit the competitor's weaknesses (low trust, spam
   concerns, declining sentiment) or learn from their strengths (positive themes)"#;
