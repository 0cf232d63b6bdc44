//! Retrieval of recipe knowledge for planner prompts.
//!
//! Builds a search query from the goal, optional mission context and a short
//! digest of the world snapshot, then renders the best recipes as one-line facts.

use crate::library::RecipeLibrary;
use crate::recipe::Recipe;
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_MAX_STEPS: usize = 3;
pub const SNAPSHOT_HINT_FIELDS: usize = 6;
const MAX_DETAIL_CHARS: usize = 180;

#[derive(Debug, Clone, Copy)]
pub struct KnowledgeOptions {
    pub top_k: usize,
    /// Steps rendered per recipe fact.
    pub max_steps: usize,
}

impl Default for KnowledgeOptions {
    fn default() -> Self { Self { top_k: DEFAULT_TOP_K, max_steps: DEFAULT_MAX_STEPS } }
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeHit {
    pub key: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannerKnowledge {
    pub query: String,
    pub facts: Vec<String>,
    pub hits: Vec<KnowledgeHit>,
}

/// Render a recipe as a single line: name, goal, tags and the first `max_steps` steps.
pub fn format_recipe_fact(recipe: &Recipe, max_steps: usize) -> String {
    let steps: Vec<String> = recipe
        .steps
        .iter()
        .take(max_steps)
        .map(|step| {
            let detail = if step.details.chars().count() > MAX_DETAIL_CHARS {
                format!("{}...", step.details.chars().take(MAX_DETAIL_CHARS - 3).collect::<String>())
            } else {
                step.details.clone()
            };
            let checks = if step.checks.is_empty() {
                String::new()
            } else {
                format!(" Checks: {}", step.checks.iter().take(2).cloned().collect::<Vec<_>>().join(", "))
            };
            format!("{} – {}: {}{}", step.title, step.action, detail, checks)
        })
        .collect();

    let steps_text = if steps.is_empty() { "No steps provided".to_string() } else { steps.join(" | ") };
    let tags = if recipe.tags.is_empty() { String::new() } else { format!(" Tags: {}.", recipe.tags.join(", ")) };
    format!("{} — goal: {}.{} Steps: {}", recipe.name, recipe.goal, tags, steps_text)
}

/// Short `key: value` digest of the first `max_fields` snapshot fields.
/// Arrays and objects contribute at most three items; empty ones and nulls are skipped.
pub fn snapshot_hints(snapshot: &Value, max_fields: usize) -> String {
    let Some(obj) = snapshot.as_object() else { return String::new() };
    let mut hints = Vec::new();
    for (key, value) in obj.iter().take(max_fields) {
        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => hints.push(format!("{key}: {}", plain(value))),
            Value::Array(items) => {
                let preview = items.iter().take(3).map(plain).collect::<Vec<_>>().join(", ");
                if !preview.is_empty() {
                    hints.push(format!("{key}: {preview}"));
                }
            }
            Value::Object(map) => {
                let nested = map.iter().take(3).map(|(k, v)| format!("{k}={}", plain(v))).collect::<Vec<_>>().join(", ");
                if !nested.is_empty() {
                    hints.push(format!("{key}: {nested}"));
                }
            }
            Value::Null => {}
        }
    }
    hints.join("; ")
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Search `library` for recipes relevant to the goal and format them as facts.
///
/// An explicit non-empty `query` replaces the generated one.
pub fn retrieve_planning_knowledge(
    goal: &str,
    snapshot: &Value,
    library: &mut RecipeLibrary,
    context: Option<&str>,
    query: Option<&str>,
    options: KnowledgeOptions,
) -> PlannerKnowledge {
    let search_query = match query.filter(|q| !q.is_empty()) {
        Some(q) => q.to_string(),
        None => {
            let hint = snapshot_hints(snapshot, SNAPSHOT_HINT_FIELDS);
            [goal, context.unwrap_or(""), hint.as_str()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        }
    };

    let hits: Vec<KnowledgeHit> = library
        .search(&search_query, options.top_k)
        .into_iter()
        .map(|r| KnowledgeHit { key: r.entry.key.clone(), score: r.score })
        .collect();

    let mut facts = Vec::with_capacity(hits.len());
    for hit in &hits {
        match library.recipe(&hit.key) {
            Some(recipe) => facts.push(format_recipe_fact(recipe, options.max_steps)),
            None => tracing::debug!(key = %hit.key, "no recipe for retrieved key"),
        }
    }

    tracing::debug!(
        query = %search_query,
        facts = facts.len(),
        keys = ?hits.iter().map(|h| h.key.as_str()).collect::<Vec<_>>(),
        "retrieved planner knowledge"
    );
    PlannerKnowledge { query: search_query, facts, hits }
}

/// The "Helpful knowledge" block of a planner prompt; empty when there are no facts.
pub fn render_knowledge_section(facts: &[String]) -> String {
    if facts.is_empty() {
        return String::new();
    }
    let bullets = facts.iter().map(|f| format!("- {f}")).collect::<Vec<_>>().join("\n");
    format!("Helpful knowledge:\n{bullets}")
}
