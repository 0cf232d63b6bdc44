//! Recipe documents: how-to guides loaded from JSON and flattened into index entries.

use crate::index::Entry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub type Result<T> = std::result::Result<T, RecipeError>;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Invalid recipe {}: missing required field '{parent}.{field}'", .path.display())]
    MissingField { path: PathBuf, parent: &'static str, field: &'static str },

    #[error("Invalid recipe {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("Invalid recipe {}: JSON decode error: {source}", .path.display())]
    Json { path: PathBuf, source: serde_json::Error },

    #[error("failed to read recipe {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Recipe directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub title: String,
    pub action: String,
    pub details: String,
    #[serde(default)]
    pub checks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub goal: String,
    pub steps: Vec<RecipeStep>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub required_items: Vec<String>,
    #[serde(default)]
    pub optional_items: Vec<String>,
    #[serde(default)]
    pub environment: Vec<String>,
    #[serde(default)]
    pub hazards: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl Recipe {
    /// Flatten every searchable field into one entry keyed by the recipe name.
    pub fn as_entry(&self) -> Entry {
        let mut chunks: Vec<String> = vec![
            self.name.clone(),
            self.goal.clone(),
            self.tags.join(" "),
            self.required_items.join(" "),
            self.optional_items.join(" "),
            self.environment.join(" "),
            self.hazards.join(" "),
            self.notes.clone(),
        ];
        for step in &self.steps {
            chunks.extend([step.title.clone(), step.action.clone(), step.details.clone(), step.checks.join(" ")]);
        }
        let text = chunks.into_iter().filter(|c| !c.is_empty()).collect::<Vec<_>>().join("\n");

        Entry::new(self.name.clone(), text, "recipe")
            .with_metadata("goal", self.goal.clone())
            .with_metadata("tags", self.tags.join(","))
    }

    /// Validate a decoded JSON document. `path` is only used in error messages.
    pub fn from_value(data: &Value, path: &Path) -> Result<Self> {
        let obj = as_object(data, "recipe", path)?;
        let name = require(obj, "recipe", "name", path)?;
        let goal = require(obj, "recipe", "goal", path)?;
        let steps_raw = require(obj, "recipe", "steps", path)?;

        let name = non_empty_str(name, "name", path)?;
        let goal = non_empty_str(goal, "goal", path)?;
        let steps = match steps_raw {
            Value::Array(items) => items.iter().map(|s| parse_step(s, path)).collect::<Result<Vec<_>>>()?,
            _ => return Err(invalid(path, "steps must be a list")),
        };

        let notes = match obj.get("notes") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(_) => return Err(invalid(path, "notes must be a string if provided")),
        };

        Ok(Recipe {
            name,
            goal,
            steps,
            tags: string_list(obj, "tags", path)?,
            required_items: string_list(obj, "required_items", path)?,
            optional_items: string_list(obj, "optional_items", path)?,
            environment: string_list(obj, "environment", path)?,
            hazards: string_list(obj, "hazards", path)?,
            notes,
        })
    }
}

fn parse_step(data: &Value, path: &Path) -> Result<RecipeStep> {
    let obj = as_object(data, "steps[]", path)?;
    let title = require(obj, "steps[]", "title", path)?;
    let action = require(obj, "steps[]", "action", path)?;
    let details = require(obj, "steps[]", "details", path)?;

    let title = non_empty_str(title, "steps[].title", path)?;
    let action = non_empty_str(action, "steps[].action", path)?;
    let details = non_empty_str(details, "steps[].details", path)?;

    // checks keep empty items, unlike the top-level lists
    let checks = match obj.get("checks") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(|s| s.trim().to_string()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| invalid(path, "steps[].checks must be a list of strings if provided"))?,
        Some(_) => return Err(invalid(path, "steps[].checks must be a list of strings if provided")),
    };

    Ok(RecipeStep { title, action, details, checks })
}

fn as_object<'a>(data: &'a Value, what: &str, path: &Path) -> Result<&'a Map<String, Value>> {
    data.as_object().ok_or_else(|| invalid(path, &format!("{what} must be a JSON object")))
}

fn require<'a>(obj: &'a Map<String, Value>, parent: &'static str, field: &'static str, path: &Path) -> Result<&'a Value> {
    obj.get(field).ok_or_else(|| RecipeError::MissingField { path: path.to_path_buf(), parent, field })
}

fn non_empty_str(value: &Value, what: &str, path: &Path) -> Result<String> {
    match value.as_str().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(invalid(path, &format!("{what} must be a non-empty string"))),
    }
}

/// Optional list of strings; null counts as empty, blank items are dropped.
fn string_list(obj: &Map<String, Value>, key: &str, path: &Path) -> Result<Vec<String>> {
    let err = || invalid(path, &format!("{key} must be a list of strings if provided"));
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let s = item.as_str().ok_or_else(err)?.trim();
                if !s.is_empty() {
                    out.push(s.to_string());
                }
            }
            Ok(out)
        }
        Some(_) => Err(err()),
    }
}

fn invalid(path: &Path, reason: &str) -> RecipeError {
    RecipeError::Invalid { path: path.to_path_buf(), reason: reason.to_string() }
}

pub fn load_recipe_file(path: &Path) -> Result<Recipe> {
    let raw = std::fs::read_to_string(path).map_err(|source| RecipeError::Io { path: path.to_path_buf(), source })?;
    let data: Value = serde_json::from_str(&raw).map_err(|source| RecipeError::Json { path: path.to_path_buf(), source })?;
    Recipe::from_value(&data, path)
}

/// Load every `*.json` file under `dir`, recursively, in path order.
pub fn load_recipes_from_dir(dir: &Path) -> Result<Vec<Recipe>> {
    if !dir.exists() {
        return Err(RecipeError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();

    let recipes = files.iter().map(|p| load_recipe_file(p)).collect::<Result<Vec<_>>>()?;
    tracing::info!(count = recipes.len(), dir = %dir.display(), "loaded recipes");
    Ok(recipes)
}
