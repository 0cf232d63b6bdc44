//! Retrieval evaluation: run prompts against a recipe library and check the
//! returned keys against expected-good and expected-bad sets.

use anyhow::{Context, Result};
use howto_core::RecipeLibrary;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct EvalCase {
    pub id: String,
    pub prompt: String,
    #[serde(default)]
    pub expect_good: Vec<String>,
    #[serde(default)]
    pub expect_bad: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub case_id: String,
    pub prompt: String,
    pub retrieved: Vec<String>,
    pub expect_good: Vec<String>,
    pub expect_bad: Vec<String>,
    pub missing_good: Vec<String>,
    pub retrieved_bad: Vec<String>,
}

impl CaseResult {
    pub fn passed(&self) -> bool { self.missing_good.is_empty() && self.retrieved_bad.is_empty() }
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    case_id: &'a str,
    passed: bool,
    prompt: &'a str,
    retrieved: String,
    expect_good: String,
    expect_bad: String,
    missing_good: String,
    retrieved_bad: String,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    case_id: &'a str,
    passed: bool,
    retrieved: &'a [String],
    missing_good: &'a [String],
    retrieved_bad: &'a [String],
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: Summary,
    generated_at: String,
    results: Vec<JsonResult<'a>>,
}

pub fn load_cases(path: &Path) -> Result<Vec<EvalCase>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading cases {}", path.display()))?;
    let cases = serde_json::from_str(&raw).with_context(|| format!("parsing cases {}", path.display()))?;
    Ok(cases)
}

pub fn run_case(library: &mut RecipeLibrary, case: &EvalCase, top_k: usize) -> CaseResult {
    let retrieved: Vec<String> = library.search(&case.prompt, top_k).into_iter().map(|r| r.entry.key.clone()).collect();
    let seen: HashSet<&str> = retrieved.iter().map(String::as_str).collect();
    let missing_good = case.expect_good.iter().filter(|k| !seen.contains(k.as_str())).cloned().collect();
    let retrieved_bad = case.expect_bad.iter().filter(|k| seen.contains(k.as_str())).cloned().collect();

    let result = CaseResult {
        case_id: case.id.clone(),
        prompt: case.prompt.clone(),
        retrieved,
        expect_good: case.expect_good.clone(),
        expect_bad: case.expect_bad.clone(),
        missing_good,
        retrieved_bad,
    };
    tracing::debug!(case = %result.case_id, passed = result.passed(), retrieved = ?result.retrieved, "evaluated case");
    result
}

pub fn summarize(results: &[CaseResult]) -> Summary {
    let passed = results.iter().filter(|r| r.passed()).count();
    Summary { total: results.len(), passed, failed: results.len() - passed }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn write_csv(results: &[CaseResult], path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let mut w = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for r in results {
        w.serialize(CsvRow {
            case_id: &r.case_id,
            passed: r.passed(),
            prompt: &r.prompt,
            retrieved: r.retrieved.join(" | "),
            expect_good: r.expect_good.join(" | "),
            expect_bad: r.expect_bad.join(" | "),
            missing_good: r.missing_good.join(" | "),
            retrieved_bad: r.retrieved_bad.join(" | "),
        })?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_json(results: &[CaseResult], path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let report = JsonReport {
        summary: summarize(results),
        generated_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        results: results
            .iter()
            .map(|r| JsonResult {
                case_id: &r.case_id,
                passed: r.passed(),
                retrieved: &r.retrieved,
                missing_good: &r.missing_good,
                retrieved_bad: &r.retrieved_bad,
            })
            .collect(),
    };
    fs::write(path, serde_json::to_string_pretty(&report)?)?;
    Ok(())
}
