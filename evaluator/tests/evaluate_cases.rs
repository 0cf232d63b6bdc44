use evaluator::{load_cases, run_case, summarize, write_csv, write_json, EvalCase};
use howto_core::{Recipe, RecipeLibrary, RecipeStep};
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

fn recipe(name: &str, goal: &str, details: &str) -> Recipe {
    Recipe {
        name: name.into(),
        goal: goal.into(),
        steps: vec![RecipeStep { title: "Step".into(), action: "act".into(), details: details.into(), checks: vec![] }],
        tags: vec![],
        required_items: vec![],
        optional_items: vec![],
        environment: vec![],
        hazards: vec![],
        notes: String::new(),
    }
}

fn library() -> RecipeLibrary {
    RecipeLibrary::new([
        recipe("shelter", "build a wooden shelter before nightfall", "oak planks walls roof"),
        recipe("iron_tools", "craft iron tools", "smelt raw iron in a furnace"),
        recipe("farm", "start a wheat farm", "till dirt near water and plant seeds"),
    ])
}

fn case(id: &str, prompt: &str, good: &[&str], bad: &[&str]) -> EvalCase {
    EvalCase {
        id: id.into(),
        prompt: prompt.into(),
        expect_good: good.iter().map(|s| s.to_string()).collect(),
        expect_bad: bad.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn passing_and_failing_cases() {
    let mut lib = library();
    let ok = run_case(&mut lib, &case("c1", "wooden shelter for the night", &["shelter"], &["farm"]), 1);
    assert!(ok.passed());
    assert_eq!(ok.retrieved, vec!["shelter"]);

    let bad = run_case(&mut lib, &case("c2", "iron furnace", &["farm"], &["iron_tools"]), 1);
    assert!(!bad.passed());
    assert_eq!(bad.missing_good, vec!["farm"]);
    assert_eq!(bad.retrieved_bad, vec!["iron_tools"]);

    let summary = summarize(&[ok, bad]);
    assert_eq!((summary.total, summary.passed, summary.failed), (2, 1, 1));
}

#[test]
fn blank_prompt_retrieves_nothing() {
    let mut lib = library();
    let r = run_case(&mut lib, &case("blank", "   ", &["shelter"], &[]), 3);
    assert!(r.retrieved.is_empty());
    assert!(!r.passed());
}

#[test]
fn writes_reports() {
    let dir = tempdir().unwrap();
    let cases_path = dir.path().join("cases.json");
    fs::write(
        &cases_path,
        r#"[{"id": "wheat", "prompt": "plant wheat seeds", "expect_good": ["farm"]},
            {"id": "tools", "prompt": "iron tools", "expect_good": ["iron_tools"], "expect_bad": ["farm"]}]"#,
    )
    .unwrap();

    let mut lib = library();
    let cases = load_cases(&cases_path).unwrap();
    let results: Vec<_> = cases.iter().map(|c| run_case(&mut lib, c, 2)).collect();

    let csv_path = dir.path().join("out/results.csv");
    let json_path = dir.path().join("out/results.json");
    write_csv(&results, &csv_path).unwrap();
    write_json(&results, &json_path).unwrap();

    let csv = fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next().unwrap(), "case_id,passed,prompt,retrieved,expect_good,expect_bad,missing_good,retrieved_bad");
    assert!(lines.next().unwrap().starts_with("wheat,true,plant wheat seeds,farm | "));

    let json: Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["summary"]["total"], 2);
    assert_eq!(json["summary"]["passed"], 2);
    assert_eq!(json["results"][1]["case_id"], "tools");
    assert_eq!(json["results"][1]["retrieved"][0], "iron_tools");
    assert!(json["generated_at"].as_str().unwrap().contains('T'));
}

#[test]
fn bundled_cases_retrieve_something() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let mut lib = RecipeLibrary::from_directory(&root.join("recipes")).unwrap();
    let cases = load_cases(&root.join("evaluations/rag_cases.json")).unwrap();
    assert!(cases.len() >= 2);
    for case in &cases {
        let r = run_case(&mut lib, case, 6);
        assert!(!r.retrieved.is_empty());
        assert!(r.passed());
    }
}
