use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use evaluator::{load_cases, run_case, summarize, write_csv, write_json};
use howto_core::knowledge::{render_knowledge_section, retrieve_planning_knowledge, KnowledgeOptions};
use howto_core::RecipeLibrary;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "evaluator")]
#[command(about = "Evaluate and inspect how-to recipe retrieval", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run retrieval cases and export CSV and JSON results
    Run {
        /// Directory of recipe JSON files
        #[arg(long, default_value = "recipes")]
        recipes_dir: PathBuf,
        /// JSON array of evaluation cases
        #[arg(long, default_value = "evaluations/rag_cases.json")]
        cases: PathBuf,
        #[arg(long, default_value_t = 5)]
        top_k: usize,
        #[arg(long, default_value = "evaluations/results/rag_eval_results.csv")]
        csv: PathBuf,
        #[arg(long, default_value = "evaluations/results/rag_eval_results.json")]
        json: PathBuf,
    },
    /// Print the ranked recipe keys for a query
    Query {
        #[arg(long, default_value = "recipes")]
        recipes_dir: PathBuf,
        #[arg(long, default_value_t = howto_core::knowledge::DEFAULT_TOP_K)]
        top_k: usize,
        query: String,
    },
    /// Print the knowledge block a planner prompt would receive for a goal
    Knowledge {
        #[arg(long, default_value = "recipes")]
        recipes_dir: PathBuf,
        /// World snapshot as a JSON file
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Mission context appended to the search query
        #[arg(long)]
        context: Option<String>,
        #[arg(long, default_value_t = howto_core::knowledge::DEFAULT_TOP_K)]
        top_k: usize,
        #[arg(long, default_value_t = howto_core::knowledge::DEFAULT_MAX_STEPS)]
        max_steps: usize,
        goal: String,
    },
}

fn main() -> Result<ExitCode> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { recipes_dir, cases, top_k, csv, json } => {
            let mut library = RecipeLibrary::from_directory(&recipes_dir)?;
            let cases = load_cases(&cases)?;
            let results: Vec<_> = cases.iter().map(|case| run_case(&mut library, case, top_k)).collect();
            let summary = summarize(&results);

            write_csv(&results, &csv)?;
            write_json(&results, &json)?;
            tracing::info!(total = summary.total, passed = summary.passed, "evaluation complete");

            println!("RAG evaluation complete: {}/{} passed", summary.passed, summary.total);
            println!("CSV: {}", csv.display());
            println!("JSON: {}", json.display());
            Ok(if summary.failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Query { recipes_dir, top_k, query } => {
            let mut library = RecipeLibrary::from_directory(&recipes_dir)?;
            for (rank, hit) in library.search(&query, top_k).iter().enumerate() {
                println!("{:>2}. {:.4}  {}", rank + 1, hit.score, hit.entry.key);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Knowledge { recipes_dir, snapshot, context, top_k, max_steps, goal } => {
            let mut library = RecipeLibrary::from_directory(&recipes_dir)?;
            let snapshot: serde_json::Value = match snapshot {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading snapshot {}", path.display()))?;
                    serde_json::from_str(&raw).with_context(|| format!("parsing snapshot {}", path.display()))?
                }
                None => serde_json::Value::Object(Default::default()),
            };
            let knowledge = retrieve_planning_knowledge(
                &goal,
                &snapshot,
                &mut library,
                context.as_deref(),
                None,
                KnowledgeOptions { top_k, max_steps },
            );
            println!("Query:\n{}\n", knowledge.query);
            println!("{}", render_knowledge_section(&knowledge.facts));
            Ok(ExitCode::SUCCESS)
        }
    }
}
