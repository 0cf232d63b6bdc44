//! TF-IDF retrieval of how-to recipes for planner prompts.

pub mod index;
pub mod knowledge;
pub mod library;
pub mod recipe;
pub mod tokenizer;

pub use index::{Entry, HowToIndex, IndexStatus, SearchResult, SparseVector};
pub use knowledge::{retrieve_planning_knowledge, KnowledgeOptions, PlannerKnowledge};
pub use library::RecipeLibrary;
pub use recipe::{load_recipe_file, load_recipes_from_dir, Recipe, RecipeError, RecipeStep};
