use crate::index::{HowToIndex, SearchResult};
use crate::recipe::{load_recipes_from_dir, Recipe, Result};
use std::path::Path;

/// Recipes plus the index built over them.
///
/// Keys are recipe names. Names are not required to be unique; when two
/// recipes share a name, lookups by key resolve to the one added last.
#[derive(Debug)]
pub struct RecipeLibrary {
    recipes: Vec<Recipe>,
    index: HowToIndex,
}

impl RecipeLibrary {
    pub fn new<I: IntoIterator<Item = Recipe>>(recipes: I) -> Self {
        let recipes: Vec<Recipe> = recipes.into_iter().collect();
        let mut index = HowToIndex::from_entries(recipes.iter().map(Recipe::as_entry));
        index.build();
        Self { recipes, index }
    }

    pub fn from_directory(dir: &Path) -> Result<Self> {
        Ok(Self::new(load_recipes_from_dir(dir)?))
    }

    pub fn recipes(&self) -> &[Recipe] { &self.recipes }
    pub fn index(&self) -> &HowToIndex { &self.index }

    pub fn add_recipe(&mut self, recipe: Recipe) {
        if self.recipe(&recipe.name).is_some() {
            tracing::warn!(name = %recipe.name, "recipe name already present; lookups will resolve to the newest");
        }
        self.index.add_entry(recipe.as_entry());
        self.recipes.push(recipe);
        self.index.build();
    }

    /// Last recipe added under `name`.
    pub fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.recipes.iter().rev().find(|r| r.name == name)
    }

    pub fn search(&mut self, query: &str, top_k: usize) -> Vec<SearchResult<'_>> {
        self.index.search(query, top_k)
    }

    /// Best matching recipes in rank order. Results whose key has no recipe are skipped.
    pub fn top_recipes(&mut self, query: &str, top_k: usize) -> Vec<&Recipe> {
        let keys: Vec<String> = self.index.search(query, top_k).into_iter().map(|r| r.entry.key.clone()).collect();
        keys.iter().filter_map(|k| self.recipe(k)).collect()
    }
}
