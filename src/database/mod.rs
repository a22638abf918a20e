//! Read-only access to an in-memory recipe database.
//!
//! A [`RecipeDatabase`] is built once per loaded game and shared by every
//! shopping list computed against it. Nothing in the calculation mutates it.

use crate::model::{CostKind, Ingredient, IngredientMap, Recipe};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Recipes of one game keyed by item name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecipeDatabase {
    recipes: BTreeMap<String, Recipe>,
}

impl RecipeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a database from a list of recipes.
    ///
    /// A later recipe with the same name replaces an earlier one. Ingredients
    /// authored with an inline sub-recipe are registered as recipes of their
    /// own unless a top-level recipe of that name exists.
    pub fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let mut database = Self::new();
        let mut inline = Vec::new();

        for recipe in recipes {
            collect_inline(&recipe.items, &mut inline);
            database.insert(recipe);
        }

        for ingredient in inline {
            if !database.contains(&ingredient.name) {
                debug!("Registering inline recipe for {}.", ingredient.name);
                database.insert(Recipe::from_inline(&ingredient));
            }
        }

        database
    }

    /// Inserts a recipe, returning the one it replaced.
    pub fn insert(&mut self, recipe: Recipe) -> Option<Recipe> {
        let replaced = self.recipes.insert(recipe.name.clone(), recipe);
        if let Some(previous) = &replaced {
            warn!("Recipe {} is defined more than once, using the last definition.", previous.name);
        }
        replaced
    }

    /// Returns the ingredients of the named recipe.
    ///
    /// The map is empty when the recipe is unknown or describes a base item.
    /// The records are copies, changing them does not affect the database.
    pub fn find_recipe(&self, name: &str) -> IngredientMap {
        self.recipes
            .get(name)
            .map(|recipe| recipe.items.clone())
            .unwrap_or_default()
    }

    /// Returns a numeric attribute of the named recipe.
    ///
    /// `None` means the recipe or the key is missing; a stored zero is
    /// returned as `Some(0.0)`.
    pub fn get_attribute(&self, name: &str, key: &str) -> Option<f64> {
        self.recipes.get(name)?.attribute(key)
    }

    pub fn cost(&self, name: &str, kind: CostKind) -> Option<f64> {
        self.recipes.get(name)?.cost(kind)
    }

    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    /// Returns true if the named recipe has ingredients of its own.
    pub fn is_craftable(&self, name: &str) -> bool {
        self.recipes
            .get(name)
            .is_some_and(Recipe::is_craftable)
    }

    /// Names of all craftable items, sorted.
    pub fn craftable(&self) -> Vec<&str> {
        self.iter()
            .filter(|recipe| recipe.is_craftable())
            .map(|recipe| recipe.name.as_str())
            .collect()
    }

    /// Names of all base (gatherable) items, sorted.
    pub fn gatherable(&self) -> Vec<&str> {
        self.iter()
            .filter(|recipe| !recipe.is_craftable())
            .map(|recipe| recipe.name.as_str())
            .collect()
    }

    pub fn craftable_count(&self) -> usize {
        self.iter().filter(|recipe| recipe.is_craftable()).count()
    }

    /// Distinct specialisations named by any recipe, sorted.
    pub fn specialisations(&self) -> Vec<&str> {
        self.iter()
            .filter_map(Recipe::specialisation)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Names of the recipes belonging to a specialisation, sorted.
    pub fn with_specialisation(&self, specialisation: &str) -> Vec<&str> {
        self.iter()
            .filter(|recipe| recipe.specialisation() == Some(specialisation))
            .map(|recipe| recipe.name.as_str())
            .collect()
    }
}

impl FromIterator<Recipe> for RecipeDatabase {
    fn from_iter<T: IntoIterator<Item = Recipe>>(iter: T) -> Self {
        Self::from_recipes(iter)
    }
}

fn collect_inline(items: &IngredientMap, inline: &mut Vec<Ingredient>) {
    for ingredient in items.values() {
        if !ingredient.items.is_empty() {
            inline.push(ingredient.clone());
            collect_inline(&ingredient.items, inline);
        }
    }
}
