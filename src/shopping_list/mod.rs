//! The shopping list of one crafting request.
//!
//! A [`ShoppingList`] is seeded with the direct ingredients of the requested
//! items, simplified until only base items remain and then annotated with
//! costs. It borrows the recipe database and never modifies it.
//!
//! ```
//! use crafting_calculator::{craft_item, CostKind, Recipe, RecipeDatabase};
//!
//! let database = RecipeDatabase::from_recipes([
//!     Recipe::new("Crate").with_ingredient("Plank", 2),
//!     Recipe::new("Plank").with_ingredient("Wood", 2),
//!     Recipe::new("Wood").with_cost(CostKind::BuyFromVendor, 1.5),
//! ]);
//! let list = craft_item(&database, ["Crate"], 3)?;
//!
//! assert_eq!(list.items()["Wood"].quantity, 12);
//! assert_eq!(list.intermediate_steps()["Plank"].quantity, 6);
//! assert_eq!(list.buy_from_vendor()["Wood"], 18.0);
//! # Ok::<(), crafting_calculator::CraftError>(())
//! ```

mod cost;
mod simplify;

use crate::database::RecipeDatabase;
use crate::model::{CostKind, Ingredient, IngredientMap};
use serde_yaml::Value;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while computing a shopping list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CraftError {
    #[error("Crafting amount must be at least 1")]
    ZeroAmount,

    #[error("Quantity of {item} does not fit into 64 bits")]
    QuantityOverflow { item: String },

    #[error("{item} is still craftable after {iterations} simplification rounds, the recipes are cyclic")]
    CyclicRecipe { item: String, iterations: usize },
}

/// Inputs of one shopping list computation.
#[derive(Debug, Clone)]
pub struct ShoppingListConfig<'db> {
    /// Recipes to resolve against
    pub database: &'db RecipeDatabase,
    /// Items the user wants to craft; naming an item twice doubles it
    pub target_items: Vec<String>,
    /// Multiplier applied to every target item
    pub amount: u64,
    /// Bound on simplification rounds, defaults to the number of craftable
    /// recipes plus one
    pub max_iterations: Option<usize>,
}

impl<'db> ShoppingListConfig<'db> {
    pub fn new<S: Into<String>>(
        database: &'db RecipeDatabase,
        target_items: impl IntoIterator<Item = S>,
        amount: u64,
    ) -> Self {
        ShoppingListConfig {
            database,
            target_items: target_items.into_iter().map(Into::into).collect(),
            amount,
            max_iterations: None,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

/// All items required to craft the requested targets.
#[derive(Debug, Clone)]
pub struct ShoppingList<'db> {
    target_items: IngredientMap,
    target_amount: u64,
    items: IngredientMap,
    intermediate_steps: IngredientMap,
    crafting_cost: BTreeMap<String, f64>,
    buy_from_vendor: BTreeMap<String, f64>,
    sell_to_vendor: Option<f64>,
    inventory: &'db RecipeDatabase,
    max_iterations: usize,
}

impl<'db> ShoppingList<'db> {
    /// Creates a shopping list seeded with the targets' direct ingredients.
    ///
    /// A target without ingredients (a base item or a name the database does
    /// not know) is put on the list itself, since it has to be gathered or
    /// bought rather than crafted.
    ///
    /// # Errors
    ///
    /// Returns `CraftError::ZeroAmount` for an amount of 0 and
    /// `CraftError::QuantityOverflow` when scaled quantities overflow.
    pub fn new(config: ShoppingListConfig<'db>) -> Result<Self, CraftError> {
        if config.amount == 0 {
            return Err(CraftError::ZeroAmount);
        }
        let database = config.database;

        let mut list = ShoppingList {
            target_items: IngredientMap::new(),
            target_amount: config.amount,
            items: IngredientMap::new(),
            intermediate_steps: IngredientMap::new(),
            crafting_cost: BTreeMap::new(),
            buy_from_vendor: BTreeMap::new(),
            sell_to_vendor: None,
            inventory: database,
            max_iterations: config
                .max_iterations
                .unwrap_or_else(|| database.craftable_count() + 1),
        };

        for name in config.target_items {
            let target = list
                .target_items
                .entry(name.clone())
                .or_insert_with(|| annotate(database, &Ingredient::new(name, 0), 0));
            target.quantity += 1;
        }

        let seeds: Vec<(String, u64)> = list
            .target_items
            .values()
            .map(|target| (target.name.clone(), target.quantity))
            .collect();
        for (name, quantity) in seeds {
            let multiplier = scale(quantity, config.amount, &name)?;
            let ingredients = database.find_recipe(&name);
            if ingredients.is_empty() {
                debug!("{name} has no recipe, adding it as a base item.");
                let own = IngredientMap::from([(name.clone(), Ingredient::new(name, 1))]);
                list.add_items(&own, multiplier)?;
            } else {
                list.add_items(&ingredients, multiplier)?;
            }
        }

        Ok(list)
    }

    /// Adds `record.quantity * multiplier` of every record to the list.
    ///
    /// Quantities of items already on the list are summed. New entries are
    /// copies of the given records with the database's cost attributes
    /// overlaid. Either every record is added or, on overflow, none is.
    pub(crate) fn add_items(
        &mut self,
        records: &IngredientMap,
        multiplier: u64,
    ) -> Result<(), CraftError> {
        let mut totals = Vec::with_capacity(records.len());
        for (name, record) in records {
            let quantity = scale(record.quantity, multiplier, name)?;
            let total = match self.items.get(name) {
                Some(existing) => sum(existing.quantity, quantity, name)?,
                None => quantity,
            };
            totals.push((name, record, quantity, total));
        }

        for (name, record, quantity, total) in totals {
            debug!("Adding {quantity} of {name} to shopping list.");
            match self.items.entry(name.clone()) {
                Entry::Occupied(mut entry) => entry.get_mut().quantity = total,
                Entry::Vacant(entry) => {
                    entry.insert(annotate(self.inventory, record, total));
                }
            }
        }
        Ok(())
    }

    /// Records that `amount` units of `name` were crafted as an intermediate.
    pub(crate) fn add_step(&mut self, name: &str, amount: u64) -> Result<(), CraftError> {
        debug!("Adding {amount} of {name} to crafting tree.");
        match self.intermediate_steps.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                let total = sum(entry.get().quantity, amount, name)?;
                entry.get_mut().quantity = total;
            }
            Entry::Vacant(entry) => {
                entry.insert(annotate(self.inventory, &Ingredient::new(name, 0), amount));
            }
        }
        Ok(())
    }

    /// Units of `name` recorded as crafted so far.
    pub(crate) fn step_quantity(&self, name: &str) -> u64 {
        self.intermediate_steps
            .get(name)
            .map_or(0, |step| step.quantity)
    }

    /// Items still on the list: base items once the list is simplified.
    pub fn items(&self) -> &IngredientMap {
        &self.items
    }

    /// Items that were expanded into their ingredients, with the number of
    /// units that need to be crafted.
    pub fn intermediate_steps(&self) -> &IngredientMap {
        &self.intermediate_steps
    }

    pub fn target_items(&self) -> &IngredientMap {
        &self.target_items
    }

    pub fn target_amount(&self) -> u64 {
        self.target_amount
    }

    pub fn crafting_cost(&self) -> &BTreeMap<String, f64> {
        &self.crafting_cost
    }

    pub fn buy_from_vendor(&self) -> &BTreeMap<String, f64> {
        &self.buy_from_vendor
    }

    pub fn sell_to_vendor(&self) -> Option<f64> {
        self.sell_to_vendor
    }

    pub fn inventory(&self) -> &'db RecipeDatabase {
        self.inventory
    }

    /// Item name to quantity view of the list.
    pub fn base_requirements(&self) -> BTreeMap<&str, u64> {
        quantities(&self.items)
    }
}

/// Computes the complete shopping list for crafting `amount` of each target.
///
/// Seeds the list, simplifies it and calculates all costs.
pub fn craft_item<'db, S: Into<String>>(
    database: &'db RecipeDatabase,
    target_items: impl IntoIterator<Item = S>,
    amount: u64,
) -> Result<ShoppingList<'db>, CraftError> {
    let mut list = ShoppingList::new(ShoppingListConfig::new(database, target_items, amount))?;
    list.simplify()?;
    list.calculate_crafting_costs();
    list.calculate_buy_from_vendor();
    list.calculate_sell_to_vendor();
    Ok(list)
}

pub(crate) fn quantities(items: &IngredientMap) -> BTreeMap<&str, u64> {
    items
        .iter()
        .map(|(name, record)| (name.as_str(), record.quantity))
        .collect()
}

/// Copies a record into shopping list form: no inline sub-recipe, the given
/// quantity and the database's cost attributes.
fn annotate(database: &RecipeDatabase, record: &Ingredient, quantity: u64) -> Ingredient {
    let mut copy = record.flat_copy(quantity);
    for kind in CostKind::ALL {
        copy.attributes.remove(kind.key());
        if let Some(value) = database.cost(&record.name, kind) {
            copy.attributes
                .insert(kind.key().to_string(), Value::from(value));
        }
    }
    copy
}

pub(crate) fn scale(quantity: u64, multiplier: u64, item: &str) -> Result<u64, CraftError> {
    quantity
        .checked_mul(multiplier)
        .ok_or_else(|| CraftError::QuantityOverflow {
            item: item.to_string(),
        })
}

pub(crate) fn sum(left: u64, right: u64, item: &str) -> Result<u64, CraftError> {
    left.checked_add(right)
        .ok_or_else(|| CraftError::QuantityOverflow {
            item: item.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Recipe;

    fn sample() -> RecipeDatabase {
        RecipeDatabase::from_recipes([
            Recipe::new("Plank")
                .with_ingredient("Wood", 2)
                .with_cost(CostKind::CraftingCost, 5.0),
            Recipe::new("Chair")
                .with_ingredient("Plank", 4)
                .with_ingredient("Nail", 8),
            Recipe::new("Wood").with_cost(CostKind::BuyFromVendor, 1.0),
            Recipe::new("Nail"),
        ])
    }

    #[test]
    fn test_new_seeds_direct_ingredients() {
        let database = sample();
        let list = ShoppingList::new(ShoppingListConfig::new(&database, ["Chair"], 2)).unwrap();

        assert_eq!(list.target_amount(), 2);
        assert_eq!(list.target_items()["Chair"].quantity, 1);
        assert_eq!(list.base_requirements(), BTreeMap::from([("Nail", 16), ("Plank", 8)]));
        assert!(list.intermediate_steps().is_empty());
        assert!(!list.items().contains_key("Chair"));
    }

    #[test]
    fn test_repeated_target_counts_twice() {
        let database = sample();
        let list =
            ShoppingList::new(ShoppingListConfig::new(&database, ["Plank", "Plank"], 3)).unwrap();

        assert_eq!(list.target_items()["Plank"].quantity, 2);
        assert_eq!(list.items()["Wood"].quantity, 12);
    }

    #[test]
    fn test_base_target_surfaces_on_list() {
        let database = sample();
        let list =
            ShoppingList::new(ShoppingListConfig::new(&database, ["Wood", "Mithril"], 4)).unwrap();

        assert_eq!(list.items()["Wood"].quantity, 4);
        assert_eq!(list.items()["Mithril"].quantity, 4);
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let database = sample();
        let result = ShoppingList::new(ShoppingListConfig::new(&database, ["Plank"], 0));
        assert_eq!(result.unwrap_err(), CraftError::ZeroAmount);
    }

    #[test]
    fn test_add_items_merges_additively() {
        let database = sample();
        let mut list =
            ShoppingList::new(ShoppingListConfig::new(&database, Vec::<String>::new(), 1)).unwrap();

        list.add_items(&database.find_recipe("Plank"), 3).unwrap();
        list.add_items(&database.find_recipe("Plank"), 2).unwrap();
        assert_eq!(list.items()["Wood"].quantity, 10);
    }

    #[test]
    fn test_add_items_copies_database_costs() {
        let database = sample();
        let mut list =
            ShoppingList::new(ShoppingListConfig::new(&database, Vec::<String>::new(), 1)).unwrap();

        let mut record = Ingredient::new("Wood", 1);
        record
            .attributes
            .insert("buy_from_vendor".into(), Value::from(42));
        record
            .attributes
            .insert("crafting_cost".into(), Value::from(7));
        record
            .attributes
            .insert("description".into(), Value::from("logs"));
        record.items.insert("Bark".into(), Ingredient::new("Bark", 1));
        list.add_items(&IngredientMap::from([("Wood".to_string(), record)]), 5)
            .unwrap();

        let wood = &list.items()["Wood"];
        assert_eq!(wood.quantity, 5);
        assert_eq!(wood.attribute("buy_from_vendor").and_then(Value::as_f64), Some(1.0));
        assert_eq!(wood.attribute("crafting_cost"), None);
        assert_eq!(wood.attribute("description"), Some(&Value::from("logs")));
        assert!(wood.items.is_empty());
    }

    #[test]
    fn test_add_step_accumulates() {
        let database = sample();
        let mut list =
            ShoppingList::new(ShoppingListConfig::new(&database, Vec::<String>::new(), 1)).unwrap();

        list.add_step("Plank", 2).unwrap();
        list.add_step("Plank", 3).unwrap();
        let plank = &list.intermediate_steps()["Plank"];
        assert_eq!(plank.quantity, 5);
        assert_eq!(plank.attribute("crafting_cost").and_then(Value::as_f64), Some(5.0));
    }

    #[test]
    fn test_quantity_overflow() {
        let database = sample();
        let mut list =
            ShoppingList::new(ShoppingListConfig::new(&database, Vec::<String>::new(), 1)).unwrap();

        let result = list.add_items(&database.find_recipe("Plank"), u64::MAX);
        assert_eq!(
            result.unwrap_err(),
            CraftError::QuantityOverflow {
                item: "Wood".to_string()
            }
        );
    }

    #[test]
    fn test_overflowing_add_items_changes_nothing() {
        let database = sample();
        let mut list = ShoppingList::new(ShoppingListConfig::new(&database, ["Chair"], 1)).unwrap();
        let before = list.items().clone();

        let records = IngredientMap::from([
            ("Nail".to_string(), Ingredient::new("Nail", 1)),
            ("Plank".to_string(), Ingredient::new("Plank", u64::MAX)),
        ]);
        assert!(list.add_items(&records, 1).is_err());
        assert_eq!(list.items(), &before);
    }
}
