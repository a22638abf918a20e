use super::{sum, CraftError, ShoppingList};
use crate::model::IngredientMap;
use std::collections::BTreeMap;
use tracing::{debug, info};

impl ShoppingList<'_> {
    /// Replaces craftable items on the list with their ingredients until only
    /// base items remain.
    ///
    /// Every replaced item is recorded in the intermediate steps with the
    /// quantity that was consumed. Running it again on a simplified list
    /// changes nothing. Once it returns `Ok`, no item is both on the list and
    /// an intermediate step.
    ///
    /// On error the list keeps the replacements made before the failing one.
    /// Each replacement is applied completely or not at all, so quantities
    /// stay conserved.
    ///
    /// # Errors
    ///
    /// Returns `CraftError::CyclicRecipe` when the list does not settle within
    /// the configured number of rounds, which only happens for recipes that
    /// directly or indirectly require themselves.
    pub fn simplify(&mut self) -> Result<(), CraftError> {
        info!("Simplifying shopping list.");
        let mut iterations = 0;

        loop {
            let replacements = self.find_replacements();
            if replacements.is_empty() {
                info!("Nothing to simplify after {iterations} rounds.");
                return Ok(());
            }

            iterations += 1;
            if iterations > self.max_iterations {
                let item = replacements.into_keys().next().unwrap_or_default();
                return Err(CraftError::CyclicRecipe {
                    item,
                    iterations: self.max_iterations,
                });
            }

            debug!(
                "Round {iterations}: expanding {} craftable items.",
                replacements.len()
            );
            for (name, ingredients) in replacements {
                self.replace_item(&name, &ingredients)?;
            }
        }
    }

    fn find_replacements(&self) -> BTreeMap<String, IngredientMap> {
        self.items
            .keys()
            .filter_map(|name| {
                let recipe = self.inventory.find_recipe(name);
                (!recipe.is_empty()).then(|| (name.clone(), recipe))
            })
            .collect()
    }

    /// Replaces an item on the list with smaller components.
    ///
    /// Leaves the list untouched when a quantity would overflow.
    fn replace_item(&mut self, name: &str, ingredients: &IngredientMap) -> Result<(), CraftError> {
        let Some(replaced) = self.items.remove(name) else {
            return Ok(());
        };
        let amount = replaced.quantity;
        debug!("Replacing {amount} of {name}.");

        let checked = sum(self.step_quantity(name), amount, name)
            .and_then(|_| self.add_items(ingredients, amount));
        if let Err(err) = checked {
            self.items.insert(name.to_string(), replaced);
            return Err(err);
        }
        self.add_step(name, amount)
    }
}
