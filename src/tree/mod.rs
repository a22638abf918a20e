use crate::database::RecipeDatabase;
use thiserror::Error;

mod model;
pub use model::CraftingTree;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Crafting amount must be at least 1")]
    ZeroAmount,

    #[error("Recipe requires itself: {0}")]
    CyclicRecipe(String),

    #[error("Quantity of {0} does not fit into 64 bits")]
    QuantityOverflow(String),
}

/// Build the crafting breakdown of `amount` units of `item`
///
/// Unlike a shopping list, every occurrence of an ingredient keeps its own
/// node, so shared ingredients show up once per branch that needs them.
pub fn build_tree(
    database: &RecipeDatabase,
    item: &str,
    amount: u64,
) -> Result<CraftingTree, TreeError> {
    if amount == 0 {
        return Err(TreeError::ZeroAmount);
    }
    let mut path = Vec::new();
    expand(database, item, amount, &mut path)
}

fn expand(
    database: &RecipeDatabase,
    item: &str,
    quantity: u64,
    path: &mut Vec<String>,
) -> Result<CraftingTree, TreeError> {
    if path.iter().any(|ancestor| ancestor == item) {
        path.push(item.to_string());
        return Err(TreeError::CyclicRecipe(path.join(" -> ")));
    }

    let mut node = CraftingTree::new(item.to_string(), quantity);
    path.push(item.to_string());

    for (name, ingredient) in database.find_recipe(item) {
        let needed = ingredient
            .quantity
            .checked_mul(quantity)
            .ok_or_else(|| TreeError::QuantityOverflow(name.clone()))?;
        let child = expand(database, &name, needed, path)?;
        node.children.insert(name, child);
    }

    path.pop();
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Recipe;
    use crate::shopping_list::craft_item;
    use std::collections::BTreeMap;

    fn sample() -> RecipeDatabase {
        RecipeDatabase::from_recipes([
            Recipe::new("A").with_ingredient("C", 1).with_ingredient("B", 1),
            Recipe::new("B").with_ingredient("C", 2),
            Recipe::new("C"),
        ])
    }

    #[test]
    fn test_base_item_tree() {
        let database = sample();
        let tree = build_tree(&database, "C", 4).unwrap();

        assert_eq!(tree.name, "C");
        assert_eq!(tree.quantity, 4);
        assert!(tree.is_leaf());
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_branches_are_not_merged() {
        let database = sample();
        let tree = build_tree(&database, "A", 2).unwrap();

        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children["C"].quantity, 2);
        let b = &tree.children["B"];
        assert_eq!(b.quantity, 2);
        assert_eq!(b.children["C"].quantity, 4);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_leaves_match_shopping_list() {
        let database = sample();
        let tree = build_tree(&database, "A", 3).unwrap();
        let list = craft_item(&database, ["A"], 3).unwrap();

        let expected: BTreeMap<String, u64> = list
            .base_requirements()
            .into_iter()
            .map(|(name, quantity)| (name.to_string(), quantity))
            .collect();
        assert_eq!(tree.leaves(), expected);
    }

    #[test]
    fn test_render() {
        let database = sample();
        let tree = build_tree(&database, "A", 1).unwrap();

        assert_eq!(tree.render(), "- 1 x A\n  - 1 x B\n    - 2 x C\n  - 1 x C\n");
    }

    #[test]
    fn test_cycle_is_detected() {
        let database = RecipeDatabase::from_recipes([
            Recipe::new("Egg").with_ingredient("Chicken", 1),
            Recipe::new("Chicken").with_ingredient("Egg", 1),
        ]);

        let err = build_tree(&database, "Egg", 1).unwrap_err();
        assert_eq!(err, TreeError::CyclicRecipe("Egg -> Chicken -> Egg".to_string()));
    }

    #[test]
    fn test_zero_amount() {
        let database = sample();
        assert_eq!(build_tree(&database, "A", 0).unwrap_err(), TreeError::ZeroAmount);
    }
}
