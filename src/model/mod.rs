mod ingredient;
mod metadata;
mod recipe;

pub use ingredient::{normalize_items, Ingredient, IngredientMap, NormalizeError};
pub use metadata::{parse_meta, GameMeta};
pub use recipe::{recipe_name, CostKind, Recipe};
