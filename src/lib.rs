pub mod database;
pub mod ffi;
pub mod loader;
pub mod model;
pub mod render;
pub mod search;
pub mod shopping_list;
pub mod tree;

pub use database::RecipeDatabase;
pub use loader::{discover_games, load_game, parse_recipes};
pub use model::*;
pub use search::{search, SearchFilter};
pub use shopping_list::{craft_item, CraftError, ShoppingList, ShoppingListConfig};
pub use tree::{build_tree, CraftingTree};

uniffi::setup_scaffolding!();
