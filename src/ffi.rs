//! UniFFI bindings for cross-platform support (iOS, Android).
//!
//! Shopping lists borrow their database, so they are converted into plain
//! records before they cross the FFI boundary.

use crate::database::RecipeDatabase;
use crate::loader::{self, LoadError};
use crate::render::format_for_display;
use crate::search::{search as search_internal, SearchFilter};
use crate::shopping_list::{craft_item, quantities, CraftError, ShoppingList};
use crate::tree::{build_tree, CraftingTree, TreeError};
use camino::Utf8Path;
use std::collections::BTreeMap;
use std::sync::Arc;

/// FFI-safe error type that wraps all possible errors.
#[derive(Debug, uniffi::Error, thiserror::Error)]
pub enum CraftingError {
    #[error("Game not found: {message}")]
    NotFound { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    #[error("Crafting error: {message}")]
    CraftError { message: String },

    #[error("Tree error: {message}")]
    TreeError { message: String },
}

impl From<LoadError> for CraftingError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::IoError(e) => CraftingError::IoError {
                message: e.to_string(),
            },
            LoadError::GlobError(e) => CraftingError::IoError {
                message: e.to_string(),
            },
            LoadError::PatternError(e) => CraftingError::InvalidPath {
                message: e.to_string(),
            },
            LoadError::InvalidPath(p) => CraftingError::InvalidPath { message: p },
            LoadError::GameNotFound(p) => CraftingError::NotFound {
                message: p.to_string(),
            },
            e @ (LoadError::YamlError { .. }
            | LoadError::RecipeError { .. }
            | LoadError::NoRecipes(_)) => CraftingError::ParseError {
                message: e.to_string(),
            },
        }
    }
}

impl From<CraftError> for CraftingError {
    fn from(e: CraftError) -> Self {
        CraftingError::CraftError {
            message: e.to_string(),
        }
    }
}

impl From<TreeError> for CraftingError {
    fn from(e: TreeError) -> Self {
        CraftingError::TreeError {
            message: e.to_string(),
        }
    }
}

/// An item name with a number of units.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiQuantity {
    pub name: String,
    pub quantity: u64,
}

/// An item name with a summed cost.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiCost {
    pub name: String,
    pub cost: f64,
}

/// FFI-safe representation of a computed shopping list.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiShoppingList {
    /// Base items to gather or buy
    pub items: Vec<FfiQuantity>,
    /// Items crafted along the way
    pub intermediates: Vec<FfiQuantity>,
    /// Requested items with how often each was requested
    pub targets: Vec<FfiQuantity>,
    pub target_amount: u64,
    pub crafting_cost: Vec<FfiCost>,
    pub buy_from_vendor: Vec<FfiCost>,
    pub sell_to_vendor: Option<f64>,
    pub total_crafting_cost: f64,
    pub total_buy_from_vendor: f64,
    /// The list formatted for display
    pub display: String,
}

impl From<&ShoppingList<'_>> for FfiShoppingList {
    fn from(list: &ShoppingList<'_>) -> Self {
        FfiShoppingList {
            items: to_quantities(list.base_requirements()),
            intermediates: to_quantities(quantities(list.intermediate_steps())),
            targets: to_quantities(quantities(list.target_items())),
            target_amount: list.target_amount(),
            crafting_cost: to_costs(list.crafting_cost()),
            buy_from_vendor: to_costs(list.buy_from_vendor()),
            sell_to_vendor: list.sell_to_vendor(),
            total_crafting_cost: list.total_crafting_cost(),
            total_buy_from_vendor: list.total_buy_from_vendor(),
            display: format_for_display(list),
        }
    }
}

/// FFI-safe representation of a crafting tree node.
///
/// Trees are flattened in pre-order; `level` is 0 for the root.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiTreeNode {
    pub name: String,
    pub quantity: u64,
    pub level: u32,
    /// True if the item is gathered rather than crafted
    pub is_leaf: bool,
}

/// The recipes of one game.
#[derive(uniffi::Object)]
pub struct FfiRecipeDatabase {
    inner: RecipeDatabase,
    title: Option<String>,
}

#[uniffi::export]
impl FfiRecipeDatabase {
    /// Returns the game title from `meta.yml` if present.
    pub fn title(&self) -> Option<String> {
        self.title.clone()
    }

    pub fn recipe_count(&self) -> u64 {
        self.inner.len() as u64
    }

    /// Returns the names of all craftable items, sorted.
    pub fn craftable_items(&self) -> Vec<String> {
        to_strings(self.inner.craftable())
    }

    /// Returns the names of all base items, sorted.
    pub fn gatherable_items(&self) -> Vec<String> {
        to_strings(self.inner.gatherable())
    }

    pub fn specialisations(&self) -> Vec<String> {
        to_strings(self.inner.specialisations())
    }

    /// Searches craftable items by name and ingredients.
    pub fn search(&self, query: String) -> Vec<String> {
        search_internal(&self.inner, &query, SearchFilter::Craftable)
    }

    /// Computes the shopping list for crafting `amount` of every target.
    pub fn craft(
        &self,
        targets: Vec<String>,
        amount: u64,
    ) -> Result<FfiShoppingList, CraftingError> {
        let list = craft_item(&self.inner, targets, amount)?;
        Ok(FfiShoppingList::from(&list))
    }

    /// Returns the crafting breakdown of one item.
    pub fn tree(&self, item: String, amount: u64) -> Result<Vec<FfiTreeNode>, CraftingError> {
        let tree = build_tree(&self.inner, &item, amount)?;
        let mut nodes = Vec::new();
        collect_nodes(&tree, 0, &mut nodes);
        Ok(nodes)
    }
}

impl FfiRecipeDatabase {
    fn new(inner: RecipeDatabase, title: Option<String>) -> Self {
        FfiRecipeDatabase { inner, title }
    }
}

fn collect_nodes(tree: &CraftingTree, level: u32, nodes: &mut Vec<FfiTreeNode>) {
    nodes.push(FfiTreeNode {
        name: tree.name.clone(),
        quantity: tree.quantity,
        level,
        is_leaf: tree.is_leaf(),
    });
    for child in tree.children.values() {
        collect_nodes(child, level + 1, nodes);
    }
}

fn to_quantities(items: BTreeMap<&str, u64>) -> Vec<FfiQuantity> {
    items
        .into_iter()
        .map(|(name, quantity)| FfiQuantity {
            name: name.to_string(),
            quantity,
        })
        .collect()
}

fn to_costs(costs: &BTreeMap<String, f64>) -> Vec<FfiCost> {
    costs
        .iter()
        .map(|(name, cost)| FfiCost {
            name: name.clone(),
            cost: *cost,
        })
        .collect()
}

fn to_strings(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(String::from).collect()
}

/// Lists the games found in a recipes directory.
///
/// # Arguments
/// * `recipes_dir` - Directory with one sub-directory per game
#[uniffi::export]
pub fn discover_games(recipes_dir: String) -> Result<Vec<String>, CraftingError> {
    Ok(loader::discover_games(Utf8Path::new(&recipes_dir))?)
}

/// Loads the recipes of one game.
///
/// # Arguments
/// * `recipes_dir` - Directory with one sub-directory per game
/// * `game` - Name of the game's sub-directory
#[uniffi::export]
pub fn load_game(
    recipes_dir: String,
    game: String,
) -> Result<Arc<FfiRecipeDatabase>, CraftingError> {
    let (database, meta) = loader::load_game(Utf8Path::new(&recipes_dir), &game)?;
    let title = meta.title().map(String::from);
    Ok(Arc::new(FfiRecipeDatabase::new(database, title)))
}

/// Builds a recipe database from one YAML document.
#[uniffi::export]
pub fn database_from_yaml(content: String) -> Result<Arc<FfiRecipeDatabase>, CraftingError> {
    let database = loader::parse_database(&content, Utf8Path::new("<memory>"))?;
    Ok(Arc::new(FfiRecipeDatabase::new(database, None)))
}

/// Returns the library version.
#[uniffi::export]
pub fn library_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
