use super::ingredient::{normalize_items, Ingredient, IngredientMap, NormalizeError};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The numeric cost attributes a recipe may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostKind {
    CraftingCost,
    SellToVendor,
    BuyFromVendor,
}

impl CostKind {
    pub const ALL: [CostKind; 3] = [
        CostKind::CraftingCost,
        CostKind::SellToVendor,
        CostKind::BuyFromVendor,
    ];

    /// The attribute key used in recipe files.
    pub fn key(self) -> &'static str {
        match self {
            CostKind::CraftingCost => "crafting_cost",
            CostKind::SellToVendor => "sell_to_vendor",
            CostKind::BuyFromVendor => "buy_from_vendor",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        CostKind::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

impl fmt::Display for CostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A recipe database entry.
///
/// A recipe without `items` describes a base (gatherable) item, one with
/// `items` a craftable item. Entries are immutable once loaded into a
/// [`RecipeDatabase`](crate::RecipeDatabase).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crafting_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_to_vendor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_from_vendor: Option<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub items: IngredientMap,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Recipe {
    /// Creates a base item recipe without costs.
    pub fn new(name: impl Into<String>) -> Self {
        Recipe {
            name: name.into(),
            crafting_cost: None,
            sell_to_vendor: None,
            buy_from_vendor: None,
            items: IngredientMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_ingredient(mut self, name: impl Into<String>, quantity: u64) -> Self {
        let name = name.into();
        self.items
            .insert(name.clone(), Ingredient::new(name, quantity));
        self
    }

    pub fn with_cost(mut self, kind: CostKind, value: f64) -> Self {
        *self.cost_slot(kind) = Some(value);
        self
    }

    /// Builds a recipe from an authored YAML record.
    ///
    /// `null` is accepted as a base item without attributes.
    ///
    /// # Errors
    ///
    /// Returns `NormalizeError::Malformed` when the record is not a mapping,
    /// a cost attribute is not numeric, or the `items` cannot be normalized.
    pub fn from_value(name: &str, value: &Value) -> Result<Self, NormalizeError> {
        let mut recipe = Recipe::new(name);
        let record = match value {
            Value::Null => return Ok(recipe),
            Value::Mapping(record) => record,
            _ => {
                return Err(NormalizeError::malformed(
                    name,
                    "a recipe must be a mapping of attributes",
                ))
            }
        };

        for (key, value) in record {
            let Some(key) = key.as_str() else {
                continue;
            };
            match key {
                "name" => {}
                "items" => recipe.items = normalize_items(name, value)?,
                _ => match CostKind::from_key(key) {
                    Some(kind) => *recipe.cost_slot(kind) = parse_cost(name, kind, value)?,
                    None => {
                        recipe.attributes.insert(key.to_string(), value.clone());
                    }
                },
            }
        }

        Ok(recipe)
    }

    /// Builds a recipe from an ingredient that was authored with an inline
    /// sub-recipe.
    pub(crate) fn from_inline(ingredient: &Ingredient) -> Self {
        let mut recipe = Recipe::new(ingredient.name.clone());
        recipe.items = ingredient.items.clone();
        for (key, value) in &ingredient.attributes {
            match CostKind::from_key(key) {
                Some(kind) => *recipe.cost_slot(kind) = value.as_f64(),
                None => {
                    recipe.attributes.insert(key.clone(), value.clone());
                }
            }
        }
        recipe
    }

    /// Returns true if this recipe has ingredients of its own.
    pub fn is_craftable(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn cost(&self, kind: CostKind) -> Option<f64> {
        match kind {
            CostKind::CraftingCost => self.crafting_cost,
            CostKind::SellToVendor => self.sell_to_vendor,
            CostKind::BuyFromVendor => self.buy_from_vendor,
        }
    }

    /// Returns a numeric attribute by key.
    ///
    /// Cost keys read the typed fields, any other key reads an authored
    /// attribute if it holds a number.
    pub fn attribute(&self, key: &str) -> Option<f64> {
        match CostKind::from_key(key) {
            Some(kind) => self.cost(kind),
            None => self.attributes.get(key).and_then(Value::as_f64),
        }
    }

    /// Returns the crafting specialisation this recipe belongs to, if any.
    pub fn specialisation(&self) -> Option<&str> {
        self.attributes.get("specialisation").and_then(Value::as_str)
    }

    fn cost_slot(&mut self, kind: CostKind) -> &mut Option<f64> {
        match kind {
            CostKind::CraftingCost => &mut self.crafting_cost,
            CostKind::SellToVendor => &mut self.sell_to_vendor,
            CostKind::BuyFromVendor => &mut self.buy_from_vendor,
        }
    }
}

fn parse_cost(name: &str, kind: CostKind, value: &Value) -> Result<Option<f64>, NormalizeError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => Ok(number.as_f64()),
        _ => Err(NormalizeError::malformed(
            name,
            format!("{kind} must be a number"),
        )),
    }
}

/// Returns the `name` field of an authored recipe record.
pub fn recipe_name(value: &Value) -> Option<&str> {
    value.get("name").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_recipe_from_value() {
        let value = parse(indoc! {r#"
            name: Plank
            crafting_cost: 5
            sell_to_vendor: 2.5
            specialisation: Carpentry
            items:
              Wood: 2
        "#});
        let recipe = Recipe::from_value("Plank", &value).unwrap();

        assert_eq!(recipe.name, "Plank");
        assert_eq!(recipe.crafting_cost, Some(5.0));
        assert_eq!(recipe.sell_to_vendor, Some(2.5));
        assert_eq!(recipe.buy_from_vendor, None);
        assert_eq!(recipe.specialisation(), Some("Carpentry"));
        assert_eq!(recipe.items["Wood"].quantity, 2);
        assert!(recipe.is_craftable());
    }

    #[test]
    fn test_empty_record_is_base_item() {
        let recipe = Recipe::from_value("Wood", &parse("{}")).unwrap();
        assert!(!recipe.is_craftable());

        let recipe = Recipe::from_value("Stone", &Value::Null).unwrap();
        assert_eq!(recipe, Recipe::new("Stone"));
    }

    #[test]
    fn test_zero_cost_is_present() {
        let recipe = Recipe::from_value("Dirt", &parse("buy_from_vendor: 0")).unwrap();

        assert_eq!(recipe.cost(CostKind::BuyFromVendor), Some(0.0));
        assert_eq!(recipe.attribute("buy_from_vendor"), Some(0.0));
        assert_eq!(recipe.attribute("crafting_cost"), None);
    }

    #[test]
    fn test_custom_numeric_attribute() {
        let recipe = Recipe::from_value("Ore", &parse("weight: 3\nnote: heavy")).unwrap();

        assert_eq!(recipe.attribute("weight"), Some(3.0));
        assert_eq!(recipe.attribute("note"), None);
    }

    #[test]
    fn test_non_numeric_cost_is_rejected() {
        let err = Recipe::from_value("Plank", &parse("crafting_cost: cheap")).unwrap_err();
        assert!(err.to_string().contains("Plank"));
        assert!(err.to_string().contains("crafting_cost"));
    }

    #[test]
    fn test_from_inline_moves_costs() {
        let mut ingredient = Ingredient::new("Handle", 1);
        ingredient.items.insert("Wood".into(), Ingredient::new("Wood", 3));
        ingredient
            .attributes
            .insert("crafting_cost".into(), Value::from(4));

        let recipe = Recipe::from_inline(&ingredient);
        assert_eq!(recipe.crafting_cost, Some(4.0));
        assert!(recipe.attributes.is_empty());
        assert_eq!(recipe.items["Wood"].quantity, 3);
    }

    #[test]
    fn test_cost_kind_keys() {
        for kind in CostKind::ALL {
            assert_eq!(CostKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(CostKind::from_key("weight"), None);
    }
}
