use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Canonical ingredient mapping, ordered by item name.
pub type IngredientMap = BTreeMap<String, Ingredient>;

/// A single ingredient requirement in canonical form.
///
/// Every authoring shorthand accepted in recipe files is normalized into this
/// shape before any calculation runs. Attributes the calculator does not know
/// about (descriptions, specialisations, ...) are carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Item name, always equal to the key the record is stored under
    pub name: String,
    /// Number of units required, at least 1 in authored data
    pub quantity: u64,
    /// Inline sub-recipe written directly below this ingredient
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub items: IngredientMap,
    /// Any further authored attributes
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: u64) -> Self {
        Ingredient {
            name: name.into(),
            quantity,
            items: IngredientMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Returns an authored attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Returns a copy of this record without its inline sub-recipe.
    pub fn flat_copy(&self, quantity: u64) -> Self {
        Ingredient {
            name: self.name.clone(),
            quantity,
            items: IngredientMap::new(),
            attributes: self.attributes.clone(),
        }
    }
}

/// Errors raised while normalizing authored ingredient lists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Malformed ingredient data for {item}: {reason}")]
    Malformed { item: String, reason: String },
}

impl NormalizeError {
    pub(crate) fn malformed(item: &str, reason: impl Into<String>) -> Self {
        NormalizeError::Malformed {
            item: item.to_string(),
            reason: reason.into(),
        }
    }
}

/// The three ways an ingredient value may be authored.
#[derive(Debug)]
enum Shorthand<'a> {
    /// `Wood: 2`
    Integer(u64),
    /// `Wood: { quantity: 2, ... }`
    Record(&'a Mapping),
    /// `- { name: Wood, quantity: 2 }`
    Sequence(&'a [Value]),
}

fn decode<'a>(item: &str, value: &'a Value) -> Result<Shorthand<'a>, NormalizeError> {
    match value {
        Value::Number(number) => match number.as_u64() {
            Some(quantity) if quantity > 0 => Ok(Shorthand::Integer(quantity)),
            _ => Err(NormalizeError::malformed(
                item,
                format!("quantity must be a positive integer, got {number}"),
            )),
        },
        Value::Mapping(mapping) => Ok(Shorthand::Record(mapping)),
        Value::Sequence(entries) => Ok(Shorthand::Sequence(entries)),
        Value::Tagged(tagged) => decode(item, &tagged.value),
        other => Err(NormalizeError::malformed(
            item,
            format!(
                "expected an integer, a mapping or a list, got {}",
                describe(other)
            ),
        )),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Normalizes the raw `items` value of the recipe `owner` into canonical form.
///
/// Accepts a mapping of names to bare integers or records, or a list of
/// records carrying a `name` field. Nested `items` are normalized by the same
/// rules. A missing (`null`) value yields an empty map.
///
/// # Errors
///
/// Returns `NormalizeError::Malformed` naming the offending item when a value
/// has none of the accepted shapes or a quantity is not a positive integer.
pub fn normalize_items(owner: &str, value: &Value) -> Result<IngredientMap, NormalizeError> {
    if value.is_null() {
        return Ok(IngredientMap::new());
    }

    let mut items = IngredientMap::new();
    match decode(owner, value)? {
        Shorthand::Record(mapping) => {
            for (key, child) in mapping {
                let name = key.as_str().ok_or_else(|| {
                    NormalizeError::malformed(owner, "ingredient names must be strings")
                })?;
                let ingredient = match decode(name, child)? {
                    Shorthand::Integer(quantity) => Ingredient::new(name, quantity),
                    Shorthand::Record(record) => normalize_record(name, record)?,
                    Shorthand::Sequence(_) => {
                        return Err(NormalizeError::malformed(
                            name,
                            "expected a quantity or a record, got a list",
                        ))
                    }
                };
                items.insert(name.to_string(), ingredient);
            }
        }
        Shorthand::Sequence(entries) => {
            for entry in entries {
                let record = entry.as_mapping().ok_or_else(|| {
                    NormalizeError::malformed(
                        owner,
                        format!("list entries must be records, got {}", describe(entry)),
                    )
                })?;
                let name = record.get("name").and_then(Value::as_str).ok_or_else(|| {
                    NormalizeError::malformed(owner, "list entry without a name")
                })?;
                let ingredient = normalize_record(name, record)?;
                if items.insert(name.to_string(), ingredient).is_some() {
                    warn!("Duplicate ingredient {name} in {owner}, keeping the last one.");
                }
            }
        }
        Shorthand::Integer(_) => {
            return Err(NormalizeError::malformed(
                owner,
                "expected a mapping or a list of ingredients, got a bare quantity",
            ))
        }
    }

    Ok(items)
}

fn normalize_record(name: &str, record: &Mapping) -> Result<Ingredient, NormalizeError> {
    let quantity = match record.get("quantity") {
        None | Some(Value::Null) => 1,
        Some(value) => match decode(name, value)? {
            Shorthand::Integer(quantity) => quantity,
            _ => {
                return Err(NormalizeError::malformed(
                    name,
                    format!("quantity must be a positive integer, got {}", describe(value)),
                ))
            }
        },
    };

    let items = match record.get("items") {
        Some(value) => normalize_items(name, value)?,
        None => IngredientMap::new(),
    };

    let attributes = record
        .iter()
        .filter_map(|(key, value)| Some((key.as_str()?, value)))
        .filter(|(key, _)| !matches!(*key, "name" | "quantity" | "items"))
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();

    Ok(Ingredient {
        name: name.to_string(),
        quantity,
        items,
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use proptest::prelude::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_integer_shorthand() {
        let items = normalize_items("Plank", &parse("Wood: 2")).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items["Wood"], Ingredient::new("Wood", 2));
    }

    #[test]
    fn test_sequence_shorthand() {
        let value = parse(indoc! {r#"
            - name: Wood
              quantity: 2
            - name: Nail
              quantity: 4
              description: small and sharp
        "#});
        let items = normalize_items("Crate", &value).unwrap();

        assert_eq!(items["Wood"].quantity, 2);
        assert_eq!(items["Nail"].quantity, 4);
        assert_eq!(
            items["Nail"].attribute("description").and_then(Value::as_str),
            Some("small and sharp")
        );
    }

    #[test]
    fn test_sequence_duplicate_last_wins() {
        let value = parse(indoc! {r#"
            - name: Wood
              quantity: 2
            - name: Wood
              quantity: 5
        "#});
        let items = normalize_items("Crate", &value).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items["Wood"].quantity, 5);
    }

    #[test]
    fn test_record_shorthand_with_nested_items() {
        let value = parse(indoc! {r#"
            Handle:
              quantity: 1
              items:
                Wood: 3
                Glue:
                  quantity: 1
            Blade: 1
        "#});
        let items = normalize_items("Axe", &value).unwrap();

        let handle = &items["Handle"];
        assert_eq!(handle.quantity, 1);
        assert_eq!(handle.items["Wood"], Ingredient::new("Wood", 3));
        assert_eq!(handle.items["Glue"], Ingredient::new("Glue", 1));
        assert_eq!(items["Blade"].quantity, 1);
    }

    #[test]
    fn test_record_quantity_defaults_to_one() {
        let items = normalize_items("Torch", &parse("Stick: {}")).unwrap();
        assert_eq!(items["Stick"].quantity, 1);
    }

    #[test]
    fn test_null_items_are_empty() {
        assert!(normalize_items("Wood", &Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_values_name_the_item() {
        let err = normalize_items("Plank", &parse("Wood: lots")).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::Malformed {
                item: "Wood".to_string(),
                reason: "expected an integer, a mapping or a list, got a string".to_string(),
            }
        );

        let err = normalize_items("Plank", &parse("Wood: -2")).unwrap_err();
        assert!(err.to_string().contains("Wood"));

        let err = normalize_items("Plank", &parse("Wood: 0")).unwrap_err();
        assert!(err.to_string().contains("positive integer"));

        let err = normalize_items("Plank", &parse("- quantity: 2")).unwrap_err();
        assert!(err.to_string().contains("Plank"));

        let err = normalize_items("Plank", &parse("just wood")).unwrap_err();
        assert!(err.to_string().contains("Plank"));

        let err = normalize_items("Plank", &parse("Wood: {quantity: 1.5}")).unwrap_err();
        assert!(err.to_string().contains("Wood"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let value = parse(indoc! {r#"
            - name: Handle
              quantity: 2
              tier: 3
              items:
                Wood: 3
            - name: Blade
        "#});
        let once = normalize_items("Axe", &value).unwrap();
        let twice = normalize_items("Axe", &serde_yaml::to_value(&once).unwrap()).unwrap();

        assert_eq!(once, twice);
    }

    fn shorthand_strategy() -> impl Strategy<Value = Value> {
        let leaf = prop::collection::btree_map("[a-e]{1,3}", 1u64..50, 1..4).prop_map(|map| {
            let mut mapping = Mapping::new();
            for (name, quantity) in map {
                mapping.insert(Value::from(name), Value::from(quantity));
            }
            Value::Mapping(mapping)
        });
        leaf.prop_recursive(3, 16, 3, |inner| {
            prop::collection::btree_map("[f-j]{1,3}", (1u64..10, inner), 1..3).prop_map(
                |map| {
                    let mut mapping = Mapping::new();
                    for (name, (quantity, items)) in map {
                        let mut record = Mapping::new();
                        record.insert(Value::from("quantity"), Value::from(quantity));
                        record.insert(Value::from("items"), items);
                        mapping.insert(Value::from(name), Value::Mapping(record));
                    }
                    Value::Mapping(mapping)
                },
            )
        })
    }

    proptest! {
        /// Property: normalizing canonical output again changes nothing.
        #[test]
        fn normalization_idempotent(value in shorthand_strategy()) {
            let once = normalize_items("root", &value).unwrap();
            let twice = normalize_items("root", &serde_yaml::to_value(&once).unwrap()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
