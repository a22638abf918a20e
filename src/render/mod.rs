//! Text, YAML and JSON output of a computed shopping list.

use crate::shopping_list::{quantities, ShoppingList};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// JSON document of a shopping list. Fields are declared in key order.
#[derive(Debug, Serialize)]
struct ShoppingListDocument<'a> {
    buy_from_vendor: &'a BTreeMap<String, f64>,
    crafting_cost: &'a BTreeMap<String, f64>,
    intermediates: BTreeMap<&'a str, u64>,
    sell_to_vendor: Option<f64>,
    shopping_list: BTreeMap<&'a str, u64>,
    target_amount: u64,
    target_items: BTreeMap<&'a str, u64>,
}

/// Renders the items still on the list as `name: quantity` YAML, sorted by
/// name and without a trailing newline.
pub fn to_yaml(list: &ShoppingList<'_>) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(&list.base_requirements())?;
    Ok(yaml.trim_end().to_string())
}

pub fn to_json(list: &ShoppingList<'_>) -> Result<String, serde_json::Error> {
    let document = ShoppingListDocument {
        buy_from_vendor: list.buy_from_vendor(),
        crafting_cost: list.crafting_cost(),
        intermediates: quantities(list.intermediate_steps()),
        sell_to_vendor: list.sell_to_vendor(),
        shopping_list: list.base_requirements(),
        target_amount: list.target_amount(),
        target_items: quantities(list.target_items()),
    };
    serde_json::to_string_pretty(&document)
}

/// Formats the shopping list for a terminal.
pub fn format_for_display(list: &ShoppingList<'_>) -> String {
    let targets = target_names(list);
    let mut message = String::new();

    let _ = writeln!(
        message,
        "You need these items to craft {} of {}:",
        list.target_amount(),
        targets
    );
    write_quantities(&mut message, &list.base_requirements());

    message.push('\n');
    message.push_str("The following intermediate items need to be crafted:\n");
    write_quantities(&mut message, &quantities(list.intermediate_steps()));

    message.push('\n');
    let _ = writeln!(
        message,
        "It will cost a total of {} to craft these items:",
        format_number(list.total_crafting_cost())
    );
    if list.crafting_cost().is_empty() {
        message.push_str("(none)\n");
    }
    for (name, cost) in list.crafting_cost() {
        let _ = writeln!(message, "{name}: {}", format_number(*cost));
    }

    if let Some(revenue) = list.sell_to_vendor() {
        message.push('\n');
        let _ = writeln!(
            message,
            "{targets} sells to a vendor for: {}",
            format_number(revenue)
        );
    }

    message
}

fn target_names(list: &ShoppingList<'_>) -> String {
    list.target_items()
        .values()
        .map(|target| match target.quantity {
            1 => target.name.clone(),
            times => format!("{times} x {}", target.name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_quantities(message: &mut String, items: &BTreeMap<&str, u64>) {
    if items.is_empty() {
        message.push_str("(none)\n");
    }
    for (name, quantity) in items {
        let _ = writeln!(message, "{name}: {quantity}");
    }
}

/// Format a number with thousand separators
///
/// Whole numbers print without a fraction, others keep the shortest
/// representation of their fraction.
pub fn format_number(value: f64) -> String {
    let formatted = value.to_string();
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
