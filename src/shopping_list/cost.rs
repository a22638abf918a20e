use super::ShoppingList;
use crate::model::{CostKind, IngredientMap};
use std::collections::BTreeMap;
use tracing::{debug, warn};

impl ShoppingList<'_> {
    /// Calculates the crafting cost of every target, intermediate and base
    /// item that has a `crafting_cost`.
    pub fn calculate_crafting_costs(&mut self) {
        self.crafting_cost = self.costs_by_item(CostKind::CraftingCost);
        debug!(
            "Summed crafting_cost for {} items in shopping list.",
            self.crafting_cost.len()
        );
    }

    /// Calculates what buying every item from a vendor would cost.
    pub fn calculate_buy_from_vendor(&mut self) {
        self.buy_from_vendor = self.costs_by_item(CostKind::BuyFromVendor);
        debug!(
            "Summed buy_from_vendor for {} items in shopping list.",
            self.buy_from_vendor.len()
        );
    }

    /// Calculates the revenue of selling the crafted targets to a vendor.
    pub fn calculate_sell_to_vendor(&mut self) {
        let mut total = None;
        for (name, target) in &self.target_items {
            match self.inventory.cost(name, CostKind::SellToVendor) {
                Some(unit) => {
                    let revenue = unit * target.quantity as f64 * self.target_amount as f64;
                    *total.get_or_insert(0.0) += revenue;
                }
                None => warn!("No sell_to_vendor property for {name}."),
            }
        }
        self.sell_to_vendor = total;
    }

    /// Sum of all crafting costs.
    pub fn total_crafting_cost(&self) -> f64 {
        self.crafting_cost.values().sum()
    }

    /// Sum of all vendor buy prices.
    pub fn total_buy_from_vendor(&self) -> f64 {
        self.buy_from_vendor.values().sum()
    }

    /// Per-item totals of one cost attribute over targets, base items and
    /// intermediate steps. Items without the attribute get no entry.
    ///
    /// Targets that cannot be crafted are already on the list as base items
    /// and are counted there only.
    fn costs_by_item(&self, kind: CostKind) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        let crafted_targets: IngredientMap = self
            .target_items
            .iter()
            .filter(|(name, _)| self.inventory.is_craftable(name))
            .map(|(name, target)| (name.clone(), target.clone()))
            .collect();

        let groups = [
            (&crafted_targets, self.target_amount),
            (&self.items, 1),
            (&self.intermediate_steps, 1),
        ];
        for (group, multiplier) in groups {
            for (name, record) in group {
                if let Some(unit) = self.inventory.cost(name, kind) {
                    let cost = unit * record.quantity as f64 * multiplier as f64;
                    *totals.entry(name.clone()).or_insert(0.0) += cost;
                }
            }
        }

        totals
    }
}
