use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Represents one ingredient occurrence in a crafting breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftingTree {
    /// Item name
    pub name: String,
    /// Units needed along this branch
    pub quantity: u64,
    /// Ingredients this item is crafted from, empty for base items
    pub children: BTreeMap<String, CraftingTree>,
}

impl CraftingTree {
    pub(crate) fn new(name: String, quantity: u64) -> Self {
        CraftingTree {
            name,
            quantity,
            children: BTreeMap::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of crafting levels below and including this node.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .values()
            .map(CraftingTree::depth)
            .max()
            .unwrap_or(0)
    }

    /// Sums the base items reached by every branch.
    pub fn leaves(&self) -> BTreeMap<String, u64> {
        let mut leaves = BTreeMap::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves(&self, leaves: &mut BTreeMap<String, u64>) {
        if self.is_leaf() {
            *leaves.entry(self.name.clone()).or_default() += self.quantity;
        }
        for child in self.children.values() {
            child.collect_leaves(leaves);
        }
    }

    /// Renders the tree as an indented list, one node per line.
    pub fn render(&self) -> String {
        let mut output = String::new();
        self.render_into(&mut output, 0);
        output
    }

    fn render_into(&self, output: &mut String, level: usize) {
        let _ = writeln!(
            output,
            "{:indent$}- {} x {}",
            "",
            self.quantity,
            self.name,
            indent = level * 2
        );
        for child in self.children.values() {
            child.render_into(output, level + 1);
        }
    }
}
