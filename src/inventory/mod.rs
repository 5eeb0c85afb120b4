//! Inventory items and stock status classification

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::*;
use crate::utils::{lenient, wire};
use crate::utils::validation::{parse_amount, parse_quantity, validate_required};

/// Stock level relative to the reorder threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Label shown in the status badge
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a stock level.
///
/// Only an exact zero is out of stock; a negative count (which the input
/// coercion never produces) falls through to in stock.
pub fn classify_stock(current: i64, minimum: i64) -> StockStatus {
    if current == 0 {
        StockStatus::OutOfStock
    } else if current > 0 && current <= minimum {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

/// Stocked item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub item_code: String,
    pub item_name: String,
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        serialize_with = "wire::amount"
    )]
    pub cost_price: BigDecimal,
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        serialize_with = "wire::amount"
    )]
    pub selling_price: BigDecimal,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub opening_quantity: i64,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub minimum_quantity: i64,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub current_quantity: i64,
}

impl InventoryItem {
    /// Create an item from raw form input. Current stock starts at the
    /// opening quantity.
    pub fn new(
        item_code: impl Into<String>,
        item_name: impl Into<String>,
        cost_price: &str,
        selling_price: &str,
        opening_quantity: &str,
        minimum_quantity: &str,
    ) -> Self {
        let opening_quantity = parse_quantity(opening_quantity);
        Self {
            id: None,
            item_code: item_code.into(),
            item_name: item_name.into(),
            cost_price: parse_amount(cost_price),
            selling_price: parse_amount(selling_price),
            opening_quantity,
            minimum_quantity: parse_quantity(minimum_quantity),
            current_quantity: opening_quantity,
        }
    }

    pub fn status(&self) -> StockStatus {
        classify_stock(self.current_quantity, self.minimum_quantity)
    }

    /// At or below the reorder threshold, out of stock included
    pub fn needs_reorder(&self) -> bool {
        self.current_quantity <= self.minimum_quantity
    }

    /// Stock valued at cost
    pub fn stock_value(&self) -> BigDecimal {
        &self.cost_price * BigDecimal::from(self.current_quantity)
    }

    /// Code and name are required
    pub fn validate(&self) -> DeskResult<()> {
        validate_required(&self.item_code, "Item code")?;
        validate_required(&self.item_name, "Item name")?;
        Ok(())
    }
}

/// Figures for the inventory header cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub total_items: usize,
    pub low_stock: usize,
    pub total_quantity: i64,
    /// Σ cost_price × current_quantity
    pub total_value: BigDecimal,
}

/// Local inventory list
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, assigning the next id. Item codes must be unique.
    pub fn add(&mut self, item: InventoryItem) -> DeskResult<&InventoryItem> {
        item.validate()?;
        if self.items.iter().any(|i| i.item_code == item.item_code) {
            return Err(DeskError::Validation(format!(
                "Item with code '{}' already exists",
                item.item_code
            )));
        }

        let mut item = item;
        item.id = Some(self.items.iter().filter_map(|i| i.id).max().unwrap_or(0) + 1);
        self.items.push(item);
        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Remove an item by id
    pub fn delete(&mut self, item_id: u64) -> DeskResult<InventoryItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == Some(item_id))
            .ok_or_else(|| DeskError::NotFound(format!("inventory item {}", item_id)))?;
        Ok(self.items.remove(index))
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// Items whose code or name contains the query, ignoring case
    pub fn search(&self, query: &str) -> Vec<&InventoryItem> {
        let query = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|i| {
                i.item_code.to_lowercase().contains(&query)
                    || i.item_name.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn stats(&self) -> InventoryStats {
        InventoryStats {
            total_items: self.items.len(),
            low_stock: self.items.iter().filter(|i| i.needs_reorder()).count(),
            total_quantity: self.items.iter().map(|i| i.current_quantity).sum(),
            total_value: self.items.iter().map(|i| i.stock_value()).sum(),
        }
    }
}
