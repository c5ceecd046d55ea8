//! Product rows and the editable product table.
//!
//! A [`ProductRow`] holds only inputs. Everything derived from them lives in
//! [`crate::calculator::EnrichedRow`] and is recomputed on every calculation.

use crate::errors::{MarginError, MarginResult};
use crate::value::{coerce_number, lenient_f64, FloatValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header of the product name column.
pub const NAME_COLUMN: &str = "name";
/// Product name header used by legacy Swedish templates.
pub const LEGACY_NAME_COLUMN: &str = "Produkt";

/// Numeric input columns of a product, in template order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputColumn {
    /// Selling price per kg of sellable output.
    UnitPrice,
    /// Percentage of raw material converted to product.
    YieldPct,
    /// Percentage of the yielded product lost afterwards.
    WastePct,
    /// Processing cost per kg of sellable output.
    ProcessCostPerKg,
    /// Packaging cost per kg of sellable output.
    PackCostPerKg,
    /// Any other cost per kg of sellable output.
    OtherCostPerKg,
    /// Raw material input quantity.
    RawQtyKg,
}

impl InputColumn {
    pub const ALL: [InputColumn; 7] = [
        InputColumn::UnitPrice,
        InputColumn::YieldPct,
        InputColumn::WastePct,
        InputColumn::ProcessCostPerKg,
        InputColumn::PackCostPerKg,
        InputColumn::OtherCostPerKg,
        InputColumn::RawQtyKg,
    ];

    /// Canonical header name.
    pub fn name(&self) -> &'static str {
        match self {
            InputColumn::UnitPrice => "unit_price",
            InputColumn::YieldPct => "yield_pct",
            InputColumn::WastePct => "waste_pct",
            InputColumn::ProcessCostPerKg => "process_cost_per_kg",
            InputColumn::PackCostPerKg => "pack_cost_per_kg",
            InputColumn::OtherCostPerKg => "other_cost_per_kg",
            InputColumn::RawQtyKg => "raw_qty_kg",
        }
    }

    /// Header used by legacy Swedish templates.
    pub fn legacy_name(&self) -> &'static str {
        match self {
            InputColumn::UnitPrice => "Pris/ kg (SEK)",
            InputColumn::YieldPct => "Utbyte (%)",
            InputColumn::WastePct => "Spill (%)",
            InputColumn::ProcessCostPerKg => "Proc.kost/ kg säljbart",
            InputColumn::PackCostPerKg => "Pack/ kg säljbart",
            InputColumn::OtherCostPerKg => "Övrigt/ kg säljbart",
            InputColumn::RawQtyKg => "Råvara (kg)",
        }
    }

    /// Match a header against the canonical and legacy names.
    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        InputColumn::ALL
            .into_iter()
            .find(|c| c.name() == header || c.legacy_name() == header)
    }
}

impl fmt::Display for InputColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// True if `header` names the product name column.
pub fn is_name_header(header: &str) -> bool {
    let header = header.trim();
    header == NAME_COLUMN || header == LEGACY_NAME_COLUMN
}

/// The static inputs of a single product.
///
/// Every numeric field defaults to `0.0` when missing and is coerced to `0.0` when it
/// cannot be read as a finite number. Percentages are plain percentages and are not
/// clamped to `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRow {
    /// Display label; need not be unique.
    pub name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub unit_price: FloatValue,
    #[serde(deserialize_with = "lenient_f64")]
    pub yield_pct: FloatValue,
    #[serde(deserialize_with = "lenient_f64")]
    pub waste_pct: FloatValue,
    #[serde(deserialize_with = "lenient_f64")]
    pub process_cost_per_kg: FloatValue,
    #[serde(deserialize_with = "lenient_f64")]
    pub pack_cost_per_kg: FloatValue,
    #[serde(deserialize_with = "lenient_f64")]
    pub other_cost_per_kg: FloatValue,
    #[serde(deserialize_with = "lenient_f64")]
    pub raw_qty_kg: FloatValue,
}

impl ProductRow {
    /// A row with the given name and all inputs zero.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style setter, e.g. `ProductRow::named("X").with(InputColumn::RawQtyKg, 100.0)`.
    pub fn with(mut self, column: InputColumn, value: FloatValue) -> Self {
        self.set(column, value);
        self
    }

    /// Read an input, coerced to zero if it is not finite.
    pub fn get(&self, column: InputColumn) -> FloatValue {
        let raw = match column {
            InputColumn::UnitPrice => self.unit_price,
            InputColumn::YieldPct => self.yield_pct,
            InputColumn::WastePct => self.waste_pct,
            InputColumn::ProcessCostPerKg => self.process_cost_per_kg,
            InputColumn::PackCostPerKg => self.pack_cost_per_kg,
            InputColumn::OtherCostPerKg => self.other_cost_per_kg,
            InputColumn::RawQtyKg => self.raw_qty_kg,
        };
        coerce_number(raw)
    }

    /// Set an input. Non-finite values are stored as zero.
    pub fn set(&mut self, column: InputColumn, value: FloatValue) {
        let value = coerce_number(value);
        let slot = match column {
            InputColumn::UnitPrice => &mut self.unit_price,
            InputColumn::YieldPct => &mut self.yield_pct,
            InputColumn::WastePct => &mut self.waste_pct,
            InputColumn::ProcessCostPerKg => &mut self.process_cost_per_kg,
            InputColumn::PackCostPerKg => &mut self.pack_cost_per_kg,
            InputColumn::OtherCostPerKg => &mut self.other_cost_per_kg,
            InputColumn::RawQtyKg => &mut self.raw_qty_kg,
        };
        *slot = value;
    }

    /// A copy with every input passed through [`coerce_number`].
    pub fn sanitised(&self) -> Self {
        InputColumn::ALL
            .into_iter()
            .fold(ProductRow::named(self.name.clone()), |row, c| {
                row.with(c, self.get(c))
            })
    }
}

/// Ordered, resizable collection of products belonging to one scenario.
///
/// Rows have no identity beyond their position; names may repeat.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductTable {
    rows: Vec<ProductRow>,
}

impl ProductTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<ProductRow>) -> Self {
        Self { rows }
    }

    /// The three illustrative products shipped as the import template.
    pub fn default_products() -> Self {
        let product = |name: &str, price, yield_pct, waste_pct, process, pack| ProductRow {
            name: name.to_string(),
            unit_price: price,
            yield_pct,
            waste_pct,
            process_cost_per_kg: process,
            pack_cost_per_kg: pack,
            other_cost_per_kg: 0.0,
            raw_qty_kg: 100.0,
        };

        Self::from_rows(vec![
            product("Hot-smoked portion", 240.0, 72.0, 3.0, 18.0, 10.0),
            product("Sliced", 280.0, 65.0, 5.0, 25.0, 12.0),
            product("Whole side", 210.0, 80.0, 2.0, 12.0, 8.0),
        ])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProductRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProductRow> {
        self.rows.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ProductRow> {
        self.rows.get_mut(index)
    }

    /// Append a row at the end.
    pub fn push(&mut self, row: ProductRow) {
        self.rows.push(row);
    }

    /// Insert a row before `index`. `index == len()` appends.
    pub fn insert(&mut self, index: usize, row: ProductRow) -> MarginResult<()> {
        if index > self.rows.len() {
            return Err(MarginError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        self.rows.insert(index, row);
        Ok(())
    }

    /// Remove and return the row at `index`.
    pub fn remove(&mut self, index: usize) -> MarginResult<ProductRow> {
        if index >= self.rows.len() {
            return Err(MarginError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Grow or shrink the table to exactly `count` rows.
    ///
    /// New rows copy the first default product and are named `Product {n}` after their
    /// 1-based position. Shrinking drops rows from the end.
    pub fn resize(&mut self, count: usize) {
        if count <= self.rows.len() {
            self.rows.truncate(count);
            return;
        }

        let template = ProductTable::default_products().rows.swap_remove(0);
        while self.rows.len() < count {
            let position = self.rows.len() + 1;
            self.rows.push(ProductRow {
                name: format!("Product {}", position),
                ..template.clone()
            });
        }
    }
}

impl From<Vec<ProductRow>> for ProductTable {
    fn from(rows: Vec<ProductRow>) -> Self {
        Self::from_rows(rows)
    }
}

impl FromIterator<ProductRow> for ProductTable {
    fn from_iter<I: IntoIterator<Item = ProductRow>>(iter: I) -> Self {
        Self::from_rows(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ProductTable {
    type Item = &'a ProductRow;
    type IntoIter = std::slice::Iter<'a, ProductRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for ProductTable {
    type Item = ProductRow;
    type IntoIter = std::vec::IntoIter<ProductRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_products() {
        let table = ProductTable::default_products();
        assert_eq!(table.len(), 3);

        let first = table.get(0).unwrap();
        assert_eq!(first.name, "Hot-smoked portion");
        assert_eq!(first.unit_price, 240.0);
        assert_eq!(first.yield_pct, 72.0);
        assert_eq!(first.waste_pct, 3.0);
        assert_eq!(first.raw_qty_kg, 100.0);

        assert!(table.iter().all(|r| r.other_cost_per_kg == 0.0));
    }

    #[test]
    fn test_header_matching() {
        assert_eq!(
            InputColumn::from_header("unit_price"),
            Some(InputColumn::UnitPrice)
        );
        assert_eq!(
            InputColumn::from_header(" Råvara (kg) "),
            Some(InputColumn::RawQtyKg)
        );
        assert_eq!(InputColumn::from_header("colour"), None);
        assert!(is_name_header("Produkt"));
        assert!(is_name_header("name"));
        assert!(!is_name_header("Name of product"));
    }

    #[test]
    fn test_get_set_coerce_non_finite() {
        let mut row = ProductRow::named("X");
        row.set(InputColumn::YieldPct, f64::NAN);
        assert_eq!(row.yield_pct, 0.0);

        row.raw_qty_kg = f64::INFINITY;
        assert_eq!(row.get(InputColumn::RawQtyKg), 0.0);
        assert_eq!(row.sanitised().raw_qty_kg, 0.0);
    }

    #[test]
    fn test_no_clamping_of_percentages() {
        let row = ProductRow::named("X")
            .with(InputColumn::YieldPct, 120.0)
            .with(InputColumn::WastePct, -5.0);
        assert_eq!(row.get(InputColumn::YieldPct), 120.0);
        assert_eq!(row.get(InputColumn::WastePct), -5.0);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut table = ProductTable::new();
        table.push(ProductRow::named("a"));
        table.push(ProductRow::named("c"));
        table.insert(1, ProductRow::named("b")).unwrap();

        let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);

        let removed = table.remove(0).unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(table.len(), 2);

        assert!(matches!(
            table.remove(2),
            Err(MarginError::RowOutOfRange { index: 2, len: 2 })
        ));
        assert!(table.insert(5, ProductRow::named("z")).is_err());
    }

    #[test]
    fn test_resize_grow_and_shrink() {
        let mut table = ProductTable::default_products();
        table.resize(5);
        assert_eq!(table.len(), 5);
        assert_eq!(table.get(3).unwrap().name, "Product 4");
        assert_eq!(table.get(4).unwrap().name, "Product 5");
        // New rows copy the first default product's inputs
        assert_eq!(table.get(4).unwrap().unit_price, 240.0);
        assert_eq!(table.get(4).unwrap().yield_pct, 72.0);

        table.resize(1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().name, "Hot-smoked portion");

        table.resize(0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_deserialise_with_missing_and_junk_fields() {
        let row: ProductRow =
            serde_json::from_str(r#"{"name": "X", "unit_price": "abc", "raw_qty_kg": 50}"#)
                .unwrap();
        assert_eq!(row.name, "X");
        assert_eq!(row.unit_price, 0.0);
        assert_eq!(row.raw_qty_kg, 50.0);
        assert_eq!(row.yield_pct, 0.0);
    }
}
