//! Margin calculator
//!
//! Turns a [`ProductTable`] and the shared raw-material price into per-product margin
//! figures and a totals row.
//!
//! # What This Does
//!
//! For every row, in this fixed order:
//!
//! 1. Sellable output: $S = Q_{raw} \times \frac{yield}{100} \times (1 - \frac{waste}{100})$
//! 2. Revenue: $R = S \times price$
//! 3. Cost components: raw material on $Q_{raw}$, processing, packaging and other on $S$
//! 4. Variable cost: the sum of the four components
//! 5. Margin: $M = R - C_{var}$
//! 6. Ratios: $M / Q_{raw}$, $M / S$ and $100 \times M / R$
//!
//! A single reduction then sums raw kg, sellable kg, revenue, variable cost and margin.
//!
//! There are no error paths. Non-finite inputs are treated as zero and ratios with a
//! zero denominator come back as [`Ratio::Undefined`]. Inputs are never modified.

use crate::product::{ProductRow, ProductTable};
use crate::ratio::Ratio;
use crate::value::{coerce_number, FloatValue};
use serde::{Deserialize, Serialize};

/// Label of the synthetic totals row.
pub const TOTALS_LABEL: &str = "TOTAL";

/// A product's inputs together with everything derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    /// Sanitised copy of the inputs the figures were computed from.
    #[serde(flatten)]
    pub inputs: ProductRow,
    pub sellable_kg: FloatValue,
    pub revenue: FloatValue,
    pub raw_cost: FloatValue,
    pub process_cost: FloatValue,
    pub pack_cost: FloatValue,
    pub other_cost: FloatValue,
    pub variable_cost: FloatValue,
    pub margin: FloatValue,
    pub margin_per_raw_kg: Ratio,
    pub margin_per_sellable_kg: Ratio,
    pub margin_pct_of_revenue: Ratio,
}

impl EnrichedRow {
    pub fn name(&self) -> &str {
        &self.inputs.name
    }
}

/// Column-wise sums over all rows of a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub raw_qty_kg: FloatValue,
    pub sellable_kg: FloatValue,
    pub revenue: FloatValue,
    pub variable_cost: FloatValue,
    pub margin: FloatValue,
}

impl Totals {
    /// Total margin per kg of raw material, from the summed values.
    pub fn margin_per_raw_kg(&self) -> Ratio {
        Ratio::divide(self.margin, self.raw_qty_kg)
    }

    /// Total margin per kg of sellable output, from the summed values.
    pub fn margin_per_sellable_kg(&self) -> Ratio {
        Ratio::divide(self.margin, self.sellable_kg)
    }

    /// Total margin as a percentage of total revenue.
    pub fn margin_pct_of_revenue(&self) -> Ratio {
        Ratio::divide(self.margin, self.revenue).map(|v| 100.0 * v)
    }

    fn accumulate(self, row: &EnrichedRow) -> Self {
        Self {
            raw_qty_kg: coerce_number(self.raw_qty_kg + row.inputs.raw_qty_kg),
            sellable_kg: coerce_number(self.sellable_kg + row.sellable_kg),
            revenue: coerce_number(self.revenue + row.revenue),
            variable_cost: coerce_number(self.variable_cost + row.variable_cost),
            margin: coerce_number(self.margin + row.margin),
        }
    }
}

/// Output of one calculator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    /// Raw material price the figures were computed with.
    pub raw_price: FloatValue,
    /// One row per input row, in input order.
    pub rows: Vec<EnrichedRow>,
    pub totals: Totals,
}

/// Compute the derived figures for a single product.
///
/// A figure that overflows `f64` is reported as zero, so no NaN reaches later steps.
pub fn compute_row(row: &ProductRow, raw_price: FloatValue) -> EnrichedRow {
    let inputs = row.sanitised();
    let raw_price = coerce_number(raw_price);

    let sellable_kg = coerce_number(
        inputs.raw_qty_kg * (inputs.yield_pct / 100.0) * (1.0 - inputs.waste_pct / 100.0),
    );
    let revenue = coerce_number(sellable_kg * inputs.unit_price);

    let raw_cost = coerce_number(inputs.raw_qty_kg * raw_price);
    let process_cost = coerce_number(sellable_kg * inputs.process_cost_per_kg);
    let pack_cost = coerce_number(sellable_kg * inputs.pack_cost_per_kg);
    let other_cost = coerce_number(sellable_kg * inputs.other_cost_per_kg);
    let variable_cost = coerce_number(raw_cost + process_cost + pack_cost + other_cost);

    let margin = coerce_number(revenue - variable_cost);

    EnrichedRow {
        margin_per_raw_kg: Ratio::divide(margin, inputs.raw_qty_kg),
        margin_per_sellable_kg: Ratio::divide(margin, sellable_kg),
        margin_pct_of_revenue: Ratio::divide(margin, revenue).map(|v| 100.0 * v),
        inputs,
        sellable_kg,
        revenue,
        raw_cost,
        process_cost,
        pack_cost,
        other_cost,
        variable_cost,
        margin,
    }
}

/// Sum the five summable columns. An empty slice gives all zeros.
pub fn totals(rows: &[EnrichedRow]) -> Totals {
    rows.iter().fold(Totals::default(), Totals::accumulate)
}

/// Run the full pipeline over a table.
pub fn compute(table: &ProductTable, raw_price: FloatValue) -> Calculation {
    let raw_price = coerce_number(raw_price);
    let rows: Vec<EnrichedRow> = table.iter().map(|r| compute_row(r, raw_price)).collect();
    let totals = totals(&rows);

    log::debug!(
        "Computed {} product rows at raw price {}: total margin {}",
        rows.len(),
        raw_price,
        totals.margin
    );

    Calculation {
        raw_price,
        rows,
        totals,
    }
}

/// Calculator bound to a raw material price.
///
/// Convenience for callers that evaluate several tables against the same price, such
/// as the two scenarios of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginCalculator {
    raw_price: FloatValue,
}

impl MarginCalculator {
    pub fn new(raw_price: FloatValue) -> Self {
        Self {
            raw_price: coerce_number(raw_price),
        }
    }

    pub fn raw_price(&self) -> FloatValue {
        self.raw_price
    }

    pub fn compute(&self, table: &ProductTable) -> Calculation {
        compute(table, self.raw_price)
    }
}
