//! Scenarios and their comparison.
//!
//! A session holds two independently editable product tables, A and B, that share a
//! single raw material price. The price is passed explicitly into every calculation
//! rather than living in global state.

use crate::calculator::{compute, Calculation, Totals};
use crate::errors::{MarginError, MarginResult};
use crate::product::ProductTable;
use crate::ratio::Ratio;
use crate::value::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw material price used when none is configured (per kg of raw material).
pub const DEFAULT_RAW_PRICE: FloatValue = 70.0;

/// Which of the two scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioId {
    A,
    B,
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioId::A => write!(f, "A"),
            ScenarioId::B => write!(f, "B"),
        }
    }
}

/// A named product table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub label: String,
    pub table: ProductTable,
}

impl Scenario {
    pub fn new(id: ScenarioId, table: ProductTable) -> Self {
        Self {
            id,
            label: format!("Scenario {}", id),
            table,
        }
    }

    pub fn compute(&self, raw_price: FloatValue) -> Calculation {
        compute(&self.table, raw_price)
    }
}

/// Check a raw material price before it is stored in a session.
pub fn validate_raw_price(raw_price: FloatValue) -> MarginResult<FloatValue> {
    if !raw_price.is_finite() || raw_price < 0.0 {
        return Err(MarginError::InvalidParameter(format!(
            "raw price must be a finite, non-negative number, got {}",
            raw_price
        )));
    }
    Ok(raw_price)
}

/// Both scenarios plus the raw material price they share.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSet {
    raw_price: FloatValue,
    a: Scenario,
    b: Scenario,
}

impl Default for ScenarioSet {
    fn default() -> Self {
        Self {
            raw_price: DEFAULT_RAW_PRICE,
            a: Scenario::new(ScenarioId::A, ProductTable::default_products()),
            b: Scenario::new(ScenarioId::B, ProductTable::default_products()),
        }
    }
}

impl ScenarioSet {
    pub fn new(raw_price: FloatValue, a: ProductTable, b: ProductTable) -> MarginResult<Self> {
        Ok(Self {
            raw_price: validate_raw_price(raw_price)?,
            a: Scenario::new(ScenarioId::A, a),
            b: Scenario::new(ScenarioId::B, b),
        })
    }

    pub fn raw_price(&self) -> FloatValue {
        self.raw_price
    }

    pub fn set_raw_price(&mut self, raw_price: FloatValue) -> MarginResult<()> {
        self.raw_price = validate_raw_price(raw_price)?;
        Ok(())
    }

    pub fn scenario(&self, id: ScenarioId) -> &Scenario {
        match id {
            ScenarioId::A => &self.a,
            ScenarioId::B => &self.b,
        }
    }

    pub fn scenario_mut(&mut self, id: ScenarioId) -> &mut Scenario {
        match id {
            ScenarioId::A => &mut self.a,
            ScenarioId::B => &mut self.b,
        }
    }

    /// Resize both tables to `count` rows, see [`ProductTable::resize`].
    pub fn resize_all(&mut self, count: usize) {
        self.a.table.resize(count);
        self.b.table.resize(count);
    }

    /// Calculate one scenario at the shared raw price.
    pub fn compute(&self, id: ScenarioId) -> Calculation {
        self.scenario(id).compute(self.raw_price)
    }

    /// Calculate both scenarios and diff their totals.
    pub fn compare(&self) -> Comparison {
        compare(&self.compute(ScenarioId::A), &self.compute(ScenarioId::B))
    }
}

/// Key figures shown side by side when comparing scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyFigure {
    RawQtyKg,
    SellableKg,
    Revenue,
    VariableCost,
    Margin,
    MarginPerRawKg,
}

impl KeyFigure {
    pub const ALL: [KeyFigure; 6] = [
        KeyFigure::RawQtyKg,
        KeyFigure::SellableKg,
        KeyFigure::Revenue,
        KeyFigure::VariableCost,
        KeyFigure::Margin,
        KeyFigure::MarginPerRawKg,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            KeyFigure::RawQtyKg => "Raw material (kg)",
            KeyFigure::SellableKg => "Sellable (kg)",
            KeyFigure::Revenue => "Revenue",
            KeyFigure::VariableCost => "Variable cost",
            KeyFigure::Margin => "Margin",
            KeyFigure::MarginPerRawKg => "Margin / kg raw",
        }
    }

    /// Read this figure from a totals row.
    pub fn of(&self, totals: &Totals) -> Ratio {
        match self {
            KeyFigure::RawQtyKg => Ratio::from_value(totals.raw_qty_kg),
            KeyFigure::SellableKg => Ratio::from_value(totals.sellable_kg),
            KeyFigure::Revenue => Ratio::from_value(totals.revenue),
            KeyFigure::VariableCost => Ratio::from_value(totals.variable_cost),
            KeyFigure::Margin => Ratio::from_value(totals.margin),
            KeyFigure::MarginPerRawKg => totals.margin_per_raw_kg(),
        }
    }
}

/// One line of a [`Comparison`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonLine {
    pub figure: KeyFigure,
    pub a: Ratio,
    pub b: Ratio,
    /// `b - a`
    pub difference: Ratio,
}

/// Side-by-side totals of two calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub lines: Vec<ComparisonLine>,
}

impl Comparison {
    pub fn line(&self, figure: KeyFigure) -> Option<&ComparisonLine> {
        self.lines.iter().find(|l| l.figure == figure)
    }
}

/// Compare the totals of two calculations, reporting B relative to A.
pub fn compare(a: &Calculation, b: &Calculation) -> Comparison {
    let lines = KeyFigure::ALL
        .into_iter()
        .map(|figure| {
            let va = figure.of(&a.totals);
            let vb = figure.of(&b.totals);
            ComparisonLine {
                figure,
                a: va,
                b: vb,
                difference: vb.difference(va),
            }
        })
        .collect();
    Comparison { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{InputColumn, ProductRow};

    #[test]
    fn test_default_set_has_identical_scenarios() {
        let set = ScenarioSet::default();
        assert_eq!(set.raw_price(), DEFAULT_RAW_PRICE);
        assert_eq!(
            set.scenario(ScenarioId::A).table,
            set.scenario(ScenarioId::B).table
        );

        let comparison = set.compare();
        assert_eq!(comparison.lines.len(), 6);
        for line in &comparison.lines {
            assert_eq!(line.difference, Ratio::Defined(0.0), "{:?}", line.figure);
        }
    }

    #[test]
    fn test_scenarios_are_independent() {
        let mut set = ScenarioSet::default();
        set.scenario_mut(ScenarioId::B)
            .table
            .push(ProductRow::named("extra").with(InputColumn::RawQtyKg, 50.0));

        assert_eq!(set.scenario(ScenarioId::A).table.len(), 3);
        assert_eq!(set.scenario(ScenarioId::B).table.len(), 4);

        let comparison = set.compare();
        let raw = comparison.line(KeyFigure::RawQtyKg).unwrap();
        assert_eq!(raw.a, Ratio::Defined(300.0));
        assert_eq!(raw.b, Ratio::Defined(350.0));
        assert_eq!(raw.difference, Ratio::Defined(50.0));

        // The extra row has no yield, so it only adds raw cost
        let margin = comparison.line(KeyFigure::Margin).unwrap();
        let diff = margin.difference.value().unwrap();
        assert!((diff + 3500.0).abs() < 1e-9, "got {}", diff);
    }

    #[test]
    fn test_shared_raw_price_applies_to_both() {
        let mut set = ScenarioSet::default();
        set.set_raw_price(80.0).unwrap();
        assert_eq!(set.compute(ScenarioId::A).raw_price, 80.0);
        assert_eq!(set.compute(ScenarioId::B).raw_price, 80.0);
    }

    #[test]
    fn test_invalid_raw_price_rejected() {
        let mut set = ScenarioSet::default();
        assert!(set.set_raw_price(-1.0).is_err());
        assert!(set.set_raw_price(f64::NAN).is_err());
        assert_eq!(set.raw_price(), DEFAULT_RAW_PRICE);
        assert!(ScenarioSet::new(f64::INFINITY, ProductTable::new(), ProductTable::new()).is_err());
    }

    #[test]
    fn test_compare_with_empty_scenario() {
        let set = ScenarioSet::new(
            70.0,
            ProductTable::default_products(),
            ProductTable::new(),
        )
        .unwrap();
        let comparison = set.compare();

        let per_raw = comparison.line(KeyFigure::MarginPerRawKg).unwrap();
        assert!(per_raw.a.is_defined());
        assert_eq!(per_raw.b, Ratio::Undefined);
        assert_eq!(per_raw.difference, Ratio::Undefined);

        let revenue = comparison.line(KeyFigure::Revenue).unwrap();
        assert_eq!(revenue.b, Ratio::Defined(0.0));
    }

    #[test]
    fn test_resize_all() {
        let mut set = ScenarioSet::default();
        set.resize_all(12);
        assert_eq!(set.scenario(ScenarioId::A).table.len(), 12);
        assert_eq!(set.scenario(ScenarioId::B).table.len(), 12);
    }

    #[test]
    fn test_scenario_labels() {
        let set = ScenarioSet::default();
        assert_eq!(set.scenario(ScenarioId::A).label, "Scenario A");
        assert_eq!(set.scenario(ScenarioId::B).id, ScenarioId::B);
    }
}
