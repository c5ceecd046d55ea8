//! End-to-end checks of the calculation pipeline.
//!
//! These tests verify the properties every calculation must satisfy:
//! - Totals are exact column sums of the per-product rows
//! - Degenerate denominators give undefined ratios rather than NaN or infinity
//! - Calculations are repeatable and leave their inputs untouched

use approx::assert_relative_eq;
use margincalc_core::calculator::{compute, Totals};
use margincalc_core::product::{InputColumn, ProductRow, ProductTable};
use margincalc_core::ratio::Ratio;
use margincalc_core::scenario::{KeyFigure, ScenarioId, ScenarioSet};
use margincalc_core::table_io::{read_table, template_csv};

fn varied_table() -> ProductTable {
    let mut table = ProductTable::default_products();
    table.push(
        ProductRow::named("No yield")
            .with(InputColumn::RawQtyKg, 50.0)
            .with(InputColumn::UnitPrice, 300.0),
    );
    table.push(ProductRow::named("Nothing"));
    table.push(
        ProductRow::named("Loss maker")
            .with(InputColumn::RawQtyKg, 20.0)
            .with(InputColumn::YieldPct, 40.0)
            .with(InputColumn::WastePct, 10.0)
            .with(InputColumn::UnitPrice, 50.0)
            .with(InputColumn::OtherCostPerKg, 5.0),
    );
    table
}

mod totals {
    use super::*;

    #[test]
    fn test_margin_total_is_sum_of_rows() {
        for raw_price in [0.0, 55.5, 70.0, 120.0] {
            let calc = compute(&varied_table(), raw_price);
            let mut expected = 0.0;
            for row in &calc.rows {
                expected += row.margin;
            }
            assert_eq!(calc.totals.margin, expected);
        }
    }

    #[test]
    fn test_all_summed_columns() {
        let calc = compute(&varied_table(), 70.0);

        let sum = |f: fn(&margincalc_core::calculator::EnrichedRow) -> f64| -> f64 {
            calc.rows.iter().map(f).sum()
        };

        assert_relative_eq!(calc.totals.raw_qty_kg, sum(|r| r.inputs.raw_qty_kg));
        assert_relative_eq!(calc.totals.sellable_kg, sum(|r| r.sellable_kg));
        assert_relative_eq!(calc.totals.revenue, sum(|r| r.revenue));
        assert_relative_eq!(calc.totals.variable_cost, sum(|r| r.variable_cost));
    }

    #[test]
    fn test_empty_table_totals_are_zero() {
        let calc = compute(&ProductTable::new(), 70.0);
        assert!(calc.rows.is_empty());
        assert_eq!(calc.totals, Totals::default());
    }
}

mod ratios {
    use super::*;

    #[test]
    fn test_no_nan_or_infinity_anywhere() {
        let calc = compute(&varied_table(), 70.0);
        for row in &calc.rows {
            for value in [
                row.sellable_kg,
                row.revenue,
                row.raw_cost,
                row.variable_cost,
                row.margin,
            ] {
                assert!(value.is_finite(), "{}: {}", row.name(), value);
            }
            for ratio in [
                row.margin_per_raw_kg,
                row.margin_per_sellable_kg,
                row.margin_pct_of_revenue,
            ] {
                if let Ratio::Defined(v) = ratio {
                    assert!(v.is_finite());
                }
            }
        }
    }

    #[test]
    fn test_zero_raw_quantity_row() {
        let calc = compute(&varied_table(), 70.0);
        let nothing = calc.rows.iter().find(|r| r.name() == "Nothing").unwrap();
        assert_eq!(nothing.sellable_kg, 0.0);
        assert_eq!(nothing.revenue, 0.0);
        assert_eq!(nothing.margin_per_raw_kg, Ratio::Undefined);
    }

    #[test]
    fn test_zero_yield_row() {
        let calc = compute(&varied_table(), 70.0);
        let row = calc.rows.iter().find(|r| r.name() == "No yield").unwrap();
        assert_eq!(row.sellable_kg, 0.0);
        assert_eq!(row.margin, -row.raw_cost);
        assert!(row.margin < 0.0);
        assert_eq!(row.margin_per_sellable_kg, Ratio::Undefined);
        assert_eq!(row.margin_pct_of_revenue, Ratio::Undefined);
    }

    #[test]
    fn test_loss_maker() {
        let calc = compute(&varied_table(), 70.0);
        let row = calc.rows.iter().find(|r| r.name() == "Loss maker").unwrap();
        // 20 * 0.4 * 0.9 = 7.2 kg sellable
        assert_relative_eq!(row.sellable_kg, 7.2, epsilon = 1e-12);
        assert_relative_eq!(row.revenue, 360.0, epsilon = 1e-9);
        assert_relative_eq!(row.variable_cost, 1400.0 + 36.0, epsilon = 1e-9);
        assert_relative_eq!(
            row.margin_pct_of_revenue.value().unwrap(),
            100.0 * (360.0 - 1436.0) / 360.0,
            epsilon = 1e-9
        );
    }
}

mod purity {
    use super::*;

    #[test]
    fn test_bit_identical_results() {
        let table = varied_table();
        let first = compute(&table, 70.0);
        let second = compute(&table, 70.0);

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(
            first.totals.margin.to_bits(),
            second.totals.margin.to_bits()
        );
    }

    #[test]
    fn test_inputs_unchanged() {
        let table = varied_table();
        let snapshot = table.clone();
        let _ = compute(&table, 70.0);
        assert_eq!(table, snapshot);
    }
}

mod workflow {
    use super::*;

    #[test]
    fn test_template_import_edit_compare() {
        let template = template_csv().unwrap();
        let imported = read_table(template.as_slice()).unwrap();

        let mut set = ScenarioSet::new(70.0, imported.clone(), imported).unwrap();
        set.scenario_mut(ScenarioId::B)
            .table
            .get_mut(0)
            .unwrap()
            .set(InputColumn::UnitPrice, 260.0);

        let comparison = set.compare();
        let margin = comparison.line(KeyFigure::Margin).unwrap();

        // Only revenue of the first product changes: 69.84 kg * 20 more per kg
        assert_relative_eq!(
            margin.difference.value().unwrap(),
            69.84 * 20.0,
            epsilon = 1e-6
        );

        let raw = comparison.line(KeyFigure::RawQtyKg).unwrap();
        assert_eq!(raw.difference, Ratio::Defined(0.0));
    }
}
