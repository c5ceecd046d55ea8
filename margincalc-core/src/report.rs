//! Rendering of calculation results.
//!
//! The per-row table and the totals row share one column set. Ratios that could not be
//! computed render as [`UNDEFINED_MARKER`], never as `0`, `NaN` or `inf`.

use crate::calculator::{Calculation, EnrichedRow, Totals, TOTALS_LABEL};
use crate::ratio::{Ratio, UNDEFINED_MARKER};
use crate::scenario::{Comparison, KeyFigure};
use crate::value::FloatValue;

/// Columns of the result table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultColumn {
    Name,
    RawQtyKg,
    SellableKg,
    UnitPrice,
    Revenue,
    RawCost,
    ProcessCost,
    PackCost,
    OtherCost,
    VariableCost,
    Margin,
    MarginPerRawKg,
    MarginPerSellableKg,
    MarginPctOfRevenue,
}

/// A single rendered value before formatting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Value(FloatValue),
    Ratio(Ratio),
    /// Not applicable, e.g. unit price on the totals row.
    Blank,
}

impl ResultColumn {
    pub const ALL: [ResultColumn; 14] = [
        ResultColumn::Name,
        ResultColumn::RawQtyKg,
        ResultColumn::SellableKg,
        ResultColumn::UnitPrice,
        ResultColumn::Revenue,
        ResultColumn::RawCost,
        ResultColumn::ProcessCost,
        ResultColumn::PackCost,
        ResultColumn::OtherCost,
        ResultColumn::VariableCost,
        ResultColumn::Margin,
        ResultColumn::MarginPerRawKg,
        ResultColumn::MarginPerSellableKg,
        ResultColumn::MarginPctOfRevenue,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            ResultColumn::Name => "name",
            ResultColumn::RawQtyKg => "raw_qty_kg",
            ResultColumn::SellableKg => "sellable_kg",
            ResultColumn::UnitPrice => "unit_price",
            ResultColumn::Revenue => "revenue",
            ResultColumn::RawCost => "raw_cost",
            ResultColumn::ProcessCost => "process_cost",
            ResultColumn::PackCost => "pack_cost",
            ResultColumn::OtherCost => "other_cost",
            ResultColumn::VariableCost => "variable_cost",
            ResultColumn::Margin => "margin",
            ResultColumn::MarginPerRawKg => "margin_per_raw_kg",
            ResultColumn::MarginPerSellableKg => "margin_per_sellable_kg",
            ResultColumn::MarginPctOfRevenue => "margin_pct_of_revenue",
        }
    }

    /// Decimal places used for on-screen rendering.
    pub fn decimals(&self) -> usize {
        match self {
            ResultColumn::MarginPctOfRevenue => 1,
            _ => 2,
        }
    }

    pub fn cell<'a>(&self, row: &'a EnrichedRow) -> Cell<'a> {
        match self {
            ResultColumn::Name => Cell::Text(row.name()),
            ResultColumn::RawQtyKg => Cell::Value(row.inputs.raw_qty_kg),
            ResultColumn::SellableKg => Cell::Value(row.sellable_kg),
            ResultColumn::UnitPrice => Cell::Value(row.inputs.unit_price),
            ResultColumn::Revenue => Cell::Value(row.revenue),
            ResultColumn::RawCost => Cell::Value(row.raw_cost),
            ResultColumn::ProcessCost => Cell::Value(row.process_cost),
            ResultColumn::PackCost => Cell::Value(row.pack_cost),
            ResultColumn::OtherCost => Cell::Value(row.other_cost),
            ResultColumn::VariableCost => Cell::Value(row.variable_cost),
            ResultColumn::Margin => Cell::Value(row.margin),
            ResultColumn::MarginPerRawKg => Cell::Ratio(row.margin_per_raw_kg),
            ResultColumn::MarginPerSellableKg => Cell::Ratio(row.margin_per_sellable_kg),
            ResultColumn::MarginPctOfRevenue => Cell::Ratio(row.margin_pct_of_revenue),
        }
    }

    /// Cell of the totals row. Columns that are not summed are blank.
    pub fn totals_cell(&self, totals: &Totals) -> Cell<'static> {
        match self {
            ResultColumn::Name => Cell::Text(TOTALS_LABEL),
            ResultColumn::RawQtyKg => Cell::Value(totals.raw_qty_kg),
            ResultColumn::SellableKg => Cell::Value(totals.sellable_kg),
            ResultColumn::Revenue => Cell::Value(totals.revenue),
            ResultColumn::VariableCost => Cell::Value(totals.variable_cost),
            ResultColumn::Margin => Cell::Value(totals.margin),
            ResultColumn::MarginPerRawKg => Cell::Ratio(totals.margin_per_raw_kg()),
            ResultColumn::MarginPerSellableKg => Cell::Ratio(totals.margin_per_sellable_kg()),
            ResultColumn::MarginPctOfRevenue => Cell::Ratio(totals.margin_pct_of_revenue()),
            ResultColumn::UnitPrice
            | ResultColumn::RawCost
            | ResultColumn::ProcessCost
            | ResultColumn::PackCost
            | ResultColumn::OtherCost => Cell::Blank,
        }
    }
}

/// Format with a fixed number of decimals and `,` as thousands separator.
///
/// Values that round to zero lose their sign, so `-0.001` renders as `0.00`.
pub fn format_number(value: FloatValue, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    let rounds_to_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value.is_sign_negative() && !rounds_to_zero {
        grouped.push('-');
    }
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

fn format_cell(cell: Cell<'_>, decimals: usize) -> String {
    match cell {
        Cell::Text(s) => s.to_string(),
        Cell::Value(v) => format_number(v, decimals),
        Cell::Ratio(Ratio::Defined(v)) => format_number(v, decimals),
        Cell::Ratio(Ratio::Undefined) => UNDEFINED_MARKER.to_string(),
        Cell::Blank => String::new(),
    }
}

/// Lay out rows of pre-formatted cells. The first column is left aligned, the rest right.
fn layout(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: &[String]| {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if i == 0 {
                    format!("{:<w$}", cell, w = w)
                } else {
                    format!("{:>w$}", cell, w = w)
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };

    push_line(header);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    push_line(&rule);
    for row in rows {
        push_line(row);
    }
    out
}

/// Render the per-product table followed by the totals row.
pub fn render_results(calculation: &Calculation) -> String {
    let header: Vec<String> = ResultColumn::ALL
        .iter()
        .map(|c| c.header().to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = calculation
        .rows
        .iter()
        .map(|row| {
            ResultColumn::ALL
                .iter()
                .map(|c| format_cell(c.cell(row), c.decimals()))
                .collect()
        })
        .collect();
    rows.push(
        ResultColumn::ALL
            .iter()
            .map(|c| format_cell(c.totals_cell(&calculation.totals), c.decimals()))
            .collect(),
    );

    layout(&header, &rows)
}

/// The three headline figures shown next to a scenario's table.
pub fn render_headline(totals: &Totals) -> String {
    let pct = match totals.margin_pct_of_revenue() {
        Ratio::Defined(v) => format!("{}%", format_number(v, 1)),
        Ratio::Undefined => UNDEFINED_MARKER.to_string(),
    };
    format!(
        "Margin: {}\nMargin / kg raw: {}\nMargin %: {}\n",
        format_number(totals.margin, 0),
        format_cell(Cell::Ratio(totals.margin_per_raw_kg()), 2),
        pct
    )
}

/// Render the A/B key-figure table.
pub fn render_comparison(comparison: &Comparison) -> String {
    let header: Vec<String> = ["Key figure", "Scenario A", "Scenario B", "B - A"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let rows: Vec<Vec<String>> = comparison
        .lines
        .iter()
        .map(|line| {
            let decimals = match line.figure {
                KeyFigure::MarginPerRawKg | KeyFigure::RawQtyKg | KeyFigure::SellableKg => 2,
                _ => 0,
            };
            vec![
                line.figure.label().to_string(),
                format_cell(Cell::Ratio(line.a), decimals),
                format_cell(Cell::Ratio(line.b), decimals),
                format_cell(Cell::Ratio(line.difference), decimals),
            ]
        })
        .collect();

    layout(&header, &rows)
}
