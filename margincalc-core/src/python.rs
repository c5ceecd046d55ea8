//! Python bindings for the calculator.
//!
//! This module provides Python access to:
//! - [`PyProductRow`] and [`PyProductTable`] for building inputs
//! - [`PyCalculation`], [`PyEnrichedRow`] and [`PyTotals`] for reading results
//! - `compute`, `compare` and the CSV template helpers
//!
//! Undefined ratios are returned as `None`.

use crate::calculator::{compute, Calculation, EnrichedRow, Totals};
use crate::errors::MarginError;
use crate::product::{InputColumn, ProductRow, ProductTable};
use crate::report::{render_comparison, render_results};
use crate::scenario::{compare, KeyFigure};
use crate::table_io::{read_table, template_csv, write_results, write_table};
use crate::value::FloatValue;
use pyo3::exceptions::{PyIOError, PyIndexError, PyValueError};
use pyo3::prelude::*;

impl From<MarginError> for PyErr {
    fn from(err: MarginError) -> PyErr {
        match err {
            MarginError::Io(_) => PyIOError::new_err(err.to_string()),
            MarginError::RowOutOfRange { .. } => PyIndexError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

fn column(name: &str) -> PyResult<InputColumn> {
    InputColumn::from_header(name)
        .ok_or_else(|| PyValueError::new_err(format!("Unknown input column '{}'", name)))
}

fn utf8(bytes: Vec<u8>) -> PyResult<String> {
    String::from_utf8(bytes).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Python wrapper for ProductRow.
///
/// Example:
///     row = ProductRow("Hot-smoked portion", unit_price=240.0, yield_pct=72.0,
///                      waste_pct=3.0, raw_qty_kg=100.0)
#[pyclass(name = "ProductRow", module = "margincalc.core")]
#[derive(Debug, Clone)]
pub struct PyProductRow(pub ProductRow);

#[pymethods]
impl PyProductRow {
    #[new]
    #[pyo3(signature = (name, unit_price=0.0, yield_pct=0.0, waste_pct=0.0, process_cost_per_kg=0.0, pack_cost_per_kg=0.0, other_cost_per_kg=0.0, raw_qty_kg=0.0))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        name: String,
        unit_price: FloatValue,
        yield_pct: FloatValue,
        waste_pct: FloatValue,
        process_cost_per_kg: FloatValue,
        pack_cost_per_kg: FloatValue,
        other_cost_per_kg: FloatValue,
        raw_qty_kg: FloatValue,
    ) -> Self {
        Self(
            ProductRow {
                name,
                unit_price,
                yield_pct,
                waste_pct,
                process_cost_per_kg,
                pack_cost_per_kg,
                other_cost_per_kg,
                raw_qty_kg,
            }
            .sanitised(),
        )
    }

    #[getter]
    fn name(&self) -> &str {
        &self.0.name
    }

    #[setter]
    fn set_name(&mut self, name: String) {
        self.0.name = name;
    }

    #[getter]
    fn unit_price(&self) -> FloatValue {
        self.0.unit_price
    }

    #[getter]
    fn yield_pct(&self) -> FloatValue {
        self.0.yield_pct
    }

    #[getter]
    fn waste_pct(&self) -> FloatValue {
        self.0.waste_pct
    }

    #[getter]
    fn process_cost_per_kg(&self) -> FloatValue {
        self.0.process_cost_per_kg
    }

    #[getter]
    fn pack_cost_per_kg(&self) -> FloatValue {
        self.0.pack_cost_per_kg
    }

    #[getter]
    fn other_cost_per_kg(&self) -> FloatValue {
        self.0.other_cost_per_kg
    }

    #[getter]
    fn raw_qty_kg(&self) -> FloatValue {
        self.0.raw_qty_kg
    }

    /// Read an input by column name (canonical or legacy header).
    fn get(&self, column_name: &str) -> PyResult<FloatValue> {
        Ok(self.0.get(column(column_name)?))
    }

    /// Set an input by column name. Non-finite values are stored as 0.
    fn set(&mut self, column_name: &str, value: FloatValue) -> PyResult<()> {
        self.0.set(column(column_name)?, value);
        Ok(())
    }

    fn __repr__(&self) -> String {
        format!(
            "ProductRow(name='{}', unit_price={}, yield_pct={}, waste_pct={}, raw_qty_kg={})",
            self.0.name, self.0.unit_price, self.0.yield_pct, self.0.waste_pct, self.0.raw_qty_kg
        )
    }

    fn __eq__(&self, other: &PyProductRow) -> bool {
        self.0 == other.0
    }
}

/// Python wrapper for ProductTable.
#[pyclass(name = "ProductTable", module = "margincalc.core")]
#[derive(Debug, Clone)]
pub struct PyProductTable(pub ProductTable);

#[pymethods]
impl PyProductTable {
    #[new]
    #[pyo3(signature = (rows=Vec::new()))]
    fn new(rows: Vec<PyProductRow>) -> Self {
        Self(rows.into_iter().map(|r| r.0).collect())
    }

    /// The three illustrative template products.
    #[staticmethod]
    fn default_products() -> Self {
        Self(ProductTable::default_products())
    }

    /// Parse a table from CSV text.
    #[staticmethod]
    fn from_csv(text: &str) -> PyResult<Self> {
        Ok(Self(read_table(text.as_bytes())?))
    }

    fn to_csv(&self) -> PyResult<String> {
        let mut buffer = Vec::new();
        write_table(&self.0, &mut buffer)?;
        utf8(buffer)
    }

    #[getter]
    fn rows(&self) -> Vec<PyProductRow> {
        self.0.iter().cloned().map(PyProductRow).collect()
    }

    fn append(&mut self, row: PyProductRow) {
        self.0.push(row.0);
    }

    fn insert(&mut self, index: usize, row: PyProductRow) -> PyResult<()> {
        Ok(self.0.insert(index, row.0)?)
    }

    fn remove(&mut self, index: usize) -> PyResult<PyProductRow> {
        Ok(PyProductRow(self.0.remove(index)?))
    }

    fn resize(&mut self, count: usize) {
        self.0.resize(count);
    }

    fn __len__(&self) -> usize {
        self.0.len()
    }

    fn __getitem__(&self, index: usize) -> PyResult<PyProductRow> {
        self.0
            .get(index)
            .cloned()
            .map(PyProductRow)
            .ok_or_else(|| PyIndexError::new_err(format!("row {} out of range", index)))
    }

    fn __repr__(&self) -> String {
        format!("ProductTable(rows={})", self.0.len())
    }
}

/// Python wrapper for EnrichedRow.
#[pyclass(name = "EnrichedRow", module = "margincalc.core")]
#[derive(Debug, Clone)]
pub struct PyEnrichedRow(pub EnrichedRow);

#[pymethods]
impl PyEnrichedRow {
    #[getter]
    fn name(&self) -> &str {
        self.0.name()
    }

    #[getter]
    fn inputs(&self) -> PyProductRow {
        PyProductRow(self.0.inputs.clone())
    }

    #[getter]
    fn sellable_kg(&self) -> FloatValue {
        self.0.sellable_kg
    }

    #[getter]
    fn revenue(&self) -> FloatValue {
        self.0.revenue
    }

    #[getter]
    fn raw_cost(&self) -> FloatValue {
        self.0.raw_cost
    }

    #[getter]
    fn process_cost(&self) -> FloatValue {
        self.0.process_cost
    }

    #[getter]
    fn pack_cost(&self) -> FloatValue {
        self.0.pack_cost
    }

    #[getter]
    fn other_cost(&self) -> FloatValue {
        self.0.other_cost
    }

    #[getter]
    fn variable_cost(&self) -> FloatValue {
        self.0.variable_cost
    }

    #[getter]
    fn margin(&self) -> FloatValue {
        self.0.margin
    }

    #[getter]
    fn margin_per_raw_kg(&self) -> Option<FloatValue> {
        self.0.margin_per_raw_kg.value()
    }

    #[getter]
    fn margin_per_sellable_kg(&self) -> Option<FloatValue> {
        self.0.margin_per_sellable_kg.value()
    }

    #[getter]
    fn margin_pct_of_revenue(&self) -> Option<FloatValue> {
        self.0.margin_pct_of_revenue.value()
    }

    fn __repr__(&self) -> String {
        format!(
            "EnrichedRow(name='{}', margin={}, margin_per_raw_kg={})",
            self.0.name(),
            self.0.margin,
            self.0.margin_per_raw_kg
        )
    }
}

/// Python wrapper for Totals.
#[pyclass(name = "Totals", module = "margincalc.core")]
#[derive(Debug, Clone)]
pub struct PyTotals(pub Totals);

#[pymethods]
impl PyTotals {
    #[getter]
    fn raw_qty_kg(&self) -> FloatValue {
        self.0.raw_qty_kg
    }

    #[getter]
    fn sellable_kg(&self) -> FloatValue {
        self.0.sellable_kg
    }

    #[getter]
    fn revenue(&self) -> FloatValue {
        self.0.revenue
    }

    #[getter]
    fn variable_cost(&self) -> FloatValue {
        self.0.variable_cost
    }

    #[getter]
    fn margin(&self) -> FloatValue {
        self.0.margin
    }

    #[getter]
    fn margin_per_raw_kg(&self) -> Option<FloatValue> {
        self.0.margin_per_raw_kg().value()
    }

    #[getter]
    fn margin_pct_of_revenue(&self) -> Option<FloatValue> {
        self.0.margin_pct_of_revenue().value()
    }

    fn __repr__(&self) -> String {
        format!(
            "Totals(raw_qty_kg={}, revenue={}, margin={})",
            self.0.raw_qty_kg, self.0.revenue, self.0.margin
        )
    }
}

/// Python wrapper for Calculation.
#[pyclass(name = "Calculation", module = "margincalc.core")]
#[derive(Debug, Clone)]
pub struct PyCalculation(pub Calculation);

#[pymethods]
impl PyCalculation {
    #[getter]
    fn raw_price(&self) -> FloatValue {
        self.0.raw_price
    }

    #[getter]
    fn rows(&self) -> Vec<PyEnrichedRow> {
        self.0.rows.iter().cloned().map(PyEnrichedRow).collect()
    }

    #[getter]
    fn totals(&self) -> PyTotals {
        PyTotals(self.0.totals)
    }

    /// Aligned text table including the totals row.
    fn render(&self) -> String {
        render_results(&self.0)
    }

    fn to_csv(&self) -> PyResult<String> {
        let mut buffer = Vec::new();
        write_results(&self.0, &mut buffer)?;
        utf8(buffer)
    }
}

/// Run the calculator over a table at the given raw material price.
#[pyfunction]
#[pyo3(name = "compute")]
fn py_compute(table: PyRef<'_, PyProductTable>, raw_price: FloatValue) -> PyCalculation {
    PyCalculation(compute(&table.0, raw_price))
}

/// Compare two calculations.
///
/// Returns a list of `(label, a, b, b_minus_a)` tuples; undefined values are `None`.
#[pyfunction]
#[pyo3(name = "compare")]
#[allow(clippy::type_complexity)]
fn py_compare(
    a: PyRef<'_, PyCalculation>,
    b: PyRef<'_, PyCalculation>,
) -> Vec<(&'static str, Option<FloatValue>, Option<FloatValue>, Option<FloatValue>)> {
    compare(&a.0, &b.0)
        .lines
        .iter()
        .map(|l| (l.figure.label(), l.a.value(), l.b.value(), l.difference.value()))
        .collect()
}

/// Render the comparison of two calculations as an aligned text table.
#[pyfunction]
fn render_comparison_table(a: PyRef<'_, PyCalculation>, b: PyRef<'_, PyCalculation>) -> String {
    render_comparison(&compare(&a.0, &b.0))
}

/// Labels of the comparison key figures, in order.
#[pyfunction]
fn key_figures() -> Vec<&'static str> {
    KeyFigure::ALL.iter().map(|f| f.label()).collect()
}

/// The import template as CSV text.
#[pyfunction]
#[pyo3(name = "template_csv")]
fn py_template_csv() -> PyResult<String> {
    utf8(template_csv()?)
}

#[pymodule]
pub fn core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyProductRow>()?;
    m.add_class::<PyProductTable>()?;
    m.add_class::<PyEnrichedRow>()?;
    m.add_class::<PyTotals>()?;
    m.add_class::<PyCalculation>()?;
    m.add_function(wrap_pyfunction!(py_compute, m)?)?;
    m.add_function(wrap_pyfunction!(py_compare, m)?)?;
    m.add_function(wrap_pyfunction!(render_comparison_table, m)?)?;
    m.add_function(wrap_pyfunction!(key_figures, m)?)?;
    m.add_function(wrap_pyfunction!(py_template_csv, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        name: &str,
        unit_price: FloatValue,
        yield_pct: FloatValue,
        raw_qty_kg: FloatValue,
    ) -> PyProductRow {
        PyProductRow::new(
            name.to_string(),
            unit_price,
            yield_pct,
            0.0,
            0.0,
            0.0,
            0.0,
            raw_qty_kg,
        )
    }

    #[test]
    fn test_row_constructor_coerces_non_finite() {
        let r = row("X", f64::NAN, 72.0, f64::INFINITY);
        assert_eq!(r.unit_price(), 0.0);
        assert_eq!(r.raw_qty_kg(), 0.0);
        assert_eq!(r.get("Utbyte (%)").unwrap(), 72.0);
    }

    #[test]
    fn test_compute_returns_none_for_undefined_ratios() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let table = Bound::new(
                py,
                PyProductTable::new(vec![
                    row("sold", 240.0, 100.0, 10.0),
                    row("empty", 0.0, 0.0, 0.0),
                ]),
            )
            .unwrap();
            let calc = py_compute(table.borrow(), 70.0);

            let rows = calc.rows();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].margin(), 10.0 * 240.0 - 10.0 * 70.0);
            assert_eq!(rows[0].margin_per_raw_kg(), Some(170.0));
            assert_eq!(rows[1].margin_per_raw_kg(), None);
            assert_eq!(rows[1].margin_pct_of_revenue(), None);
            assert_eq!(calc.totals().raw_qty_kg(), 10.0);
        });
    }

    #[test]
    fn test_compare_between_calculations() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let a = PyCalculation(compute(&ProductTable::default_products(), 70.0));
            let b = PyCalculation(compute(&ProductTable::new(), 70.0));
            let a = Bound::new(py, a).unwrap();
            let b = Bound::new(py, b).unwrap();

            let lines = py_compare(a.borrow(), b.borrow());
            assert_eq!(lines.len(), KeyFigure::ALL.len());

            let (label, va, vb, diff) = lines[0];
            assert_eq!(label, KeyFigure::RawQtyKg.label());
            assert_eq!(va, Some(300.0));
            assert_eq!(vb, Some(0.0));
            assert_eq!(diff, Some(-300.0));

            let (_, _, vb, diff) = lines[KeyFigure::ALL.len() - 1];
            assert_eq!(vb, None);
            assert_eq!(diff, None);
        });
    }

    #[test]
    fn test_csv_round_trip_and_index_errors() {
        let table = PyProductTable::from_csv(&py_template_csv().unwrap()).unwrap();
        assert_eq!(table.__len__(), 3);
        assert_eq!(table.to_csv().unwrap(), py_template_csv().unwrap());

        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let mut table = table.clone();
            let err = table.remove(7).unwrap_err();
            assert!(err.is_instance_of::<PyIndexError>(py));

            let err = column("colour").unwrap_err();
            assert!(err.is_instance_of::<PyValueError>(py));
        });
    }
}
