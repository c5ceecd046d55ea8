//! Contribution-margin calculator for food-processing products.
//!
//! Given raw material quantities, yield and waste percentages, per-kg costs and selling
//! prices, computes revenue, variable cost and margin per product plus a totals row,
//! and compares two scenarios that share one raw material price.
//!
//! # Module Organisation
//!
//! - `product`: product inputs and the editable product table
//! - `calculator`: the calculation pipeline
//! - `scenario`: scenarios A and B and their comparison
//! - `table_io`: CSV template, import and result export
//! - `report`: text rendering of results
//! - `config`: TOML session files
//!
//! # Example
//!
//! ```rust
//! use margincalc_core::calculator::compute;
//! use margincalc_core::product::ProductTable;
//!
//! let calculation = compute(&ProductTable::default_products(), 70.0);
//! assert_eq!(calculation.rows.len(), 3);
//! assert_eq!(calculation.totals.raw_qty_kg, 300.0);
//! ```

pub mod calculator;
pub mod config;
pub mod product;
#[cfg(feature = "python")]
pub mod python;
pub mod ratio;
pub mod report;
pub mod scenario;
pub mod table_io;
pub mod value;

pub mod errors;
