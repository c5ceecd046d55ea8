//! Session files.
//!
//! A session is stored as TOML: the shared raw material price, an optional product
//! count and the product rows of each scenario.
//!
//! ```toml
//! raw_price = 70.0
//! product_count = 3
//!
//! [[scenario_a]]
//! name = "Hot-smoked portion"
//! unit_price = 240.0
//! yield_pct = 72.0
//! waste_pct = 3.0
//! process_cost_per_kg = 18.0
//! pack_cost_per_kg = 10.0
//! other_cost_per_kg = 0.0
//! raw_qty_kg = 100.0
//!
//! [[scenario_b]]
//! name = "Sliced"
//! raw_qty_kg = 100.0
//! ```
//!
//! Missing keys fall back to defaults: the price to [`DEFAULT_RAW_PRICE`] and each
//! scenario to the default products. Within a product, missing or non-numeric inputs
//! read as zero.

use crate::errors::{MarginError, MarginResult};
use crate::product::ProductTable;
use crate::scenario::{validate_raw_price, ScenarioId, ScenarioSet, DEFAULT_RAW_PRICE};
use crate::value::FloatValue;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

/// Allowed values of `product_count`.
pub const PRODUCT_COUNT_RANGE: RangeInclusive<usize> = 1..=12;

/// On-disk representation of a [`ScenarioSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Raw material price per kg, shared by both scenarios.
    pub raw_price: FloatValue,
    /// If set, both tables are padded or truncated to this many rows on load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_count: Option<usize>,
    pub scenario_a: ProductTable,
    pub scenario_b: ProductTable,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            raw_price: DEFAULT_RAW_PRICE,
            product_count: None,
            scenario_a: ProductTable::default_products(),
            scenario_b: ProductTable::default_products(),
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(s: &str) -> MarginResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> MarginResult<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> MarginResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading session from {}", path.display());
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> MarginResult<()> {
        let path = path.as_ref();
        log::debug!("Writing session to {}", path.display());
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Validate and turn into a live [`ScenarioSet`].
    pub fn into_scenarios(self) -> MarginResult<ScenarioSet> {
        let mut set = ScenarioSet::new(self.raw_price, self.scenario_a, self.scenario_b)?;

        if let Some(count) = self.product_count {
            if !PRODUCT_COUNT_RANGE.contains(&count) {
                return Err(MarginError::InvalidParameter(format!(
                    "product_count must be between {} and {}, got {}",
                    PRODUCT_COUNT_RANGE.start(),
                    PRODUCT_COUNT_RANGE.end(),
                    count
                )));
            }
            set.resize_all(count);
        }

        Ok(set)
    }
}

impl From<&ScenarioSet> for SessionConfig {
    fn from(set: &ScenarioSet) -> Self {
        Self {
            raw_price: set.raw_price(),
            product_count: None,
            scenario_a: set.scenario(ScenarioId::A).table.clone(),
            scenario_b: set.scenario(ScenarioId::B).table.clone(),
        }
    }
}

impl TryFrom<SessionConfig> for ScenarioSet {
    type Error = MarginError;

    fn try_from(config: SessionConfig) -> MarginResult<Self> {
        config.into_scenarios()
    }
}

/// Parse just a raw price, e.g. from a command-line flag.
pub fn parse_raw_price(s: &str) -> MarginResult<FloatValue> {
    let value: FloatValue = s
        .trim()
        .parse()
        .map_err(|_| MarginError::InvalidParameter(format!("not a number: {:?}", s)))?;
    validate_raw_price(value)
}
