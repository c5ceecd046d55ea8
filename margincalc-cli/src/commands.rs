use anyhow::{Context, Result};
use margincalc_core::calculator::compute as run_calculator;
use margincalc_core::config::SessionConfig;
use margincalc_core::product::ProductTable;
use margincalc_core::report::{render_comparison, render_headline, render_results};
use margincalc_core::scenario::{compare as compare_totals, ScenarioId, ScenarioSet};
use margincalc_core::table_io::{read_table_path, template_csv, write_results, write_table_path};
use std::io::Write;
use std::path::Path;

fn load_table(path: &Path) -> Result<ProductTable> {
    let table = read_table_path(path)
        .with_context(|| format!("Failed to read product table {}", path.display()))?;
    log::info!("Loaded {} products from {}", table.len(), path.display());
    Ok(table)
}

pub fn template<W: Write>(output: Option<&Path>, out: &mut W) -> Result<()> {
    match output {
        Some(path) => {
            write_table_path(&ProductTable::default_products(), path)
                .with_context(|| format!("Failed to write template to {}", path.display()))?;
            log::info!("Template written to {}", path.display());
        }
        None => out.write_all(&template_csv()?)?,
    }
    Ok(())
}

pub fn compute<W: Write>(input: &Path, raw_price: f64, csv: bool, out: &mut W) -> Result<()> {
    let calculation = run_calculator(&load_table(input)?, raw_price);

    if csv {
        write_results(&calculation, out)?;
    } else {
        write!(out, "{}", render_results(&calculation))?;
        writeln!(out)?;
        write!(out, "{}", render_headline(&calculation.totals))?;
    }
    Ok(())
}

pub fn compare<W: Write>(a: &Path, b: &Path, raw_price: f64, out: &mut W) -> Result<()> {
    let calc_a = run_calculator(&load_table(a)?, raw_price);
    let calc_b = run_calculator(&load_table(b)?, raw_price);
    write!(out, "{}", render_comparison(&compare_totals(&calc_a, &calc_b)))?;
    Ok(())
}

fn write_scenario<W: Write>(set: &ScenarioSet, id: ScenarioId, out: &mut W) -> Result<()> {
    let calculation = set.compute(id);
    writeln!(out, "{}", set.scenario(id).label)?;
    write!(out, "{}", render_results(&calculation))?;
    writeln!(out)?;
    write!(out, "{}", render_headline(&calculation.totals))?;
    writeln!(out)?;
    Ok(())
}

pub fn session<W: Write>(config: &Path, out: &mut W) -> Result<()> {
    let set: ScenarioSet = SessionConfig::load(config)
        .with_context(|| format!("Failed to load session {}", config.display()))?
        .try_into()?;

    writeln!(out, "Raw material price: {}", set.raw_price())?;
    writeln!(out)?;
    write_scenario(&set, ScenarioId::A, out)?;
    write_scenario(&set, ScenarioId::B, out)?;
    writeln!(out, "Comparison A vs B")?;
    write!(out, "{}", render_comparison(&set.compare()))?;
    Ok(())
}

pub fn init_session(output: &Path) -> Result<()> {
    SessionConfig::default()
        .save(output)
        .with_context(|| format!("Failed to write session to {}", output.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_template_to_stdout() {
        let mut out = Vec::new();
        template(None, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("name,unit_price,"));
    }

    #[test]
    fn test_compute_from_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        let mut out = Vec::new();
        template(Some(path.as_path()), &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(
            fs::read(&path).unwrap(),
            margincalc_core::table_io::template_csv().unwrap()
        );

        let mut out = Vec::new();
        compute(&path, 70.0, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Hot-smoked portion"));
        assert!(text.contains("TOTAL"));
        assert!(text.contains("Margin / kg raw:"));

        let mut out = Vec::new();
        compute(&path, 70.0, true, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = compute(Path::new("/nonexistent/products.csv"), 70.0, false, &mut Vec::new())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/products.csv"));
    }

    #[test]
    fn test_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        init_session(&path).unwrap();

        let mut out = Vec::new();
        session(&path, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Raw material price: 70"));
        assert!(text.contains("Scenario A"));
        assert!(text.contains("Scenario B"));
        assert!(text.contains("Comparison A vs B"));
    }

    #[test]
    fn test_compare_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "name,raw_qty_kg\nX,100\n").unwrap();
        fs::write(&b, "name,raw_qty_kg\nX,150\n").unwrap();

        let mut out = Vec::new();
        compare(&a, &b, 70.0, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let raw_line = text
            .lines()
            .find(|l| l.starts_with("Raw material (kg)"))
            .unwrap();
        assert!(raw_line.ends_with("50.00"), "{}", raw_line);
    }
}
