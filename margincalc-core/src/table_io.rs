//! CSV import and export of product tables.
//!
//! The template is the default product table written with a header that names exactly
//! the input columns. Import is deliberately forgiving: unknown columns are skipped,
//! missing columns read as zero and cells that are not numbers become zero. Only a
//! structurally broken file (I/O failure, invalid UTF-8) produces an error.

use crate::calculator::Calculation;
use crate::errors::MarginResult;
use crate::product::{is_name_header, InputColumn, ProductRow, ProductTable, NAME_COLUMN};
use crate::ratio::Ratio;
use crate::report::{Cell, ResultColumn};
use crate::value::parse_cell;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// File name suggested when offering the template for download.
pub const TEMPLATE_FILE_NAME: &str = "margin_template.csv";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    Name,
    Input(InputColumn),
}

/// Header row of the import template.
pub fn template_header() -> Vec<&'static str> {
    std::iter::once(NAME_COLUMN)
        .chain(InputColumn::ALL.iter().map(|c| c.name()))
        .collect()
}

/// Write a product table as CSV with the template header.
pub fn write_table<W: Write>(table: &ProductTable, writer: W) -> MarginResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(template_header())?;

    for row in table {
        let mut record = Vec::with_capacity(1 + InputColumn::ALL.len());
        record.push(row.name.clone());
        record.extend(InputColumn::ALL.iter().map(|c| row.get(*c).to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// The default products as UTF-8 CSV, ready to hand out as an editable template.
pub fn template_csv() -> MarginResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_table(&ProductTable::default_products(), &mut buffer)?;
    Ok(buffer)
}

/// Read a product table from CSV.
///
/// The header may use the canonical names or the legacy Swedish ones. Lines whose
/// cells are all blank are skipped.
pub fn read_table<R: Read>(reader: R) -> MarginResult<ProductTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut targets: Vec<Option<Target>> = Vec::with_capacity(headers.len());
    for header in headers.iter() {
        let header = header.trim_start_matches('\u{feff}');
        let target = if is_name_header(header) {
            Some(Target::Name)
        } else {
            InputColumn::from_header(header).map(Target::Input)
        };

        match target {
            Some(t) if targets.contains(&Some(t)) => {
                log::warn!("Duplicate column {:?} ignored", header);
                targets.push(None);
            }
            Some(t) => targets.push(Some(t)),
            None => {
                log::warn!("Unknown column {:?} ignored", header);
                targets.push(None);
            }
        }
    }

    for column in InputColumn::ALL {
        if !targets.contains(&Some(Target::Input(column))) {
            log::debug!("Column {} missing, reading as 0", column);
        }
    }

    let mut table = ProductTable::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut row = ProductRow::default();
        for (cell, target) in record.iter().zip(&targets) {
            match target {
                Some(Target::Name) => row.name = cell.trim().to_string(),
                Some(Target::Input(column)) => match parse_cell(cell) {
                    Some(value) => row.set(*column, value),
                    None => {
                        if !cell.trim().is_empty() {
                            log::warn!(
                                "Row {}: {} value {:?} is not a number, using 0",
                                line + 1,
                                column,
                                cell
                            );
                        }
                    }
                },
                None => {}
            }
        }
        table.push(row);
    }

    log::debug!("Imported {} product rows", table.len());
    Ok(table)
}

pub fn read_table_path<P: AsRef<Path>>(path: P) -> MarginResult<ProductTable> {
    read_table(File::open(path)?)
}

pub fn write_table_path<P: AsRef<Path>>(table: &ProductTable, path: P) -> MarginResult<()> {
    write_table(table, File::create(path)?)
}

fn result_field(cell: Cell<'_>) -> String {
    match cell {
        Cell::Text(s) => s.to_string(),
        Cell::Value(v) | Cell::Ratio(Ratio::Defined(v)) => v.to_string(),
        Cell::Ratio(Ratio::Undefined) | Cell::Blank => String::new(),
    }
}

/// Write enriched rows and the totals row as CSV.
///
/// Values are written at full precision. Undefined ratios become empty fields.
pub fn write_results<W: Write>(calculation: &Calculation, writer: W) -> MarginResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(ResultColumn::ALL.iter().map(|c| c.header()))?;

    for row in &calculation.rows {
        writer.write_record(ResultColumn::ALL.iter().map(|c| result_field(c.cell(row))))?;
    }
    writer.write_record(
        ResultColumn::ALL
            .iter()
            .map(|c| result_field(c.totals_cell(&calculation.totals))),
    )?;

    writer.flush()?;
    Ok(())
}
