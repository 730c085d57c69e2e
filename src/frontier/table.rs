//! The frontier table and its tabular/JSON output.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::surface::{DesignPoint, ProcessModels, ProcessVariant};
use crate::sweep::ResolvedAnchors;

const FACTOR_COLUMNS: [&str; 3] = ["factor_CA", "factor_EC", "factor_EU"];
const METRIC_COLUMNS: [&str; 2] = ["return_metric", "emissions_metric"];
const FEASIBILITY_COLUMN: &str = "feasibility_margin";
const WEIGHT_COLUMNS: [&str; 2] = ["weight_return", "weight_emissions"];

/// One solved sweep iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontierRecord {
    /// Design point returned by the solver.
    pub point: DesignPoint,
    /// Weight on the normalized return metric.
    pub weight_return: f64,
    /// Complement weight on the normalized emissions metric.
    pub weight_emissions: f64,
    /// Raw return metric at `point`.
    pub return_value: f64,
    /// Raw emissions metric at `point`.
    pub emissions_value: f64,
    /// Raw constraint polynomial at `point`, for constrained variants.
    pub feasibility_margin: Option<f64>,
}

impl FrontierRecord {
    /// Evaluate the raw (unnormalized) metrics at a solved point.
    #[must_use]
    pub fn evaluate(point: DesignPoint, weight: f64, models: &ProcessModels) -> Self {
        Self {
            point,
            weight_return: weight,
            weight_emissions: 1.0 - weight,
            return_value: models.return_model.evaluate(&point),
            emissions_value: models.emissions_model.evaluate(&point),
            feasibility_margin: models.constraint.map(|c| c.margin(&point)),
        }
    }
}

/// Ordered, append-only collection of frontier records in grid order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontierTable {
    records: Vec<FrontierRecord>,
    /// Whether rows carry a feasibility margin.
    constrained: bool,
}

impl FrontierTable {
    #[must_use]
    pub fn new(constrained: bool) -> Self {
        Self::with_capacity(0, constrained)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize, constrained: bool) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            constrained,
        }
    }

    #[must_use]
    pub fn from_records(records: Vec<FrontierRecord>, constrained: bool) -> Self {
        Self {
            records,
            constrained,
        }
    }

    /// Append a record after the existing ones.
    pub fn push(&mut self, record: FrontierRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[FrontierRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrontierRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn is_constrained(&self) -> bool {
        self.constrained
    }

    /// Column names of the tabular form, in output order.
    #[must_use]
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = FACTOR_COLUMNS.to_vec();
        columns.extend(METRIC_COLUMNS);
        if self.constrained {
            columns.push(FEASIBILITY_COLUMN);
        }
        columns.extend(WEIGHT_COLUMNS);
        columns
    }

    /// Write the table as delimited text to a file.
    pub fn write_csv(&self, path: impl AsRef<Path>, delimiter: u8) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv_to(io::BufWriter::new(file), delimiter)
    }

    /// Write the table as delimited text.
    pub fn write_csv_to<W: io::Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);

        wtr.write_record(self.columns())?;

        for record in &self.records {
            let mut row = vec![
                record.point.ca.to_string(),
                record.point.ec.to_string(),
                record.point.eu.to_string(),
                record.return_value.to_string(),
                record.emissions_value.to_string(),
            ];
            if self.constrained {
                row.push(record.feasibility_margin.map_or(String::new(), |m| m.to_string()));
            }
            row.push(record.weight_return.to_string());
            row.push(record.weight_emissions.to_string());
            wtr.write_record(&row)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Read a table previously written by [`Self::write_csv`].
    pub fn read_csv(path: impl AsRef<Path>, delimiter: u8) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::read_csv_from(io::BufReader::new(file), delimiter)
    }

    /// Read a table from delimited text.
    ///
    /// Column lookup is by name (case-insensitive); a `feasibility_margin`
    /// column marks the table as constrained.
    pub fn read_csv_from<R: io::Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let require = |name: &str| {
            find_header_index(&headers, name).ok_or_else(|| Error::TableImport {
                line: 1,
                reason: format!("missing column '{name}'"),
            })
        };

        let ca = require(FACTOR_COLUMNS[0])?;
        let ec = require(FACTOR_COLUMNS[1])?;
        let eu = require(FACTOR_COLUMNS[2])?;
        let ret = require(METRIC_COLUMNS[0])?;
        let emi = require(METRIC_COLUMNS[1])?;
        let w_ret = require(WEIGHT_COLUMNS[0])?;
        let w_emi = require(WEIGHT_COLUMNS[1])?;
        let margin = find_header_index(&headers, FEASIBILITY_COLUMN);

        let mut table = Self::new(margin.is_some());

        for (line_num, record) in reader.records().enumerate() {
            // +2 for 1-based and header
            let line = line_num + 2;
            let record = record.map_err(|e| Error::TableImport {
                line,
                reason: e.to_string(),
            })?;

            let field = |idx: usize| -> Result<f64> {
                let raw = record.get(idx).unwrap_or("").trim();
                raw.parse().map_err(|_| Error::TableImport {
                    line,
                    reason: format!("'{raw}' in column '{}' is not a number", headers[idx]),
                })
            };

            table.push(FrontierRecord {
                point: DesignPoint::new(field(ca)?, field(ec)?, field(eu)?),
                weight_return: field(w_ret)?,
                weight_emissions: field(w_emi)?,
                return_value: field(ret)?,
                emissions_value: field(emi)?,
                feasibility_margin: margin.map(field).transpose()?,
            });
        }

        Ok(table)
    }
}

impl<'a> IntoIterator for &'a FrontierTable {
    type Item = &'a FrontierRecord;
    type IntoIter = std::slice::Iter<'a, FrontierRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Find a header index by name (case-insensitive).
fn find_header_index(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// A finished sweep with the context needed to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierReport {
    /// Process variant the models belong to.
    pub variant: ProcessVariant,
    /// Anchors used for normalization.
    pub anchors: ResolvedAnchors,
    /// When the sweep finished.
    pub generated_at: DateTime<Utc>,
    /// The frontier itself.
    pub table: FrontierTable,
}

impl FrontierReport {
    #[must_use]
    pub fn new(variant: ProcessVariant, anchors: ResolvedAnchors, table: FrontierTable) -> Self {
        Self {
            variant,
            anchors,
            generated_at: Utc::now(),
            table,
        }
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
