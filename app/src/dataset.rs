//! CSV table loading with numeric coercion.
//!
//! Reads a comma-separated table with a header row, coerces every field to
//! `f64`, maps the missing-value sentinel to NaN, and splits the trailing
//! label column off each row.

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use ndarray::Array1;
use vecino::Instance;

/// An in-memory numeric table: attribute names plus labeled instances.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Header names of the attribute columns; the label column is excluded.
    pub attribute_names: Vec<String>,
    /// Name of the trailing label column.
    pub label_name: String,
    pub instances: Vec<Instance<f64>>,
}

impl Dataset {
    /// Removes rows containing a missing attribute or label; returns how
    /// many were dropped.
    pub fn drop_incomplete(&mut self) -> usize {
        let before = self.instances.len();
        self.instances.retain(|instance| {
            !instance.label.is_nan() && instance.features.iter().all(|x| !x.is_nan())
        });
        before - self.instances.len()
    }
}

/// Loads a CSV file into a [`Dataset`].
pub fn load_csv(path: &Path, missing: &str) -> Result<Dataset> {
    let file =
        File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    parse_table(file, missing)
}

fn parse_table<R: std::io::Read>(reader: R, missing: &str) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader.headers().context("missing header row")?.clone();
    if headers.len() < 2 {
        bail!("the table needs at least one attribute column and a label column");
    }
    let label_name = headers[headers.len() - 1].to_string();
    let attribute_names: Vec<String> = headers
        .iter()
        .take(headers.len() - 1)
        .map(str::to_string)
        .collect();

    let mut instances = Vec::new();
    for (row, record) in reader.records().enumerate() {
        // Header is line 1, so data row i sits on line i + 2.
        let line = row + 2;
        let record = record.with_context(|| format!("malformed record on line {line}"))?;
        let mut values = Vec::with_capacity(record.len());
        for (col, field) in record.iter().enumerate() {
            let name = headers.get(col).unwrap_or("");
            values.push(
                parse_field(field, missing)
                    .with_context(|| format!("line {line}, column {name:?}"))?,
            );
        }
        let label = values.pop().context("empty record")?;
        instances.push(Instance::new(Array1::from_vec(values), label));
    }

    Ok(Dataset {
        attribute_names,
        label_name,
        instances,
    })
}

fn parse_field(field: &str, missing: &str) -> Result<f64> {
    let field = field.trim();
    if field == missing {
        return Ok(f64::NAN);
    }
    field
        .parse::<f64>()
        .map_err(|_| anyhow!("{field:?} is not numeric"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
age,limit,default
25,1000,0
40,NA,1
31,2500,0
";

    #[test]
    fn test_parses_header_and_rows() {
        let dataset = parse_table(SAMPLE.as_bytes(), "NA").unwrap();

        assert_eq!(dataset.attribute_names, vec!["age", "limit"]);
        assert_eq!(dataset.label_name, "default");
        assert_eq!(dataset.instances.len(), 3);
        assert_eq!(dataset.instances[0].features[0], 25.0);
        assert_eq!(dataset.instances[0].label, 0.0);
        assert_eq!(dataset.instances[2].features[1], 2500.0);
    }

    #[test]
    fn test_missing_sentinel_becomes_nan() {
        let dataset = parse_table(SAMPLE.as_bytes(), "NA").unwrap();
        assert!(dataset.instances[1].features[1].is_nan());
        assert_eq!(dataset.instances[1].label, 1.0);
    }

    #[test]
    fn test_drop_incomplete_removes_flagged_rows() {
        let mut dataset = parse_table(SAMPLE.as_bytes(), "NA").unwrap();
        assert_eq!(dataset.drop_incomplete(), 1);
        assert_eq!(dataset.instances.len(), 2);
        assert_eq!(dataset.instances[1].features[0], 31.0);
    }

    #[test]
    fn test_non_numeric_field_is_an_error() {
        let bad = "a,b\n1,oops\n";
        let err = parse_table(bad.as_bytes(), "NA").unwrap_err();
        assert!(format!("{err:#}").contains("not numeric"));
    }

    #[test]
    fn test_single_column_table_is_rejected() {
        let bad = "label\n1\n";
        assert!(parse_table(bad.as_bytes(), "NA").is_err());
    }
}
