//! Structured-file summarization.
//!
//! Tabular uploads are not dumped cell by cell. The file is loaded into a
//! row/column [`Table`], described column by column, and the statistics are
//! rendered as a fixed-width text table:
//!
//! - when any column is numeric: `count`, `mean`, `std`, `min`, `25%`, `50%`,
//!   `75%`, `max` for each numeric column;
//! - otherwise: `count`, `unique`, `top`, `freq` for every column.
//!
//! Row order is fixed and columns keep their first-seen order, so the same
//! input always renders the same way.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::TabularConfig;
use crate::error::{ensure_exists, ExtractError, ExtractResult};
use crate::format::{FormatKind, TabularFormat};
use crate::Extractor;

const NUMERIC_STATS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
const OBJECT_STATS: [&str; 4] = ["count", "unique", "top", "freq"];

/// Markers read as missing values in delimited text.
const MISSING_MARKERS: [&str; 7] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Interpret a raw delimited-text field.
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_MARKERS.contains(&trimmed) {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) => Cell::Number(n),
            Err(_) => Cell::Text(raw.to_string()),
        }
    }

    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    fn from_sheet(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    fn display_key(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(n.to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

/// Rows and named columns loaded from a structured file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table from a header row, de-duplicating and naming blank headers.
    pub fn with_header<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut used: HashSet<String> = HashSet::new();
        let mut suffixes: HashMap<String, usize> = HashMap::new();
        let columns = header
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let name = name.as_ref().trim();
                let base = if name.is_empty() {
                    format!("Unnamed: {}", i)
                } else {
                    name.to_string()
                };
                let unique = if used.contains(&base) {
                    let suffix = suffixes.entry(base.clone()).or_insert(1);
                    loop {
                        let candidate = format!("{}.{}", base, suffix);
                        *suffix += 1;
                        if !used.contains(&candidate) {
                            break candidate;
                        }
                    }
                } else {
                    base
                };
                used.insert(unique.clone());
                unique
            })
            .collect();

        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    fn column(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Numbers of a column, or `None` if any present cell is not numeric.
    fn numeric_values(&self, index: usize) -> Option<Vec<f64>> {
        let mut values = Vec::new();
        for cell in self.column(index) {
            match cell {
                Cell::Number(n) => values.push(*n),
                Cell::Empty => {}
                Cell::Text(_) => return None,
            }
        }
        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }

    /// Descriptive statistics for this table.
    pub fn describe(&self, precision: usize) -> ExtractResult<Summary> {
        if self.columns.is_empty() {
            return Err(ExtractError::Tabular(
                "Cannot describe a table without columns".to_string(),
            ));
        }

        let numeric: Vec<(usize, Vec<f64>)> = (0..self.columns.len())
            .filter_map(|i| self.numeric_values(i).map(|v| (i, v)))
            .collect();

        if numeric.is_empty() {
            return Ok(self.describe_objects());
        }

        let mut summary = Summary::new(&NUMERIC_STATS);
        for (index, mut values) in numeric {
            values.sort_by(|a, b| a.total_cmp(b));
            let stats = numeric_stats(&values);
            summary.push_column(
                &self.columns[index],
                stats.iter().map(|v| format_float(*v, precision)).collect(),
            );
        }
        Ok(summary)
    }

    fn describe_objects(&self) -> Summary {
        let mut summary = Summary::new(&OBJECT_STATS);

        for (index, name) in self.columns.iter().enumerate() {
            // value -> (frequency, first position) keeps tie-breaking stable
            let mut freq: HashMap<String, (usize, usize)> = HashMap::new();
            let mut count = 0usize;
            for (pos, key) in self.column(index).filter_map(Cell::display_key).enumerate() {
                count += 1;
                freq.entry(key).or_insert((0, pos)).0 += 1;
            }

            let top = freq
                .iter()
                .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
                .map(|(value, (n, _))| (value.clone(), n.to_string()));

            let (top, top_freq) = top.unwrap_or_else(|| ("NaN".to_string(), "NaN".to_string()));
            summary.push_column(
                name,
                vec![count.to_string(), freq.len().to_string(), top, top_freq],
            );
        }

        summary
    }
}

/// Statistics rows per described column.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    labels: Vec<&'static str>,
    columns: Vec<String>,
    /// Column-major rendered values.
    values: Vec<Vec<String>>,
}

impl Summary {
    fn new(labels: &[&'static str]) -> Self {
        Self {
            labels: labels.to_vec(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    fn push_column(&mut self, name: &str, values: Vec<String>) {
        self.columns.push(name.to_string());
        self.values.push(values);
    }

    /// Statistic names in row order.
    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }

    /// Described column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rendered value of `stat` for `column`.
    pub fn value(&self, stat: &str, column: &str) -> Option<&str> {
        let row = self.labels.iter().position(|l| *l == stat)?;
        let col = self.columns.iter().position(|c| c == column)?;
        Some(self.values[col][row].as_str())
    }

    /// Fixed-width rendering: labels left-aligned, values right-aligned.
    pub fn render(&self) -> String {
        let label_width = self.labels.iter().map(|l| l.len()).max().unwrap_or(0);
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(name, vals)| {
                vals.iter()
                    .map(|v| v.chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(self.labels.len() + 1);

        let mut header = " ".repeat(label_width);
        for (name, width) in self.columns.iter().zip(&widths) {
            header.push_str(&format!("  {:>width$}", name, width = *width));
        }
        lines.push(header.trim_end().to_string());

        for (row, label) in self.labels.iter().enumerate() {
            let mut line = format!("{:<width$}", label, width = label_width);
            for (col, width) in widths.iter().enumerate() {
                line.push_str(&format!("  {:>width$}", self.values[col][row], width = *width));
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}

/// count, mean, std, min, 25%, 50%, 75%, max over sorted values.
fn numeric_stats(sorted: &[f64]) -> [f64; 8] {
    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let std = if sorted.len() > 1 {
        (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        f64::NAN
    };

    [
        n,
        mean,
        std,
        sorted[0],
        quantile(sorted, 0.25),
        quantile(sorted, 0.50),
        quantile(sorted, 0.75),
        sorted[sorted.len() - 1],
    ]
}

/// Linear-interpolated quantile of non-empty sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn format_float(value: f64, precision: usize) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.*}", precision, value)
    }
}

/// Loads structured files and renders their statistics.
#[derive(Debug, Clone)]
pub struct TabularExtractor {
    config: TabularConfig,
}

impl TabularExtractor {
    pub fn new(config: TabularConfig) -> Self {
        Self { config }
    }

    /// Load `path` as a table of the given flavour.
    pub fn load(&self, path: &Path, format: TabularFormat) -> ExtractResult<Table> {
        ensure_exists(path)?;

        let table = match format {
            TabularFormat::Csv => self.load_csv(path)?,
            TabularFormat::Excel => load_workbook(path)?,
            TabularFormat::Json => load_json(path)?,
        };

        debug!(
            path = %path.display(),
            columns = table.columns.len(),
            rows = table.rows.len(),
            "Loaded table"
        );
        Ok(table)
    }

    /// Load and summarize `path`.
    pub fn extract_format(&self, path: &Path, format: TabularFormat) -> ExtractResult<String> {
        let table = self.load(path, format)?;
        Ok(table.describe(self.config.float_precision)?.render())
    }

    fn load_csv(&self, path: &Path) -> ExtractResult<Table> {
        let delimiter = u8::try_from(self.config.delimiter).map_err(|_| {
            ExtractError::Tabular(format!(
                "CSV delimiter must be a single-byte character, got {:?}",
                self.config.delimiter
            ))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path)
            .map_err(|e| ExtractError::Tabular(format!("Failed to open CSV: {}", e)))?;

        let header = reader
            .headers()
            .map_err(|e| ExtractError::Tabular(format!("Failed to read CSV header: {}", e)))?
            .clone();
        let mut table = Table::with_header(header.iter());

        for record in reader.records() {
            let record =
                record.map_err(|e| ExtractError::Tabular(format!("Malformed CSV row: {}", e)))?;
            table.push_row(record.iter().map(Cell::parse).collect());
        }

        Ok(table)
    }
}

impl Extractor for TabularExtractor {
    fn extract(&self, path: &Path) -> ExtractResult<String> {
        match FormatKind::from_path(path) {
            FormatKind::Tabular(format) => self.extract_format(path, format),
            _ => Err(ExtractError::UnsupportedFormat(
                crate::format::extension_of(path),
            )),
        }
    }

    fn name(&self) -> &str {
        "tabular"
    }
}

/// First worksheet, first row as header.
fn load_workbook(path: &Path) -> ExtractResult<Table> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ExtractError::Tabular(format!("Failed to open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExtractError::Tabular("Workbook has no worksheets".to_string()))?
        .map_err(|e| ExtractError::Tabular(format!("Failed to read worksheet: {}", e)))?;

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(Table::default()),
    };

    let mut table = Table::with_header(header.iter().map(|d| match d {
        Data::Empty => String::new(),
        other => other.to_string(),
    }));
    for row in rows {
        table.push_row(row.iter().map(Cell::from_sheet).collect());
    }

    Ok(table)
}

fn load_json(path: &Path) -> ExtractResult<Table> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ExtractError::Tabular(format!("Failed to read JSON: {}", e)))?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| ExtractError::Tabular(format!("Invalid JSON: {}", e)))?;

    match json_as_table(&value) {
        Some(table) => Ok(table),
        None => {
            debug!(path = %path.display(), "JSON is not a flat table, normalizing");
            normalize_json(&value)
        }
    }
}

/// Direct table shapes: records, a scalar list, column arrays, or nested column maps.
fn json_as_table(value: &Value) -> Option<Table> {
    match value {
        Value::Array(items) if items.iter().all(Value::is_object) => {
            let mut builder = RecordBuilder::default();
            for item in items {
                let record = item.as_object()?;
                builder.push(record.iter().map(|(k, v)| (k.clone(), Cell::from_json(v))));
            }
            Some(builder.finish())
        }
        Value::Array(items) if items.iter().all(|v| !v.is_object() && !v.is_array()) => {
            let mut table = Table::with_header(["0"]);
            for item in items {
                table.push_row(vec![Cell::from_json(item)]);
            }
            Some(table)
        }
        Value::Object(map) if !map.is_empty() && map.values().all(Value::is_array) => {
            let len = map.values().next()?.as_array()?.len();
            let columns: Vec<&Vec<Value>> = map.values().filter_map(Value::as_array).collect();
            if columns.iter().any(|c| c.len() != len) {
                return None;
            }
            let mut table = Table::with_header(map.keys());
            for row in 0..len {
                table.push_row(columns.iter().map(|c| Cell::from_json(&c[row])).collect());
            }
            Some(table)
        }
        Value::Object(map) if !map.is_empty() && map.values().all(Value::is_object) => {
            // {column: {row: value}}
            let mut index: Vec<&String> = Vec::new();
            for inner in map.values().filter_map(Value::as_object) {
                for key in inner.keys() {
                    if !index.contains(&key) {
                        index.push(key);
                    }
                }
            }
            let mut table = Table::with_header(map.keys());
            for row_key in index {
                table.push_row(
                    map.values()
                        .map(|col| col.get(row_key).map(Cell::from_json).unwrap_or(Cell::Empty))
                        .collect(),
                );
            }
            Some(table)
        }
        _ => None,
    }
}

/// Generic fallback: flatten nested objects into dotted column names.
fn normalize_json(value: &Value) -> ExtractResult<Table> {
    let mut builder = RecordBuilder::default();

    match value {
        Value::Object(map) => builder.push(flatten(map)),
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(map) => builder.push(flatten(map)),
                    other => builder.push(vec![("0".to_string(), Cell::from_json(other))]),
                }
            }
        }
        _ => {
            return Err(ExtractError::Tabular(
                "JSON document has no tabular structure".to_string(),
            ))
        }
    }

    Ok(builder.finish())
}

fn flatten(map: &Map<String, Value>) -> Vec<(String, Cell)> {
    let mut out = Vec::new();
    flatten_into(map, None, &mut out);
    out
}

fn flatten_into(map: &Map<String, Value>, prefix: Option<&str>, out: &mut Vec<(String, Cell)>) {
    for (key, value) in map {
        let name = match prefix {
            Some(p) => format!("{}.{}", p, key),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(inner, Some(&name), out),
            other => out.push((name, Cell::from_json(other))),
        }
    }
}

/// Accumulates keyed records into a table with first-seen column order.
#[derive(Default)]
struct RecordBuilder {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
    rows: Vec<Vec<(usize, Cell)>>,
}

impl RecordBuilder {
    fn push(&mut self, record: impl IntoIterator<Item = (String, Cell)>) {
        let mut row = Vec::new();
        for (key, cell) in record {
            let next = self.columns.len();
            let index = *self.positions.entry(key.clone()).or_insert(next);
            if index == next {
                self.columns.push(key);
            }
            row.push((index, cell));
        }
        self.rows.push(row);
    }

    fn finish(self) -> Table {
        let width = self.columns.len();
        let mut table = Table {
            columns: self.columns,
            rows: Vec::with_capacity(self.rows.len()),
        };
        for sparse in self.rows {
            let mut row = vec![Cell::Empty; width];
            for (index, cell) in sparse {
                row[index] = cell;
            }
            table.rows.push(row);
        }
        table
    }
}
