use crate::adapters::sqlite::Store;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_identifier;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TABLE: &str = "raw_collection";
pub const DEFAULT_DELIMITER: u8 = b';';

/// Column names that collide with SQL keywords and must be quoted.
const RESERVED_COLUMNS: &[&str] = &[
    "set", "order", "group", "index", "table", "select", "where", "from", "values", "limit",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub files: usize,
    pub rows: usize,
}

/// Bulk-loads every delimited file under a directory into one fixed table.
///
/// Independent of the set pipeline; it only shares the store.
pub struct CsvImporter {
    store: Store,
    table: String,
    delimiter: u8,
}

impl CsvImporter {
    pub fn new(store: Store, table: &str) -> Result<Self> {
        validate_identifier("table", table)?;
        Ok(Self {
            store,
            table: table.to_string(),
            delimiter: DEFAULT_DELIMITER,
        })
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Every `*.csv` file below `dir`, sorted by path.
    pub fn scan(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            for entry in fs::read_dir(&current)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else if path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
                {
                    found.push(path);
                }
            }
        }

        found.sort();
        Ok(found)
    }

    pub fn column_name(header: &str) -> String {
        let column = header.trim().to_lowercase().replace(' ', "_");
        if RESERVED_COLUMNS.contains(&column.as_str()) {
            format!("\"{}\"", column)
        } else {
            column
        }
    }

    pub fn insert_sql(&self, headers: &[String]) -> String {
        let columns: Vec<String> = headers.iter().map(|h| Self::column_name(h)).collect();
        let placeholders = vec!["?"; headers.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders
        )
    }

    /// Inserts every record of one file in a single transaction. Returns the row count.
    pub async fn import_file(&self, path: &Path) -> Result<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(EtlError::ProcessingError {
                message: format!("{} has no header row", path.display()),
            });
        }

        let records = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(cell_value).collect::<Vec<Value>>()))
            .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
        tracing::info!("Added {} to memory ({} rows)", path.display(), records.len());

        let sql = self.insert_sql(&headers);
        tracing::debug!("Executing query: \"{}\"", sql);

        let inserted = self
            .store
            .with_connection(|conn| insert_records(conn, &sql, &records))
            .await?;
        tracing::info!("Imported {} rows from {}", inserted, path.display());
        Ok(inserted)
    }

    pub async fn import_dir(&self, dir: &Path) -> Result<ImportSummary> {
        let files = Self::scan(dir)?;
        tracing::info!("Found {} files under {}", files.len(), dir.display());

        let mut summary = ImportSummary::default();
        for file in &files {
            summary.rows += self.import_file(file).await?;
            summary.files += 1;
        }
        Ok(summary)
    }
}

fn insert_records(conn: &mut Connection, sql: &str, records: &[Vec<Value>]) -> Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(sql)?;
        for record in records {
            stmt.execute(params_from_iter(record.iter()))?;
        }
    }
    tx.commit()?;
    Ok(records.len())
}

/// Empty cells become NULL; numeric-looking cells are stored as numbers.
fn cell_value(cell: &str) -> Value {
    let cell = cell.trim();
    if cell.is_empty() {
        Value::Null
    } else if let Ok(integer) = cell.parse::<i64>() {
        Value::Integer(integer)
    } else if let Ok(real) = cell.parse::<f64>() {
        if real.is_finite() {
            Value::Real(real)
        } else {
            Value::Text(cell.to_string())
        }
    } else {
        Value::Text(cell.to_string())
    }
}
